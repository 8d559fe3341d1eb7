use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::args::Args;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub clear_color: [f32; 4],
    /// Blend the interpolated vertex color over the texture
    pub use_vertex_color: bool,
    /// Vertex color weight when blending, 0.0 to 1.0. Zero keeps the plain texture.
    pub color_mix: f32,
    pub screenshot: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            assets: AssetConfig::default(),
            clear_color: [0.2, 0.5, 0.3, 1.0],
            use_vertex_color: false,
            color_mix: 0.0,
            screenshot: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            title: "OpenGL Context".to_string(),
            vsync: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AssetConfig {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
    pub texture: PathBuf,
    pub flip_texture: bool,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("assets/vertex.glsl"),
            fragment: PathBuf::from("assets/fragment.glsl"),
            texture: PathBuf::from("assets/box.png"),
            flip_texture: true,
        }
    }
}

impl Config {
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = json5::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the `--config` file, then individual flags.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load_path(path)?,
            None => Self::default(),
        };

        config.apply_args(args);
        config.validate()?;

        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(vertex) = &args.vertex {
            self.assets.vertex = vertex.clone();
        }
        if let Some(fragment) = &args.fragment {
            self.assets.fragment = fragment.clone();
        }
        if let Some(texture) = &args.texture {
            self.assets.texture = texture.clone();
        }
        if let Some(width) = args.width {
            self.window.width = width;
        }
        if let Some(height) = args.height {
            self.window.height = height;
        }
        if let Some(screenshot) = &args.screenshot {
            self.screenshot = Some(screenshot.clone());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} must be non-zero",
                self.window.width, self.window.height
            )));
        }

        if !(0.0..=1.0).contains(&self.color_mix) {
            return Err(ConfigError::Invalid(format!(
                "color_mix {} must be between 0 and 1",
                self.color_mix
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config syntax: {0}")]
    Parse(#[from] json5::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_the_demo() {
        let config = Config::default();

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.window.title, "OpenGL Context");
        assert_eq!(config.clear_color, [0.2, 0.5, 0.3, 1.0]);
        assert_eq!(config.assets.vertex, PathBuf::from("assets/vertex.glsl"));
    }

    #[test]
    fn default_quad_shows_the_plain_texture() {
        let config = Config::default();

        assert!(!config.use_vertex_color);
        assert_eq!(config.color_mix, 0.0);
    }

    #[test]
    fn enabling_vertex_color_alone_does_not_blend() {
        let config = Config::parse("{ use_vertex_color: true }").unwrap();

        assert!(config.use_vertex_color);
        assert_eq!(config.color_mix, 0.0);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"{
                // only override what differs
                window: { title: "quad" },
                assets: { texture: "wall.jpg" },
            }"#,
        )
        .unwrap();

        assert_eq!(config.window.title, "quad");
        assert_eq!(config.window.width, 800);
        assert_eq!(config.assets.texture, PathBuf::from("wall.jpg"));
        assert_eq!(config.assets.fragment, PathBuf::from("assets/fragment.glsl"));
        assert!(config.assets.flip_texture);
    }

    #[test]
    fn color_mix_out_of_range_is_rejected() {
        let res = Config::parse("{ color_mix: 1.5 }");

        assert!(matches!(res, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let res = Config::parse("{ window: ");

        assert!(matches!(res, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn flags_override_file_values() {
        let args = Args::parse_from(["resin", "--width", "1000", "--vertex", "quad.vert"]);
        let mut config = Config::parse("{ window: { width: 640, height: 480 } }").unwrap();

        config.apply_args(&args);

        assert_eq!(config.window.width, 1000);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.assets.vertex, PathBuf::from("quad.vert"));
    }

    #[test]
    fn zero_sized_window_is_rejected() {
        let args = Args::parse_from(["resin", "--height", "0"]);

        assert!(matches!(
            Config::from_args(&args),
            Err(ConfigError::Invalid(_))
        ));
    }
}
