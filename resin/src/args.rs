use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(about = "Draws a textured quad with OpenGL")]
pub struct Args {
    /// Path to a JSON5 settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Vertex shader source
    #[arg(long)]
    pub vertex: Option<PathBuf>,
    /// Fragment shader source
    #[arg(long)]
    pub fragment: Option<PathBuf>,
    /// Image applied to the quad
    #[arg(long)]
    pub texture: Option<PathBuf>,
    /// Initial window width
    #[arg(long)]
    pub width: Option<u32>,
    /// Initial window height
    #[arg(long)]
    pub height: Option<u32>,
    /// Log filter such as "debug" or "resin=trace" (defaults to RUST_LOG, then info)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Save the first frame as a PNG and exit
    #[arg(long)]
    pub screenshot: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn no_flags_means_no_overrides() {
        let args = Args::parse_from(["resin"]);

        assert!(args.config.is_none());
        assert!(args.texture.is_none());
        assert!(args.screenshot.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let args = Args::parse_from([
            "resin",
            "--texture",
            "crate.jpg",
            "--width",
            "1000",
            "--height",
            "600",
            "--screenshot",
            "out.png",
        ]);

        assert_eq!(args.texture, Some(PathBuf::from("crate.jpg")));
        assert_eq!(args.width, Some(1000));
        assert_eq!(args.height, Some(600));
        assert_eq!(args.screenshot, Some(PathBuf::from("out.png")));
    }
}
