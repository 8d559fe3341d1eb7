use thiserror::Error;

use gl_wrapper::geometry::{GBError, Geometry, GeometryBuilder, VertexAttribute};
use gl_wrapper::program::{Program, ProgramBuilder, ProgramError, UniformError};
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::texture::{Texture2D, TextureError, TextureOptions};
use gl_wrapper::{QUAD_INDICES, QUAD_VERTICES};

use crate::config::Config;

/// The one program, texture and vertex set the demo draws.
pub struct TexturedQuad {
    program: Program,
    texture: Texture2D,
    geometry: Geometry,
}

impl TexturedQuad {
    pub fn load(config: &Config) -> Result<Self, QuadError> {
        let assets = &config.assets;

        log::info!(
            "compiling shaders {:?} and {:?}",
            assets.vertex,
            assets.fragment
        );
        let program = ProgramBuilder::from_files(&assets.vertex, &assets.fragment)?.build()?;

        log::info!("loading texture {:?}", assets.texture);
        let options = TextureOptions {
            flip_vertically: assets.flip_texture,
            ..Default::default()
        };
        let texture = Texture2D::from_path(&assets.texture, &options)?;
        log::debug!(
            "texture {}x{} with {} mip levels",
            texture.width(),
            texture.height(),
            texture.mip_levels()
        );

        let geometry = GeometryBuilder::new(&QUAD_VERTICES)
            .with_attribute(VertexAttribute::Vec3) // position
            .with_attribute(VertexAttribute::Vec3) // color
            .with_attribute(VertexAttribute::Vec2) // texture coordinate
            .with_indices(&QUAD_INDICES)
            .build()?;

        let quad = Self {
            program,
            texture,
            geometry,
        };
        quad.set_uniforms(config);

        Ok(quad)
    }

    /// Uniforms a custom shader does not declare are skipped with a warning.
    fn set_uniforms(&self, config: &Config) {
        let active = self.program.activate();

        let results = [
            active.set_i32("u_texture", 0),
            active.set_bool("u_use_vertex_color", config.use_vertex_color),
            active.set_f32("u_color_mix", config.color_mix),
        ];

        for err in results.into_iter().filter_map(Result::err) {
            match err {
                UniformError::Unknown(name) => {
                    log::warn!("shader has no uniform '{name}', leaving it unset")
                }
            }
        }
    }

    pub fn draw(&self, renderer: &mut GlRenderer) {
        renderer.draw(&self.geometry, &self.program, &[&self.texture]);
    }
}

#[derive(Debug, Error)]
pub enum QuadError {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Geometry(#[from] GBError),
}
