use crate::geometry::Geometry;
use crate::program::Program;
use crate::texture::Texture2D;
use crate::viewport::Viewport;
use std::ffi::c_void;

pub struct GlRenderer {
    viewport: Viewport,
}

impl GlRenderer {
    /// Starts with the centered square viewport of the initial framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        let renderer = Self {
            viewport: Viewport::centered_square(width, height),
        };
        renderer.apply_viewport();
        renderer
    }

    /// Binds `textures[i]` to unit `i`, then draws `geometry` with `program`.
    pub fn draw(&mut self, geometry: &Geometry, program: &Program, textures: &[&Texture2D]) {
        for (unit, texture) in textures.iter().enumerate() {
            texture.bind(unit as u8);
        }

        program.activate();

        unsafe {
            gl::BindVertexArray(geometry.vao());
            if geometry.is_indexed() {
                gl::DrawElements(
                    gl::TRIANGLES,
                    geometry.indices() as i32,
                    gl::UNSIGNED_INT,
                    std::ptr::null(),
                );
            } else {
                gl::DrawArrays(gl::TRIANGLES, 0, geometry.vertices() as i32);
            }
            gl::BindVertexArray(0);
        }
    }

    /// Keeps a centered square viewport inside the new framebuffer size.
    pub fn resize(&mut self, width: u32, height: u32) -> Viewport {
        self.viewport = Viewport::centered_square(width, height);
        self.apply_viewport();
        self.viewport
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn apply_viewport(&self) {
        let vp = self.viewport;
        unsafe {
            gl::Viewport(vp.x, vp.y, vp.width, vp.height);
        }
    }

    pub fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe {
            gl::ClearColor(r, g, b, a);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    /// Reads RGBA8 pixels of the bound framebuffer, bottom row first.
    pub fn read_pixels(&self, area: Viewport) -> Vec<u8> {
        let len = area.width.max(0) as usize * area.height.max(0) as usize * 4;
        let mut buf = vec![0_u8; len];

        unsafe {
            gl::PixelStorei(gl::PACK_ALIGNMENT, 1);
            gl::ReadPixels(
                area.x,
                area.y,
                area.width,
                area.height,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                buf.as_mut_ptr() as *mut c_void,
            );
        }

        buf
    }
}
