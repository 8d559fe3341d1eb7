use std::ffi::CStr;

/// Interleaved quad vertices: position (3), color (3), texture coordinate (2).
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 32] = [
    // positions       colors           tex coords
     0.5,  0.5, 0.0,   1.0, 0.0, 0.0,   1.0, 1.0, // top right
     0.5, -0.5, 0.0,   0.0, 1.0, 0.0,   1.0, 0.0, // bottom right
    -0.5, -0.5, 0.0,   0.0, 0.0, 1.0,   0.0, 0.0, // bottom left
    -0.5,  0.5, 0.0,   1.0, 1.0, 0.0,   0.0, 1.0, // top left
];

#[rustfmt::skip]
pub const QUAD_INDICES: [u32; 6] = [
    0, 1, 3,
    1, 2, 3,
];

pub mod framebuffer;
pub mod geometry;
pub mod program;
pub mod renderer;
pub mod texture;
pub mod viewport;

/// Strings and limits reported by the current context.
#[derive(Debug, Clone)]
pub struct GlInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub max_texture_units: i32,
    pub max_combined_texture_units: i32,
    pub max_texture_size: i32,
}

impl GlInfo {
    /// Queries the current context. Function pointers must already be loaded.
    pub fn query() -> Self {
        let mut max_texture_units = 0;
        let mut max_combined_texture_units = 0;

        unsafe {
            gl::GetIntegerv(gl::MAX_TEXTURE_IMAGE_UNITS, &mut max_texture_units);
            gl::GetIntegerv(
                gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS,
                &mut max_combined_texture_units,
            );
        }

        Self {
            vendor: get_string(gl::VENDOR),
            renderer: get_string(gl::RENDERER),
            version: get_string(gl::VERSION),
            max_texture_units,
            max_combined_texture_units,
            max_texture_size: max_texture_size(),
        }
    }
}

pub(crate) fn max_texture_size() -> i32 {
    let mut size = 0;
    unsafe { gl::GetIntegerv(gl::MAX_TEXTURE_SIZE, &mut size) };
    size
}

fn get_string(name: gl::types::GLenum) -> String {
    unsafe {
        let ptr = gl::GetString(name);
        if ptr.is_null() {
            return String::new();
        }
        CStr::from_ptr(ptr.cast()).to_string_lossy().into_owned()
    }
}

/// Pops pending error flags, returning the first one.
pub fn take_error() -> Option<gl::types::GLenum> {
    let mut first = None;

    // a lost context keeps reporting errors, so the drain is bounded
    for _ in 0..16 {
        let err = unsafe { gl::GetError() };
        if err == gl::NO_ERROR {
            break;
        }
        if first.is_none() {
            first = Some(err);
        }
    }

    first
}

/// Turns a NUL-padded info log buffer into text.
pub(crate) fn info_log_to_string(buf: &[u8]) -> String {
    let data = match buf.iter().position(|b| *b == 0) {
        Some(end) => &buf[..end],
        None => buf,
    };

    String::from_utf8_lossy(data).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_log_stops_at_nul() {
        let mut buf = [0_u8; 16];
        buf[..6].copy_from_slice(b"error\n");

        assert_eq!(info_log_to_string(&buf), "error");
    }

    #[test]
    fn info_log_without_nul_uses_whole_buffer() {
        assert_eq!(info_log_to_string(b"0:1: oops"), "0:1: oops");
    }

    #[test]
    fn quad_indices_reference_quad_vertices() {
        let vertices = QUAD_VERTICES.len() / 8;

        assert_eq!(vertices, 4);
        assert!(QUAD_INDICES.iter().all(|i| (*i as usize) < vertices));
    }
}
