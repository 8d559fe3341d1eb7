use gl::types::{GLenum, GLint, GLuint};
use image::DynamicImage;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub struct Texture2D {
    id: GLuint,
    width: u32,
    height: u32,
}

impl Texture2D {
    /// Decodes an image file and uploads it as an RGBA8 texture.
    pub fn from_path(
        path: impl AsRef<Path>,
        options: &TextureOptions,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_owned(),
            source,
        })?;

        log::info!("decoded {:?} ({}x{})", path, image.width(), image.height());

        Self::from_image(&image, options)
    }

    pub fn from_image(
        image: &DynamicImage,
        options: &TextureOptions,
    ) -> Result<Self, TextureError> {
        let (width, height) = (image.width(), image.height());
        check_dimensions(width, height)?;

        let mut rgba = image.to_rgba8();
        if options.flip_vertically {
            image::imageops::flip_vertical_in_place(&mut rgba);
        }

        discard_stale_errors();

        let mut id = 0;

        unsafe {
            gl::GenTextures(1, &mut id);
            gl::BindTexture(gl::TEXTURE_2D, id);
            options.apply();

            // rows of odd-width RGBA images are still 4-byte aligned
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 4);

            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as GLint,
                width as i32,
                height as i32,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                rgba.as_raw().as_ptr() as *const c_void,
            );
            gl::GenerateMipmap(gl::TEXTURE_2D);

            gl::BindTexture(gl::TEXTURE_2D, 0);
        }

        drop(rgba);

        if let Some(err) = crate::take_error() {
            unsafe { gl::DeleteTextures(1, &id) };
            return Err(TextureError::Upload(err));
        }

        Ok(Self { id, width, height })
    }

    /// Uninitialised RGBA8 texture without mipmaps, for framebuffer attachments.
    pub fn render_target(width: u32, height: u32) -> Result<Self, TextureError> {
        check_dimensions(width, height)?;

        discard_stale_errors();

        let mut id = 0;

        unsafe {
            gl::GenTextures(1, &mut id);
            gl::BindTexture(gl::TEXTURE_2D, id);
            TextureOptions::RENDER_TARGET.apply();

            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA8 as GLint,
                width as i32,
                height as i32,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                std::ptr::null(),
            );

            gl::BindTexture(gl::TEXTURE_2D, 0);
        }

        if let Some(err) = crate::take_error() {
            unsafe { gl::DeleteTextures(1, &id) };
            return Err(TextureError::Upload(err));
        }

        Ok(Self { id, width, height })
    }

    pub fn get_id(&self) -> GLuint {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of levels in the full mipmap chain.
    pub fn mip_levels(&self) -> u32 {
        mip_levels(self.width, self.height)
    }

    /// Size of a mip level as the driver reports it.
    pub fn level_size(&self, level: u32) -> (u32, u32) {
        let mut width = 0;
        let mut height = 0;

        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, self.id);
            let level = level as GLint;
            gl::GetTexLevelParameteriv(gl::TEXTURE_2D, level, gl::TEXTURE_WIDTH, &mut width);
            gl::GetTexLevelParameteriv(gl::TEXTURE_2D, level, gl::TEXTURE_HEIGHT, &mut height);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }

        (width.max(0) as u32, height.max(0) as u32)
    }

    pub fn bind(&self, unit: u8) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit as u32);
            gl::BindTexture(gl::TEXTURE_2D, self.id)
        }
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(1, &self.id);
        }
    }
}

fn discard_stale_errors() {
    if let Some(err) = crate::take_error() {
        log::debug!("discarding earlier GL error 0x{err:04x}");
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    let max = crate::max_texture_size();

    let too_large = |side: u32| i64::from(side) > i64::from(max);

    if width == 0 || height == 0 || too_large(width) || too_large(height) {
        return Err(TextureError::InvalidDimensions { width, height, max });
    }

    Ok(())
}

pub fn mip_levels(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("image size {width}x{height} is outside 1..={max}")]
    InvalidDimensions { width: u32, height: u32, max: i32 },
    #[error("texture upload failed with GL error 0x{0:04x}")]
    Upload(GLenum),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

impl TextureFilter {
    fn gl_enum(self) -> GLenum {
        match self {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
    ClampToEdge,
}

impl TextureWrap {
    fn gl_enum(self) -> GLenum {
        match self {
            TextureWrap::Repeat => gl::REPEAT,
            TextureWrap::ClampToEdge => gl::CLAMP_TO_EDGE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextureOptions {
    pub wrap: TextureWrap,
    pub filter: TextureFilter,
    /// Store image row 0 at t = 1 so images appear upright on screen.
    pub flip_vertically: bool,
}

impl TextureOptions {
    /// Framebuffer attachments are sampled texel for texel.
    pub const RENDER_TARGET: Self = Self {
        wrap: TextureWrap::ClampToEdge,
        filter: TextureFilter::Nearest,
        flip_vertically: false,
    };

    /// Sets wrap and filter parameters on the bound `TEXTURE_2D`.
    unsafe fn apply(&self) {
        let wrap = self.wrap.gl_enum() as GLint;
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap);
        let filter = self.filter.gl_enum() as GLint;
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter);
    }
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap: TextureWrap::Repeat,
            filter: TextureFilter::Linear,
            flip_vertically: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_reaches_one_by_one() {
        assert_eq!(mip_levels(1, 1), 1);
        assert_eq!(mip_levels(2, 2), 2);
        assert_eq!(mip_levels(256, 256), 9);
        assert_eq!(mip_levels(512, 128), 10);
        assert_eq!(mip_levels(300, 200), 9);
    }

    #[test]
    fn default_options_repeat_and_filter_linearly() {
        let options = TextureOptions::default();

        assert_eq!(options.wrap, TextureWrap::Repeat);
        assert_eq!(options.filter, TextureFilter::Linear);
        assert_eq!(options.wrap.gl_enum(), gl::REPEAT);
        assert_eq!(options.filter.gl_enum(), gl::LINEAR);
    }

    #[test]
    fn render_targets_clamp_and_sample_nearest() {
        let options = TextureOptions::RENDER_TARGET;

        assert_eq!(options.wrap.gl_enum(), gl::CLAMP_TO_EDGE);
        assert_eq!(options.filter.gl_enum(), gl::NEAREST);
        assert!(!options.flip_vertically);
    }

    #[test]
    fn missing_image_is_a_decode_error() {
        // decoding fails before any GL call is made
        let res = Texture2D::from_path("no/such/box.png", &TextureOptions::default());

        assert!(matches!(res, Err(TextureError::Decode { .. })));
    }
}
