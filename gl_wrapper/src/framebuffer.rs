use crate::texture::Texture2D;
use gl::types::GLenum;
use thiserror::Error;

/// Offscreen target rendering into a single color texture.
pub struct FrameBuffer {
    id: u32,
}

impl FrameBuffer {
    pub fn from_texture(texture: &Texture2D) -> Result<Self, FrameBufferError> {
        let mut id = 0;
        let status;

        unsafe {
            gl::GenFramebuffers(1, &mut id);
            gl::BindFramebuffer(gl::FRAMEBUFFER, id);

            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                gl::TEXTURE_2D,
                texture.get_id(),
                0,
            );

            status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);

            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        }

        if status != gl::FRAMEBUFFER_COMPLETE {
            unsafe { gl::DeleteFramebuffers(1, &id) };
            return Err(FrameBufferError::Incomplete(status));
        }

        Ok(Self { id })
    }

    pub fn bind(&self) {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, self.id);
        }
    }

    pub fn bind_default() {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        }
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteFramebuffers(1, &self.id);
        }
    }
}

#[derive(Debug, Error)]
pub enum FrameBufferError {
    #[error("framebuffer is incomplete (status 0x{0:04x})")]
    Incomplete(GLenum),
}
