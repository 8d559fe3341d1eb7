use gl::types::{GLchar, GLenum, GLint, GLuint};
use std::collections::HashMap;
use std::ffi::{CString, NulError};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub struct ProgramBuilder {
    vert: CString,
    frag: CString,
}

impl ProgramBuilder {
    pub fn new(vert_src: &str, frag_src: &str) -> Result<Self, ProgramError> {
        Ok(Self {
            vert: CString::new(vert_src)?,
            frag: CString::new(frag_src)?,
        })
    }

    /// Reads both stages from disk.
    pub fn from_files(
        vert_path: impl AsRef<Path>,
        frag_path: impl AsRef<Path>,
    ) -> Result<Self, ProgramError> {
        let vert = read_source(vert_path.as_ref())?;
        let frag = read_source(frag_path.as_ref())?;

        Self::new(&vert, &frag)
    }

    pub fn build(self) -> Result<Program, ProgramError> {
        let vert = ShaderObject::compile(ShaderStage::Vertex, &self.vert)?;
        let frag = ShaderObject::compile(ShaderStage::Fragment, &self.frag)?;

        let mut success: GLint = 0;

        let program = unsafe { gl::CreateProgram() };
        if program == 0 {
            return Err(ProgramError::CreateProgram);
        }

        unsafe {
            gl::AttachShader(program, vert.id);
            gl::AttachShader(program, frag.id);
            gl::LinkProgram(program);

            // stage objects are deleted when the guards drop, detached or not
            gl::DetachShader(program, vert.id);
            gl::DetachShader(program, frag.id);

            gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
        }

        if success != gl::TRUE as GLint {
            let log = program_info_log(program);
            unsafe { gl::DeleteProgram(program) };
            return Err(ProgramError::Linking(log));
        }

        let uniforms = UniformLocations::query(program);
        log::debug!(
            "linked program {} with {} active uniforms",
            program,
            uniforms.len()
        );

        Ok(Program {
            id: program,
            uniforms,
        })
    }
}

fn read_source(path: &Path) -> Result<String, ProgramError> {
    std::fs::read_to_string(path).map_err(|source| ProgramError::Read {
        path: path.to_owned(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Compiled stage, deleted on drop.
struct ShaderObject {
    id: GLuint,
}

impl ShaderObject {
    fn compile(stage: ShaderStage, src: &CString) -> Result<Self, ProgramError> {
        let id = unsafe { gl::CreateShader(stage.gl_enum()) };
        if id == 0 {
            return Err(ProgramError::CreateShader(stage));
        }

        let shader = Self { id };
        let mut success: GLint = 0;

        unsafe {
            gl::ShaderSource(shader.id, 1, &src.as_ptr(), std::ptr::null());
            gl::CompileShader(shader.id);
            gl::GetShaderiv(shader.id, gl::COMPILE_STATUS, &mut success);
        }

        if success != gl::TRUE as GLint {
            return Err(ProgramError::Compilation {
                stage,
                log: shader_info_log(shader.id),
            });
        }

        Ok(shader)
    }
}

impl Drop for ShaderObject {
    fn drop(&mut self) {
        unsafe { gl::DeleteShader(self.id) }
    }
}

fn shader_info_log(shader: GLuint) -> String {
    let mut len: GLint = 0;
    unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len) };

    let mut buf = vec![0_u8; len.max(1) as usize];
    unsafe {
        gl::GetShaderInfoLog(
            shader,
            buf.len() as GLint,
            std::ptr::null_mut(),
            buf.as_mut_ptr() as *mut GLchar,
        );
    }

    crate::info_log_to_string(&buf)
}

fn program_info_log(program: GLuint) -> String {
    let mut len: GLint = 0;
    unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len) };

    let mut buf = vec![0_u8; len.max(1) as usize];
    unsafe {
        gl::GetProgramInfoLog(
            program,
            buf.len() as GLint,
            std::ptr::null_mut(),
            buf.as_mut_ptr() as *mut GLchar,
        );
    }

    crate::info_log_to_string(&buf)
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("could not read shader source {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("shader source contains a NUL byte")]
    InvalidSource(#[from] NulError),
    #[error("glCreateShader failed for the {0} stage")]
    CreateShader(ShaderStage),
    #[error("glCreateProgram failed")]
    CreateProgram,
    #[error("{stage} shader compilation failed: {log}")]
    Compilation { stage: ShaderStage, log: String },
    #[error("program linking failed: {0}")]
    Linking(String),
}

#[derive(Debug, Error)]
pub enum UniformError {
    #[error("'{0}' is not an active uniform of this program")]
    Unknown(String),
}

/// Name to location table, filled once after linking.
#[derive(Debug, Default, Clone)]
pub struct UniformLocations {
    locations: HashMap<String, GLint>,
}

impl UniformLocations {
    fn query(program: GLuint) -> Self {
        let mut table = Self::default();
        let mut count: GLint = 0;
        let mut max_len: GLint = 0;

        unsafe {
            gl::GetProgramiv(program, gl::ACTIVE_UNIFORMS, &mut count);
            gl::GetProgramiv(program, gl::ACTIVE_UNIFORM_MAX_LENGTH, &mut max_len);
        }

        let mut buf = vec![0_u8; max_len.max(1) as usize];

        for index in 0..count.max(0) as GLuint {
            let mut len: GLint = 0;
            let mut size: GLint = 0;
            let mut kind: GLenum = 0;

            unsafe {
                gl::GetActiveUniform(
                    program,
                    index,
                    buf.len() as GLint,
                    &mut len,
                    &mut size,
                    &mut kind,
                    buf.as_mut_ptr() as *mut GLchar,
                );
            }

            let name = String::from_utf8_lossy(&buf[..len.max(0) as usize]).into_owned();
            let Ok(c_name) = CString::new(name.as_str()) else {
                continue;
            };

            let location = unsafe { gl::GetUniformLocation(program, c_name.as_ptr()) };
            // uniforms inside uniform blocks report -1
            if location >= 0 {
                table.insert(name, location);
            }
        }

        table
    }

    /// Array uniforms are reported as `name[0]`; both spellings resolve.
    pub fn insert(&mut self, name: String, location: GLint) {
        if let Some(base) = name.strip_suffix("[0]") {
            self.locations.insert(base.to_string(), location);
        }
        self.locations.insert(name, location);
    }

    pub fn get(&self, name: &str) -> Option<GLint> {
        self.locations.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

pub struct Program {
    id: GLuint,
    uniforms: UniformLocations,
}

impl Program {
    pub fn get_id(&self) -> GLuint {
        self.id
    }

    pub fn uniforms(&self) -> &UniformLocations {
        &self.uniforms
    }

    pub fn uniform_location(&self, name: &str) -> Result<GLint, UniformError> {
        self.uniforms
            .get(name)
            .ok_or_else(|| UniformError::Unknown(name.to_string()))
    }

    /// Makes this program current for draws and uniform writes.
    pub fn activate(&self) -> ActiveProgram<'_> {
        unsafe { gl::UseProgram(self.id) }
        ActiveProgram { program: self }
    }

    pub fn get_i32(&self, name: &str) -> Result<i32, UniformError> {
        let location = self.uniform_location(name)?;
        let mut value = 0;
        unsafe { gl::GetUniformiv(self.id, location, &mut value) };
        Ok(value)
    }

    pub fn get_f32(&self, name: &str) -> Result<f32, UniformError> {
        let location = self.uniform_location(name)?;
        let mut value = 0.0;
        unsafe { gl::GetUniformfv(self.id, location, &mut value) };
        Ok(value)
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        unsafe { gl::DeleteProgram(self.id) }
    }
}

/// A program that is current on the context.
///
/// Uniform writes go to whichever program is current, so the handle is only
/// meaningful until another program is activated.
pub struct ActiveProgram<'a> {
    program: &'a Program,
}

impl ActiveProgram<'_> {
    pub fn set_bool(&self, name: &str, value: bool) -> Result<(), UniformError> {
        let location = self.program.uniform_location(name)?;
        unsafe { gl::Uniform1i(location, i32::from(value)) };
        Ok(())
    }

    pub fn set_i32(&self, name: &str, value: i32) -> Result<(), UniformError> {
        let location = self.program.uniform_location(name)?;
        unsafe { gl::Uniform1i(location, value) };
        Ok(())
    }

    pub fn set_f32(&self, name: &str, value: f32) -> Result<(), UniformError> {
        let location = self.program.uniform_location(name)?;
        unsafe { gl::Uniform1f(location, value) };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_uniforms_resolve_by_base_name() {
        let mut table = UniformLocations::default();
        table.insert("u_lights[0]".to_string(), 4);
        table.insert("u_texture".to_string(), 0);

        assert_eq!(table.get("u_lights"), Some(4));
        assert_eq!(table.get("u_lights[0]"), Some(4));
        assert_eq!(table.get("u_texture"), Some(0));
        assert_eq!(table.get("u_missing"), None);
    }

    #[test]
    fn nul_in_source_is_rejected() {
        let res = ProgramBuilder::new("void main() {}\0", "void main() {}");

        assert!(matches!(res, Err(ProgramError::InvalidSource(_))));
    }

    #[test]
    fn missing_source_file_names_the_path() {
        let res = ProgramBuilder::from_files("does/not/exist.vert", "does/not/exist.frag");

        match res {
            Err(ProgramError::Read { path, .. }) => {
                assert_eq!(path, PathBuf::from("does/not/exist.vert"))
            }
            _ => panic!("expected a read error"),
        }
    }

    #[test]
    fn compilation_error_mentions_stage() {
        let err = ProgramError::Compilation {
            stage: ShaderStage::Fragment,
            log: "0:3: syntax error".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "fragment shader compilation failed: 0:3: syntax error"
        );
    }
}
