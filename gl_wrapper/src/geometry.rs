use std::ffi::c_void;
use thiserror::Error;

pub struct GeometryBuilder<'a> {
    attributes: Vec<VertexAttribute>,
    data: &'a [f32],
    indices: Option<&'a [u32]>,
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(data: &'a [f32]) -> Self {
        Self {
            data,
            attributes: Vec::new(),
            indices: None,
        }
    }

    pub fn with_attribute(mut self, attr: VertexAttribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn with_indices(mut self, indices: &'a [u32]) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        self.attributes.iter().map(|a| a.size()).sum()
    }

    /// Checks the layout and returns the vertex count.
    pub fn validate(&self) -> Result<usize, GBError> {
        let stride = self.stride();

        if stride == 0 {
            return Err(GBError::NoAttributes);
        }

        if self.data.len() % stride != 0 {
            return Err(GBError::InvalidDataLength);
        }

        let vertices = self.data.len() / stride;
        if vertices == 0 {
            return Err(GBError::Empty);
        }

        if let Some(indices) = self.indices {
            if indices.is_empty() {
                return Err(GBError::Empty);
            }

            if let Some(index) = indices.iter().find(|i| **i as usize >= vertices) {
                return Err(GBError::IndexOutOfRange {
                    index: *index,
                    vertices,
                });
            }
        }

        Ok(vertices)
    }

    pub fn build(self) -> Result<Geometry, GBError> {
        let vertices = self.validate()?;
        let stride = self.stride();

        let mut vao = 0;
        let mut vbo = 0;
        let mut ebo = None;

        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);

            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

            gl::BufferData(
                gl::ARRAY_BUFFER,
                std::mem::size_of_val(self.data) as isize,
                self.data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );

            if let Some(indices) = self.indices {
                let mut id = 0;
                gl::GenBuffers(1, &mut id);
                // element buffer binding is recorded in the vertex array
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, id);
                gl::BufferData(
                    gl::ELEMENT_ARRAY_BUFFER,
                    std::mem::size_of_val(indices) as isize,
                    indices.as_ptr() as *const c_void,
                    gl::STATIC_DRAW,
                );
                ebo = Some(id);
            }

            let mut offset = 0;

            for (i, attr) in self.attributes.iter().enumerate() {
                gl::VertexAttribPointer(
                    i as u32,
                    attr.size() as i32,
                    gl::FLOAT,
                    gl::FALSE,
                    (stride * std::mem::size_of::<f32>()) as i32,
                    (offset * std::mem::size_of::<f32>()) as *const c_void,
                );
                offset += attr.size();
                gl::EnableVertexAttribArray(i as u32);
            }

            gl::BindVertexArray(0);
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        }

        Ok(Geometry {
            vao,
            vbo,
            ebo,
            vertices,
            indices: self.indices.map(|i| i.len()).unwrap_or(0),
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GBError {
    #[error("No vertex attributes given")]
    NoAttributes,
    #[error("Invalid data length for given attributes")]
    InvalidDataLength,
    #[error("Geometry has no vertices or indices")]
    Empty,
    #[error("Index {index} is out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexAttribute {
    Float,
    Vec2,
    Vec3,
}

impl VertexAttribute {
    pub fn size(&self) -> usize {
        match self {
            VertexAttribute::Float => 1,
            VertexAttribute::Vec2 => 2,
            VertexAttribute::Vec3 => 3,
        }
    }
}

pub struct Geometry {
    vao: u32,
    vbo: u32,
    ebo: Option<u32>,
    vertices: usize,
    indices: usize,
}

impl Geometry {
    pub fn vao(&self) -> u32 {
        self.vao
    }

    pub fn vertices(&self) -> usize {
        self.vertices
    }

    /// Index count, 0 for non-indexed geometry.
    pub fn indices(&self) -> usize {
        self.indices
    }

    pub fn is_indexed(&self) -> bool {
        self.ebo.is_some()
    }
}

impl Drop for Geometry {
    fn drop(&mut self) {
        unsafe {
            if let Some(ebo) = &self.ebo {
                gl::DeleteBuffers(1, ebo);
            }
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}
