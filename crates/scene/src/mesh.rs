use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Errors from mesh construction. All are input-data defects; the caller
/// must fix the data rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("color count {colors} does not match vertex count {vertices}")]
    ColorCountMismatch { vertices: usize, colors: usize },
    #[error("index {index} out of bounds for {vertices} vertices")]
    IndexOutOfBounds { index: u32, vertices: usize },
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
}

/// Immutable vertex/color/index data for one shape.
///
/// Indices form a triangle list: each consecutive triple is one triangle.
/// Validated once at construction; read-only afterwards, so a mesh can be
/// shared across renderables behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    colors: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Build a mesh from raw arrays, rejecting any invariant violation:
    /// one color per vertex, every index in bounds, whole triangles only.
    pub fn new(vertices: Vec<Vec3>, colors: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, MeshError> {
        if colors.len() != vertices.len() {
            return Err(MeshError::ColorCountMismatch {
                vertices: vertices.len(),
                colors: colors.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(MeshError::IndexOutOfBounds {
                index,
                vertices: vertices.len(),
            });
        }
        Ok(Self {
            vertices,
            colors,
            indices,
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
