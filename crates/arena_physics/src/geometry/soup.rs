//! Indexed triangle buffers

use log::debug;

use super::{validate_triangles, GeometryError, GeometryProvider};
use crate::foundation::math::Vec3;
use crate::physics::collision::Triangle;

/// Vertex and index buffers describing a static mesh
///
/// Every three indices form one triangle. Vertices are scaled uniformly and
/// then offset when triangles are produced. Zero-area triangles are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleSoup {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    scale: f64,
    offset: Vec3,
}

impl TriangleSoup {
    /// Wrap vertex and index buffers
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            scale: 1.0,
            offset: Vec3::zeros(),
        }
    }

    /// Non-indexed buffer: consecutive vertex triples are triangles
    pub fn unindexed(vertices: Vec<Vec3>) -> Self {
        let indices = (0..vertices.len() as u32).collect();
        Self::new(vertices, indices)
    }

    /// Uniform scale applied to every vertex
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Translation applied after scaling
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Number of triangles the index buffer describes
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn vertex(&self, triangle: usize, index: u32) -> Result<Vec3, GeometryError> {
        let index = index as usize;
        self.vertices
            .get(index)
            .map(|v| v * self.scale + self.offset)
            .ok_or(GeometryError::IndexOutOfRange {
                triangle,
                index,
                vertex_count: self.vertices.len(),
            })
    }
}

impl GeometryProvider for TriangleSoup {
    fn triangles(&self) -> Result<Vec<Triangle>, GeometryError> {
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::IndexCount(self.indices.len()));
        }

        let mut triangles = Vec::with_capacity(self.triangle_count());
        for (number, corners) in self.indices.chunks_exact(3).enumerate() {
            triangles.push(Triangle::new(
                self.vertex(number, corners[0])?,
                self.vertex(number, corners[1])?,
                self.vertex(number, corners[2])?,
            ));
        }
        validate_triangles(&triangles)?;

        let before = triangles.len();
        triangles.retain(|t| !t.is_degenerate());
        if triangles.len() < before {
            debug!("Dropped {} degenerate triangles", before - triangles.len());
        }
        Ok(triangles)
    }
}
