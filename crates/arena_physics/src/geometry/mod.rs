//! World geometry sources
//!
//! The physics core never parses model files. Static geometry arrives as a
//! flat triangle list from a [`GeometryProvider`]; the world index is built
//! from it either synchronously or on a background thread via
//! [`IndexBuilder`].

mod arena;
mod index_builder;
mod soup;

pub use arena::{ArenaBuilder, Platform, Ramp};
pub use index_builder::IndexBuilder;
pub use soup::TriangleSoup;

use crate::physics::collision::Triangle;

/// Source of static world triangles
pub trait GeometryProvider {
    /// Produce the world triangles in world space
    fn triangles(&self) -> Result<Vec<Triangle>, GeometryError>;
}

impl GeometryProvider for Vec<Triangle> {
    fn triangles(&self) -> Result<Vec<Triangle>, GeometryError> {
        validate_triangles(self)?;
        Ok(self.clone())
    }
}

/// Reject triangles that would poison the index with NaNs
pub fn validate_triangles(triangles: &[Triangle]) -> Result<(), GeometryError> {
    match triangles.iter().position(|t| !t.is_finite()) {
        Some(index) => Err(GeometryError::NonFinite(index)),
        None => Ok(()),
    }
}

/// Geometry loading errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Index buffer cannot be split into triangles
    #[error("Index buffer length {0} is not a multiple of 3")]
    IndexCount(usize),

    /// Index buffer points past the vertex buffer
    #[error("Triangle {triangle} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        /// Triangle number in the index buffer
        triangle: usize,
        /// Offending vertex index
        index: usize,
        /// Vertex buffer length
        vertex_count: usize,
    },

    /// A vertex coordinate is NaN or infinite
    #[error("Triangle {0} has non-finite coordinates")]
    NonFinite(usize),

    /// A procedural geometry parameter is out of range
    #[error("Invalid geometry parameter `{field}`: {reason}")]
    InvalidParameter {
        /// Offending parameter
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The background build ended without delivering an index
    #[error("Index build thread terminated without a result")]
    BuilderDisconnected,
}
