//! Spatial partitioning data structures
//!
//! Indexes the static world triangles for collider overlap, ray casting and
//! point containment queries.

mod aabb;
mod octree;
mod spatial_query;

pub use aabb::Aabb;
pub use octree::{Octree, OctreeConfig, OctreeNode};
pub use spatial_query::{BruteForceIndex, SpatialQuery};
