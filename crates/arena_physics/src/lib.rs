//! # Arena Physics
//!
//! Fixed-timestep physics for a first-person arena: a capsule player and a
//! pool of throwable spheres moving through static triangle geometry.
//!
//! ## Features
//!
//! - **Octree world index**: sphere and capsule contact queries, ray casts
//!   and point containment over a static triangle soup
//! - **Substepped integration**: clamped frame delta split into fixed
//!   substeps, with grounded and airborne damping
//! - **Pairwise resolution**: elastic sphere-sphere and sphere-player
//!   exchanges
//! - **Background loading**: build the world index off the frame loop and
//!   install it when ready
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arena_physics::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut world = PhysicsWorld::new(PhysicsConfig::default())?;
//!     world.set_world_geometry(&ArenaBuilder::standard())?;
//!
//!     for _ in 0..60 {
//!         world.step_frame(1.0 / 60.0, &PlayerInput::idle());
//!     }
//!     println!("{:?}", world.snapshot().player);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod physics;
pub mod spatial;

/// Common imports for simulation users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        foundation::{
            math::Vec3,
            time::{FrameClock, Stopwatch},
        },
        geometry::{ArenaBuilder, GeometryError, GeometryProvider, IndexBuilder, TriangleSoup},
        physics::{
            BodyState, Capsule, Collider, Contact, ContactPolicy, FrameSnapshot, PhysicsWorld,
            Player, PlayerInput, Ray, RayHit, RigidBody, Sphere, ThrowCommand, Triangle,
        },
        spatial::{Octree, OctreeConfig, SpatialQuery},
    };
}
