//! Rigid-body simulation over static world geometry
//!
//! A capsule player and a pool of spheres are integrated with fixed
//! substeps, collided against the world index, and resolved against each
//! other pairwise.

pub mod body;
pub mod collision;
pub mod integrator;
pub mod player;
pub mod projectiles;
pub mod resolver;
pub mod world;

#[cfg(test)]
mod tests;

pub use body::{BodyState, RigidBody};
pub use collision::{Capsule, Collider, Contact, ContactPolicy, Ray, RayHit, Sphere, Triangle};
pub use integrator::{advance, damp, integrate, IntegrationParams};
pub use player::{CapsuleSnapshot, Player, PlayerInput, ThrowCommand};
pub use projectiles::SpherePool;
pub use resolver::{resolve_sphere_capsule, resolve_sphere_pairs};
pub use world::{FrameSnapshot, PhysicsWorld};
