//! Collision detection against static world geometry
//!
//! Triangle-level math lives in [`primitives`]; [`shape`] wraps the two body
//! shapes in one [`Collider`] type with a single contact routine.
//!
//! # Key Types
//!
//! - [`Collider`] - capsule or sphere volume of a rigid body
//! - [`Contact`] - separation normal and depth
//! - [`Ray`], [`Sphere`], [`Capsule`], [`Triangle`] - primitive geometric types

pub mod primitives;
pub mod shape;

pub use primitives::{Capsule, Ray, RayHit, Sphere, Triangle};
pub use shape::{Collider, Contact, ContactPolicy};
