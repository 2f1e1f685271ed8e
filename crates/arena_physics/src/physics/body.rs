//! Rigid body state shared by the player and pooled spheres

use crate::config::BodyProfile;
use crate::foundation::math::Vec3;
use crate::physics::collision::{Capsule, Collider};

/// Contact state carried between substeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyState {
    /// No supporting contact last substep; gravity applies
    #[default]
    Airborne,
    /// Resting on a surface whose normal points mostly up
    Grounded,
}

/// A moving collider with velocity and contact state
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// Collision volume in world space
    pub collider: Collider,

    /// Linear velocity in units per second
    pub velocity: Vec3,

    /// Contact state from the last world query
    pub state: BodyState,

    /// Damping and restitution constants
    pub profile: BodyProfile,
}

impl RigidBody {
    /// Create a body at rest
    pub fn new(collider: impl Into<Collider>, profile: BodyProfile) -> Self {
        Self {
            collider: collider.into(),
            velocity: Vec3::zeros(),
            state: BodyState::Airborne,
            profile,
        }
    }

    /// Sphere center or capsule midpoint
    pub fn position(&self) -> Vec3 {
        self.collider.center()
    }

    /// Move the collider by `delta`
    pub fn translate(&mut self, delta: Vec3) {
        self.collider.translate(delta);
    }

    /// True if the last world contact was a floor
    pub fn is_grounded(&self) -> bool {
        self.state == BodyState::Grounded
    }

    /// The collider as a capsule, if it is one
    pub fn capsule(&self) -> Option<&Capsule> {
        match self.collider {
            Collider::Capsule(ref capsule) => Some(capsule),
            Collider::Sphere(_) => None,
        }
    }
}
