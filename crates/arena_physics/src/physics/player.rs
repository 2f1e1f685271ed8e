//! Player capsule: input, movement and respawn

use log::info;

use super::body::{BodyState, RigidBody};
use super::integrator::{advance, damp, IntegrationParams};
use crate::config::PlayerConfig;
use crate::foundation::math::Vec3;
use crate::physics::collision::{Capsule, Contact};
use crate::spatial::SpatialQuery;

/// Request to throw a sphere this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowCommand {
    /// Aim direction; normalized before use
    pub direction: Vec3,
    /// How long the throw was charged, in seconds
    pub held_seconds: f64,
}

/// Per-frame control input
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    /// Desired horizontal movement; the Y component is ignored and the
    /// remainder is clamped to unit length
    pub move_direction: Vec3,
    /// Use run speeds instead of walk speeds
    pub run: bool,
    /// Jump if standing on the ground
    pub jump: bool,
    /// Throw a sphere on the first substep of the frame
    pub throw: Option<ThrowCommand>,
}

impl PlayerInput {
    /// No movement, no actions
    pub fn idle() -> Self {
        Self::default()
    }

    /// Walk in `direction`
    pub fn walking(direction: Vec3) -> Self {
        Self {
            move_direction: direction,
            ..Self::default()
        }
    }
}

/// Capsule pose published to renderers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleSnapshot {
    /// Axis start (feet)
    pub start: Vec3,
    /// Axis end (head)
    pub end: Vec3,
    /// Capsule radius
    pub radius: f64,
}

impl From<&Capsule> for CapsuleSnapshot {
    fn from(capsule: &Capsule) -> Self {
        Self {
            start: capsule.start,
            end: capsule.end,
            radius: capsule.radius,
        }
    }
}

/// The player-controlled capsule body
#[derive(Debug, Clone)]
pub struct Player {
    body: RigidBody,
    config: PlayerConfig,
}

impl Player {
    /// Create the player at its spawn pose
    pub fn new(config: PlayerConfig) -> Self {
        let body = RigidBody::new(Self::spawn_capsule(&config), config.profile);
        Self { body, config }
    }

    fn spawn_capsule(config: &PlayerConfig) -> Capsule {
        Capsule::new(config.spawn_start, config.spawn_end, config.radius)
    }

    /// Underlying rigid body
    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    /// Underlying rigid body, mutably
    pub fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.body
    }

    /// Current capsule
    pub fn capsule(&self) -> Capsule {
        match self.body.capsule() {
            Some(capsule) => *capsule,
            None => Self::spawn_capsule(&self.config),
        }
    }

    /// Head position, where throws originate
    pub fn eye(&self) -> Vec3 {
        self.capsule().end
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    /// True if standing on the ground
    pub fn is_grounded(&self) -> bool {
        self.body.is_grounded()
    }

    /// Movement acceleration for the current contact state
    pub fn move_speed(&self, run: bool) -> f64 {
        match (self.body.state, run) {
            (BodyState::Grounded, false) => self.config.walk_speed,
            (BodyState::Grounded, true) => self.config.run_speed,
            (BodyState::Airborne, false) => self.config.air_walk_speed,
            (BodyState::Airborne, true) => self.config.air_run_speed,
        }
    }

    /// Apply movement and jump input for one substep
    pub fn apply_input(&mut self, input: &PlayerInput, dt: f64) {
        let mut direction = Vec3::new(input.move_direction.x, 0.0, input.move_direction.z);
        if !direction.iter().all(|c| c.is_finite()) {
            direction = Vec3::zeros();
        }
        let length = direction.magnitude();
        if length > 1.0 {
            direction /= length;
        }

        self.body.velocity += direction * (self.move_speed(input.run) * dt);

        if input.jump && self.body.is_grounded() {
            self.body.velocity.y = self.config.jump_speed;
        }
    }

    /// One substep: damp, add control input, then move against the world
    pub fn step(
        &mut self,
        input: &PlayerInput,
        world: &dyn SpatialQuery,
        params: &IntegrationParams,
        dt: f64,
    ) -> Option<Contact> {
        damp(&mut self.body, params, dt);
        self.apply_input(input, dt);
        advance(&mut self.body, world, params, dt)
    }

    /// Put the player back at the spawn pose, at rest
    pub fn reset(&mut self) {
        self.body = RigidBody::new(Self::spawn_capsule(&self.config), self.config.profile);
    }

    /// Respawn if the head has fallen to `threshold_y` or below
    ///
    /// Returns true if the player was reset.
    pub fn check_out_of_bounds(&mut self, threshold_y: f64) -> bool {
        let head = self.capsule().end;
        if head.y > threshold_y {
            return false;
        }
        info!("Player fell out of bounds at {:?}; respawning", head);
        self.reset();
        true
    }

    /// Pose for renderers
    pub fn snapshot(&self) -> CapsuleSnapshot {
        CapsuleSnapshot::from(&self.capsule())
    }
}
