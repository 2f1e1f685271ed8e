//! Simulation constants
//!
//! Every tunable the physics core reads lives here. Nothing is reconfigured
//! while a simulation runs; a world takes a copy at construction.

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::spatial::OctreeConfig;

/// Per-body integration constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProfile {
    /// Exponential velocity damping coefficient `k` in `exp(-k·dt) - 1`
    pub damping: f64,

    /// Damping multiplier while airborne (reduced air resistance)
    pub air_damping_scale: f64,

    /// Fraction of the approaching normal velocity reflected on contact
    pub restitution: f64,
}

impl BodyProfile {
    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        let values = [self.damping, self.air_damping_scale, self.restitution];
        if values.iter().all(|value| value.is_finite() && *value >= 0.0) {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                field,
                reason: format!(
                    "damping and restitution must be finite and non-negative, got {self:?}"
                ),
            })
        }
    }

    /// Profile used by the player capsule
    pub const PLAYER: Self = Self {
        damping: 4.0,
        air_damping_scale: 0.1,
        restitution: 0.0,
    };

    /// Profile used by pooled spheres
    pub const SPHERE: Self = Self {
        damping: 1.5,
        air_damping_scale: 0.1,
        restitution: 0.0,
    };
}

/// Player capsule and movement constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Capsule radius
    pub radius: f64,

    /// Capsule axis start (feet) at spawn
    pub spawn_start: Vec3,

    /// Capsule axis end (head) at spawn
    pub spawn_end: Vec3,

    /// Integration constants
    pub profile: BodyProfile,

    /// Walking acceleration on the ground
    pub walk_speed: f64,

    /// Running acceleration on the ground
    pub run_speed: f64,

    /// Walking acceleration in the air
    pub air_walk_speed: f64,

    /// Running acceleration in the air
    pub air_run_speed: f64,

    /// Vertical velocity set by a jump
    pub jump_speed: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            radius: 0.35,
            spawn_start: Vec3::new(0.0, 0.35, 0.0),
            spawn_end: Vec3::new(0.0, 1.0, 0.0),
            profile: BodyProfile::PLAYER,
            walk_speed: 18.0,
            run_speed: 32.0,
            air_walk_speed: 6.0,
            air_run_speed: 12.0,
            jump_speed: 15.0,
        }
    }
}

/// Sphere pool and throw constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Number of pooled spheres
    pub pool_size: usize,

    /// Sphere radius
    pub radius: f64,

    /// Integration constants
    pub profile: BodyProfile,

    /// Impulse of an uncharged throw
    pub base_impulse: f64,

    /// Impulse added by a fully charged throw
    pub max_bonus_impulse: f64,

    /// Rate of the exponential charge-up, per second held
    pub charge_rate: f64,

    /// Spawn distance from the player's eye, in player radii
    pub spawn_offset_radii: f64,

    /// Multiplier on the thrower's velocity added to the throw
    pub velocity_inheritance: f64,

    /// Where unused spheres wait
    pub parked_position: Vec3,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            pool_size: 100,
            radius: 0.2,
            profile: BodyProfile::SPHERE,
            base_impulse: 15.0,
            max_bonus_impulse: 30.0,
            charge_rate: 1.0,
            spawn_offset_radii: 1.5,
            velocity_inheritance: 2.0,
            parked_position: Vec3::new(0.0, -100.0, 0.0),
        }
    }
}

/// Top-level physics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity magnitude (applied along -Y)
    pub gravity: f64,

    /// Physics substeps per rendered frame
    pub substeps_per_frame: u32,

    /// Largest frame delta simulated, in seconds
    pub max_frame_delta: f64,

    /// Contacts shallower than this are not positionally corrected
    pub contact_epsilon: f64,

    /// Extra query reach that keeps a resting body in contact with its ground
    pub ground_skin: f64,

    /// Minimum contact normal Y for a contact to count as ground
    pub floor_normal_min_y: f64,

    /// Player head height below which the player is respawned
    pub out_of_bounds_y: f64,

    /// World index construction and query policy
    pub octree: OctreeConfig,

    /// Player settings
    pub player: PlayerConfig,

    /// Sphere pool settings
    pub projectiles: ProjectileConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            substeps_per_frame: 5,
            max_frame_delta: 0.05,
            contact_epsilon: 1e-10,
            ground_skin: 1e-4,
            floor_normal_min_y: 0.5,
            out_of_bounds_y: -25.0,
            octree: OctreeConfig::default(),
            player: PlayerConfig::default(),
            projectiles: ProjectileConfig::default(),
        }
    }
}

impl PhysicsConfig {
    /// Check ranges that would otherwise produce NaNs or empty simulations
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a positive number, got {value}"),
                })
            }
        }
        fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a finite non-negative number, got {value}"),
                })
            }
        }
        fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a finite number, got {value}"),
                })
            }
        }

        if self.substeps_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "substeps_per_frame",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.projectiles.pool_size == 0 {
            return Err(ConfigError::Invalid {
                field: "projectiles.pool_size",
                reason: "must be at least 1".to_string(),
            });
        }
        positive("max_frame_delta", self.max_frame_delta)?;
        positive("player.radius", self.player.radius)?;
        positive("projectiles.radius", self.projectiles.radius)?;
        finite("gravity", self.gravity)?;
        non_negative("contact_epsilon", self.contact_epsilon)?;
        non_negative("ground_skin", self.ground_skin)?;
        finite("floor_normal_min_y", self.floor_normal_min_y)?;
        finite("out_of_bounds_y", self.out_of_bounds_y)?;
        self.player.profile.validate("player.profile")?;
        self.projectiles.profile.validate("projectiles.profile")?;
        self.octree.validate()
    }
}

impl Config for PhysicsConfig {}
