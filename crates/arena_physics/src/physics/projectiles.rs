//! Fixed pool of throwable spheres
//!
//! Spheres are never created or destroyed after startup. A throw recycles
//! the oldest slot, so the pool behaves as a ring buffer. Slots that have
//! never been thrown stay parked and take no part in the simulation.

use log::{debug, warn};

use super::body::RigidBody;
use super::player::ThrowCommand;
use crate::config::ProjectileConfig;
use crate::foundation::math::Vec3;
use crate::physics::collision::Sphere;

/// Ring buffer of sphere bodies
#[derive(Debug, Clone)]
pub struct SpherePool {
    bodies: Vec<RigidBody>,
    next: usize,
    live: usize,
    config: ProjectileConfig,
}

impl SpherePool {
    /// Create `config.pool_size` parked spheres (at least one)
    pub fn new(config: ProjectileConfig) -> Self {
        let parked = RigidBody::new(
            Sphere::new(config.parked_position, config.radius),
            config.profile,
        );
        Self {
            bodies: vec![parked; config.pool_size.max(1)],
            next: 0,
            live: 0,
            config,
        }
    }

    /// Number of pooled spheres
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Always false; a pool holds at least one sphere
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Slot the next spawn will reuse
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Number of slots that have been thrown at least once
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Thrown spheres in slot order
    pub fn live(&self) -> &[RigidBody] {
        &self.bodies[..self.live]
    }

    /// Thrown spheres in slot order, mutably
    pub fn live_mut(&mut self) -> &mut [RigidBody] {
        &mut self.bodies[..self.live]
    }

    /// All sphere bodies in slot order, parked ones included
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// All sphere bodies in slot order, mutably
    pub fn bodies_mut(&mut self) -> &mut [RigidBody] {
        &mut self.bodies
    }

    /// Sphere centers in slot order
    pub fn centers(&self) -> Vec<Vec3> {
        self.bodies.iter().map(RigidBody::position).collect()
    }

    /// Throw speed after charging for `held_seconds`
    ///
    /// Rises from the base impulse toward base + bonus as the charge grows.
    pub fn impulse(&self, held_seconds: f64) -> f64 {
        let held = if held_seconds.is_finite() { held_seconds.max(0.0) } else { 0.0 };
        let charge = 1.0 - (-held * self.config.charge_rate).exp();
        self.config.base_impulse + self.config.max_bonus_impulse * charge
    }

    /// Reuse the oldest slot for a sphere at `center` moving at `velocity`
    ///
    /// Returns the slot index.
    pub fn spawn(&mut self, center: Vec3, velocity: Vec3) -> usize {
        let index = self.next;
        let mut body = RigidBody::new(Sphere::new(center, self.config.radius), self.config.profile);
        body.velocity = velocity;
        self.bodies[index] = body;
        self.next = (index + 1) % self.bodies.len();
        self.live = (self.live + 1).min(self.bodies.len());
        index
    }

    /// Throw a sphere from `eye`
    ///
    /// The sphere appears just outside the thrower's capsule and inherits a
    /// multiple of the thrower's velocity. A zero aim direction throws
    /// nothing.
    pub fn throw(
        &mut self,
        eye: Vec3,
        thrower_radius: f64,
        thrower_velocity: Vec3,
        command: &ThrowCommand,
    ) -> Option<usize> {
        let Some(direction) = command.direction.try_normalize(f64::EPSILON) else {
            warn!("Ignoring throw with zero aim direction");
            return None;
        };

        let impulse = self.impulse(command.held_seconds);
        let center = eye + direction * (thrower_radius * self.config.spawn_offset_radii);
        let velocity = direction * impulse + thrower_velocity * self.config.velocity_inheritance;
        let index = self.spawn(center, velocity);
        debug!("Threw sphere {} at {:.1} units/s", index, impulse);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyState;
    use approx::assert_relative_eq;

    fn aim(direction: Vec3) -> ThrowCommand {
        ThrowCommand {
            direction,
            held_seconds: 0.0,
        }
    }

    #[test]
    fn test_pool_starts_parked() {
        let pool = SpherePool::new(ProjectileConfig::default());
        assert_eq!(pool.len(), 100);
        assert_eq!(pool.live_count(), 0);
        assert!(pool.centers().iter().all(|c| *c == Vec3::new(0.0, -100.0, 0.0)));
        assert!(pool.bodies().iter().all(|b| b.velocity == Vec3::zeros()));
    }

    #[test]
    fn test_respawn_overwrites_previous_occupant() {
        let config = ProjectileConfig {
            pool_size: 3,
            ..ProjectileConfig::default()
        };
        let mut pool = SpherePool::new(config);
        for _ in 0..3 {
            pool.spawn(Vec3::new(1.0, 1.0, 1.0), Vec3::new(9.0, 9.0, 9.0));
        }
        pool.bodies_mut()[1].state = BodyState::Grounded;

        // Slots are recycled oldest first
        let index = pool.spawn(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(index, 0);
        let index = pool.spawn(Vec3::new(6.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(index, 1);
        let body = &pool.bodies()[1];
        assert_eq!(body.position(), Vec3::new(6.0, 0.0, 0.0));
        assert_eq!(body.velocity, Vec3::new(0.0, 3.0, 0.0));
        assert!(!body.is_grounded());
    }

    #[test]
    fn test_pool_wraps_around() {
        let mut pool = SpherePool::new(ProjectileConfig::default());
        let first = pool.spawn(Vec3::new(1.0, 2.0, 3.0), Vec3::zeros());
        for i in 1..100 {
            assert_eq!(pool.spawn(Vec3::new(i as f64, 5.0, 0.0), Vec3::zeros()), i);
        }
        assert_eq!(pool.next_index(), 0);
        assert_eq!(pool.live_count(), 100);

        // The 101st throw recycles slot 0
        let recycled = pool.spawn(Vec3::new(-7.0, 1.0, 0.0), Vec3::zeros());
        assert_eq!(first, 0);
        assert_eq!(recycled, 0);
        assert_eq!(pool.centers()[0], Vec3::new(-7.0, 1.0, 0.0));
        assert_eq!(pool.centers()[1], Vec3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn test_impulse_charges_toward_maximum() {
        let pool = SpherePool::new(ProjectileConfig::default());
        assert_relative_eq!(pool.impulse(0.0), 15.0);
        assert_relative_eq!(pool.impulse(1.0), 15.0 + 30.0 * (1.0 - (-1.0f64).exp()));
        assert!(pool.impulse(50.0) < 45.0 + 1e-9);
        assert_relative_eq!(pool.impulse(-3.0), 15.0);
    }

    #[test]
    fn test_throw_spawns_ahead_of_eye() {
        let mut pool = SpherePool::new(ProjectileConfig::default());
        let eye = Vec3::new(0.0, 1.0, 0.0);
        let index = pool
            .throw(eye, 0.35, Vec3::new(1.0, 0.0, 0.0), &aim(Vec3::new(0.0, 0.0, -2.0)))
            .unwrap();

        let body = &pool.bodies()[index];
        assert_relative_eq!(body.position(), Vec3::new(0.0, 1.0, -0.525), epsilon = 1e-12);
        assert_relative_eq!(body.velocity, Vec3::new(2.0, 0.0, -15.0), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_aim_throws_nothing() {
        let mut pool = SpherePool::new(ProjectileConfig::default());
        assert!(pool.throw(Vec3::zeros(), 0.35, Vec3::zeros(), &aim(Vec3::zeros())).is_none());
        assert_eq!(pool.next_index(), 0);
    }
}
