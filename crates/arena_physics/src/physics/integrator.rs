//! Per-body integration step
//!
//! Semi-implicit Euler with exponential damping, followed by one world
//! query and a velocity/position correction. Runs identically for the
//! player capsule and every sphere; the body's [`BodyProfile`] supplies the
//! constants that differ.
//!
//! The step is split into [`damp`] and [`advance`] so that control input
//! can be added to an already damped velocity.
//!
//! [`BodyProfile`]: crate::config::BodyProfile

use super::body::{BodyState, RigidBody};
use crate::config::PhysicsConfig;
use crate::physics::collision::Contact;
use crate::spatial::SpatialQuery;

/// World-wide constants read by every integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationParams {
    /// Gravity magnitude along -Y
    pub gravity: f64,
    /// Minimum normal Y for a contact to count as ground
    pub floor_normal_min_y: f64,
    /// Contacts shallower than this are not positionally corrected
    pub contact_epsilon: f64,
    /// Extra reach of the world query while a body is grounded
    pub ground_skin: f64,
}

impl From<&PhysicsConfig> for IntegrationParams {
    fn from(config: &PhysicsConfig) -> Self {
        Self {
            gravity: config.gravity,
            floor_normal_min_y: config.floor_normal_min_y,
            contact_epsilon: config.contact_epsilon,
            ground_skin: config.ground_skin,
        }
    }
}

impl Default for IntegrationParams {
    fn default() -> Self {
        Self::from(&PhysicsConfig::default())
    }
}

/// Advance one body by `dt` and resolve it against the world
///
/// Returns the contact that was applied, if any.
pub fn integrate(
    body: &mut RigidBody,
    world: &dyn SpatialQuery,
    params: &IntegrationParams,
    dt: f64,
) -> Option<Contact> {
    damp(body, params, dt);
    advance(body, world, params, dt)
}

/// Gravity (airborne only) and exponential damping for one step
pub fn damp(body: &mut RigidBody, params: &IntegrationParams, dt: f64) {
    let mut damping = (-body.profile.damping * dt).exp() - 1.0;
    if body.state == BodyState::Airborne {
        body.velocity.y -= params.gravity * dt;
        damping *= body.profile.air_damping_scale;
    }
    body.velocity += body.velocity * damping;
}

/// Move by the current velocity, then resolve against the world
///
/// Grounded bodies query with their radius grown by `ground_skin`, so a
/// body resting on a slope keeps its ground contact through rounding.
pub fn advance(
    body: &mut RigidBody,
    world: &dyn SpatialQuery,
    params: &IntegrationParams,
    dt: f64,
) -> Option<Contact> {
    body.translate(body.velocity * dt);

    let skin = if body.is_grounded() { params.ground_skin } else { 0.0 };
    let Some(mut contact) = world.intersect(&body.collider.inflated(skin)) else {
        body.state = BodyState::Airborne;
        return None;
    };
    contact.depth = (contact.depth - skin).max(0.0);
    apply_contact(body, &contact, params);
    Some(contact)
}

/// Velocity and position response to a world contact
pub fn apply_contact(body: &mut RigidBody, contact: &Contact, params: &IntegrationParams) {
    let normal = contact.normal;
    let approach = normal.dot(&body.velocity);

    if normal.y > params.floor_normal_min_y {
        body.state = BodyState::Grounded;
        body.velocity -= normal * approach.min(0.0);
    } else {
        body.state = BodyState::Airborne;
        let bounce = if approach < 0.0 { 1.0 + body.profile.restitution } else { 1.0 };
        body.velocity -= normal * (approach * bounce);
    }

    if contact.depth >= params.contact_epsilon {
        body.translate(contact.correction());
    }
}
