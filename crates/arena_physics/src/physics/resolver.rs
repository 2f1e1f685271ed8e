//! Pairwise dynamic-body collision response
//!
//! Bodies have equal mass, so an elastic collision swaps the velocity
//! components along the contact normal and leaves tangential motion alone.

use log::trace;

use super::body::RigidBody;
use crate::foundation::math::{normalize_or, Vec3, UP};

/// Swap the components of two velocities along `normal`
fn exchange_normal_velocity(a: &mut Vec3, b: &mut Vec3, normal: &Vec3) {
    let va = normal * normal.dot(a);
    let vb = normal * normal.dot(b);
    *a += vb - va;
    *b += va - vb;
}

/// Resolve every overlapping pair of spheres
///
/// Pairs are visited in ascending `(i, j > i)` order. Each overlapping pair
/// exchanges normal velocity and is pushed apart by half the overlap each.
/// Bodies are treated as spheres of their collider's center and radius.
/// Returns the number of pairs resolved.
pub fn resolve_sphere_pairs(spheres: &mut [RigidBody]) -> usize {
    let mut resolved = 0;

    for i in 0..spheres.len() {
        let (head, tail) = spheres.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            let offset = a.position() - b.position();
            let reach = a.collider.radius() + b.collider.radius();
            let distance_sq = offset.magnitude_squared();
            if distance_sq >= reach * reach {
                continue;
            }

            let normal = normalize_or(offset, UP);
            exchange_normal_velocity(&mut a.velocity, &mut b.velocity, &normal);

            let push = normal * ((reach - distance_sq.sqrt()) * 0.5);
            a.translate(push);
            b.translate(-push);
            resolved += 1;
        }
    }

    if resolved > 0 {
        trace!("Resolved {} sphere pairs", resolved);
    }
    resolved
}

/// Resolve a sphere against the player capsule
///
/// The capsule is approximated by its start, end and midpoint, tested in
/// that order. Each hit exchanges normal velocity between the two bodies and
/// pushes the sphere away by the full overlap; the capsule itself is never
/// moved here. Returns true if any point touched.
pub fn resolve_sphere_capsule(sphere: &mut RigidBody, player: &mut RigidBody) -> bool {
    let Some(capsule) = player.capsule().copied() else {
        return false;
    };
    let reach = capsule.radius + sphere.collider.radius();
    let mut touched = false;

    for point in [capsule.start, capsule.end, capsule.center()] {
        let offset = point - sphere.position();
        let distance_sq = offset.magnitude_squared();
        if distance_sq >= reach * reach {
            continue;
        }

        let normal = normalize_or(offset, UP);
        exchange_normal_velocity(&mut player.velocity, &mut sphere.velocity, &normal);
        sphere.translate(-normal * (reach - distance_sq.sqrt()));
        touched = true;
    }

    touched
}
