//! Collider shapes and collider-vs-world contacts
//!
//! Both body types query the world the same way and differ only in the
//! closest-point primitive, so the shape is a tagged variant and the
//! contact routine dispatches on it.

use serde::{Deserialize, Serialize};

use super::primitives::{Capsule, Sphere, Triangle};
use crate::foundation::math::{normalize_or, Vec3, UP};
use crate::spatial::Aabb;

/// Separation information for an overlapping collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing away from the surface into free space
    pub normal: Vec3,
    /// Penetration distance along `normal` (never negative)
    pub depth: f64,
}

impl Contact {
    /// Translation that removes the overlap
    pub fn correction(&self) -> Vec3 {
        self.normal * self.depth
    }
}

/// How overlaps with several triangles combine into one contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactPolicy {
    /// Report the single deepest triangle contact (earliest triangle wins ties)
    #[default]
    Deepest,
    /// Push the collider out of each triangle in turn and report the total push
    Accumulate,
}

/// Collision volume of a rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collider {
    /// Player-style capsule
    Capsule(Capsule),
    /// Projectile sphere
    Sphere(Sphere),
}

impl Collider {
    /// Swept radius of the shape
    pub fn radius(&self) -> f64 {
        match self {
            Self::Capsule(capsule) => capsule.radius,
            Self::Sphere(sphere) => sphere.radius,
        }
    }

    /// Sphere center or capsule midpoint
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Capsule(capsule) => capsule.center(),
            Self::Sphere(sphere) => sphere.center,
        }
    }

    /// Core segment of the shape (start == end for spheres)
    pub fn axis(&self) -> (Vec3, Vec3) {
        match self {
            Self::Capsule(capsule) => (capsule.start, capsule.end),
            Self::Sphere(sphere) => (sphere.center, sphere.center),
        }
    }

    /// Axis-aligned bounds of the shape
    pub fn bounds(&self) -> Aabb {
        match self {
            Self::Capsule(capsule) => capsule.bounds(),
            Self::Sphere(sphere) => sphere.bounds(),
        }
    }

    /// Move the shape by `delta`
    pub fn translate(&mut self, delta: Vec3) {
        match self {
            Self::Capsule(capsule) => capsule.translate(delta),
            Self::Sphere(sphere) => sphere.center += delta,
        }
    }

    /// Closest points between the shape's core and a triangle
    ///
    /// Returns (point on core, point on triangle).
    pub fn closest_points(&self, triangle: &Triangle) -> (Vec3, Vec3) {
        match self {
            Self::Sphere(sphere) => (sphere.center, triangle.closest_point(sphere.center)),
            Self::Capsule(capsule) => {
                triangle.closest_points_to_segment(capsule.start, capsule.end)
            }
        }
    }

    /// Copy of the shape with its radius grown by `margin`
    pub fn inflated(&self, margin: f64) -> Self {
        match *self {
            Self::Capsule(Capsule { start, end, radius }) => {
                Self::Capsule(Capsule::new(start, end, radius + margin))
            }
            Self::Sphere(Sphere { center, radius }) => {
                Self::Sphere(Sphere::new(center, radius + margin))
            }
        }
    }

    /// Contact against a single triangle, if the shape overlaps or touches it
    ///
    /// A shape resting exactly on the surface yields a zero-depth contact.
    pub fn triangle_contact(&self, triangle: &Triangle) -> Option<Contact> {
        let radius = self.radius();
        if radius <= 0.0 {
            return None;
        }
        let (on_core, on_triangle) = self.closest_points(triangle);
        let offset = on_core - on_triangle;
        let distance_sq = offset.magnitude_squared();
        if distance_sq > radius * radius {
            return None;
        }

        let distance = distance_sq.sqrt();
        if distance > 1e-12 {
            return Some(Contact {
                normal: offset / distance,
                depth: radius - distance,
            });
        }

        // Core touches the triangle: separate along the face normal, on the
        // side where most of the core sits
        let Some(face_normal) = triangle.normal() else {
            return Some(Contact { normal: UP, depth: radius });
        };
        let (start, end) = self.axis();
        let ds = (start - triangle.v0).dot(&face_normal);
        let de = (end - triangle.v0).dot(&face_normal);
        let (normal, ds, de) = if ds + de >= 0.0 {
            (face_normal, ds, de)
        } else {
            (-face_normal, -ds, -de)
        };
        Some(Contact {
            normal,
            depth: radius - ds.min(de),
        })
    }

    /// Combine the contacts against a candidate triangle set
    pub fn contact_with_triangles<'a, I>(
        &self,
        triangles: I,
        policy: ContactPolicy,
    ) -> Option<Contact>
    where
        I: IntoIterator<Item = &'a Triangle>,
    {
        match policy {
            ContactPolicy::Deepest => triangles
                .into_iter()
                .filter_map(|triangle| self.triangle_contact(triangle))
                .fold(None, |deepest: Option<Contact>, contact| match deepest {
                    Some(best) if best.depth >= contact.depth => Some(best),
                    _ => Some(contact),
                }),
            ContactPolicy::Accumulate => {
                let mut moved = *self;
                let mut total = Vec3::zeros();
                let mut last_normal = None;
                for triangle in triangles {
                    if let Some(contact) = moved.triangle_contact(triangle) {
                        moved.translate(contact.correction());
                        total += contact.correction();
                        last_normal = Some(contact.normal);
                    }
                }
                last_normal.map(|fallback| Contact {
                    normal: normalize_or(total, fallback),
                    depth: total.magnitude(),
                })
            }
        }
    }
}

impl From<Capsule> for Collider {
    fn from(capsule: Capsule) -> Self {
        Self::Capsule(capsule)
    }
}

impl From<Sphere> for Collider {
    fn from(sphere: Sphere) -> Self {
        Self::Sphere(sphere)
    }
}
