//! Abstract spatial query interface over static world triangles
//!
//! Index structures only differ in how they narrow the candidate set; the
//! per-triangle tests and contact aggregation are shared through the
//! provided methods, so every implementation answers queries identically.

use log::trace;

use super::aabb::Aabb;
use crate::foundation::math::Vec3;
use crate::physics::collision::{
    Capsule, Collider, Contact, ContactPolicy, Ray, RayHit, Sphere, Triangle,
};

/// Direction of the parity ray used by [`SpatialQuery::contains_point`]
///
/// Skewed off every axis and diagonal so the ray does not run through the
/// shared edges of axis-aligned quads, where one crossing would count twice.
const CONTAINMENT_RAY: Vec3 = Vec3::new(1.0, 0.0137, 0.0071);

/// Read-only queries against indexed world geometry
pub trait SpatialQuery: Send + Sync {
    /// Every indexed triangle; candidate indices refer into this slice
    fn triangles(&self) -> &[Triangle];

    /// Aggregation policy for multi-triangle contacts
    fn contact_policy(&self) -> ContactPolicy;

    /// Ascending, duplicate-free indices of triangles that may overlap `region`
    fn region_candidates(&self, region: &Aabb) -> Vec<usize>;

    /// Ascending, duplicate-free indices of triangles the ray may hit within `max_distance`
    fn ray_candidates(&self, ray: &Ray, max_distance: f64) -> Vec<usize>;

    /// Number of indexed triangles
    fn triangle_count(&self) -> usize {
        self.triangles().len()
    }

    /// Contact between a collider and the world, if they overlap
    fn intersect(&self, collider: &Collider) -> Option<Contact> {
        let region = collider.bounds();
        let triangles = self.triangles();
        let candidates = self
            .region_candidates(&region)
            .into_iter()
            .filter(|&index| triangles[index].intersects_aabb(&region))
            .map(|index| &triangles[index]);

        let contact = collider.contact_with_triangles(candidates, self.contact_policy());
        if let Some(ref contact) = contact {
            trace!(
                "World contact at {:?}: normal {:?}, depth {:.5}",
                collider.center(),
                contact.normal,
                contact.depth
            );
        }
        contact
    }

    /// Sphere-vs-world query
    fn intersect_sphere(&self, sphere: &Sphere) -> Option<Contact> {
        self.intersect(&Collider::Sphere(*sphere))
    }

    /// Capsule-vs-world query
    fn intersect_capsule(&self, capsule: &Capsule) -> Option<Contact> {
        self.intersect(&Collider::Capsule(*capsule))
    }

    /// Closest triangle hit along the ray within `max_distance`
    ///
    /// Equal distances resolve to the lower triangle index.
    fn ray_cast(&self, ray: &Ray, max_distance: f64) -> Option<RayHit> {
        let triangles = self.triangles();
        let mut closest: Option<RayHit> = None;

        for index in self.ray_candidates(ray, max_distance) {
            let triangle = &triangles[index];
            let Some((distance, _, _)) = triangle.intersect_ray(ray) else {
                continue;
            };
            if distance > max_distance || closest.is_some_and(|hit| hit.distance <= distance) {
                continue;
            }
            let Some(normal) = triangle.normal() else {
                continue;
            };
            closest = Some(RayHit {
                triangle: index,
                distance,
                point: ray.point_at(distance),
                normal,
            });
        }

        closest
    }

    /// Inside/outside test by crossing parity along a fixed skewed ray
    ///
    /// Only meaningful for closed geometry.
    fn contains_point(&self, point: Vec3) -> bool {
        let ray = Ray::new(point, CONTAINMENT_RAY);
        let triangles = self.triangles();
        let crossings = self
            .ray_candidates(&ray, f64::INFINITY)
            .into_iter()
            .filter(|&index| triangles[index].intersect_ray(&ray).is_some())
            .count();
        crossings % 2 == 1
    }
}

/// Linear scan over every triangle
///
/// Reference implementation for tests and worlds too small to be worth an
/// octree.
#[derive(Debug, Clone, Default)]
pub struct BruteForceIndex {
    triangles: Vec<Triangle>,
    policy: ContactPolicy,
}

impl BruteForceIndex {
    /// Wrap a triangle list
    pub fn new(triangles: Vec<Triangle>, policy: ContactPolicy) -> Self {
        Self { triangles, policy }
    }
}

impl SpatialQuery for BruteForceIndex {
    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn contact_policy(&self) -> ContactPolicy {
        self.policy
    }

    fn region_candidates(&self, region: &Aabb) -> Vec<usize> {
        (0..self.triangles.len())
            .filter(|&index| self.triangles[index].bounds().intersects(region))
            .collect()
    }

    fn ray_candidates(&self, _ray: &Ray, _max_distance: f64) -> Vec<usize> {
        (0..self.triangles.len()).collect()
    }
}
