//! Primitive collision shapes and intersection algorithms
//!
//! Provides basic geometric primitives (rays, spheres, capsules, triangles)
//! with the triangle-level tests the world index is built from.

use crate::foundation::math::{
    closest_point_on_segment, closest_points_between_segments, component_max, component_min, Vec3,
};
use crate::spatial::Aabb;

/// A ray for ray casting and point containment
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray cast against world geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Index of the triangle that was hit
    pub triangle: usize,
    /// The distance from the ray origin to the hit point
    pub distance: f64,
    /// The point of intersection in world space
    pub point: Vec3,
    /// The surface normal of the hit triangle
    pub normal: Vec3,
}

/// A sphere collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f64,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Axis-aligned bounds of the sphere
    pub fn bounds(&self) -> Aabb {
        let r = Vec3::repeat(self.radius);
        Aabb::new(self.center - r, self.center + r)
    }
}

/// A capsule collider: a segment swept by a radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// Segment start (the player's feet)
    pub start: Vec3,
    /// Segment end (the player's head)
    pub end: Vec3,
    /// Radius around the segment
    pub radius: f64,
}

impl Capsule {
    /// Creates a new capsule
    pub fn new(start: Vec3, end: Vec3, radius: f64) -> Self {
        Self { start, end, radius }
    }

    /// Midpoint of the axis segment
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    /// Move both endpoints by `delta`
    pub fn translate(&mut self, delta: Vec3) {
        self.start += delta;
        self.end += delta;
    }

    /// Axis-aligned bounds of the capsule
    pub fn bounds(&self) -> Aabb {
        let r = Vec3::repeat(self.radius);
        Aabb::new(
            component_min(&self.start, &self.end) - r,
            component_max(&self.start, &self.end) + r,
        )
    }
}

/// A triangle of static world geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex in world space
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized face normal (right-hand rule); its length is twice the area
    pub fn scaled_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit face normal (right-hand rule), `None` for degenerate triangles
    pub fn normal(&self) -> Option<Vec3> {
        self.scaled_normal().try_normalize(f64::EPSILON)
    }

    /// True if the triangle has no area
    pub fn is_degenerate(&self) -> bool {
        self.normal().is_none()
    }

    /// True if every vertex is finite
    pub fn is_finite(&self) -> bool {
        [self.v0, self.v1, self.v2]
            .iter()
            .all(|v| v.iter().all(|c| c.is_finite()))
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Axis-aligned bounds of the triangle
    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            component_min(&component_min(&self.v0, &self.v1), &self.v2),
            component_max(&component_max(&self.v0, &self.v1), &self.v2),
        )
    }

    /// Möller-Trumbore ray-triangle intersection algorithm
    /// Returns (t, u, v) barycentric coordinates if hit, None otherwise
    ///
    /// See: "Fast, Minimum Storage Ray/Triangle Intersection" by Möller & Trumbore
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f64, f64, f64)> {
        const EPSILON: f64 = 1e-12;

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to triangle?
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        if t >= 0.0 {
            Some((t, u, v))
        } else {
            None
        }
    }

    /// Get the closest point on the triangle to a given point
    ///
    /// Ericson, "Real-Time Collision Detection", 5.1.5.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let v0_to_point = point - self.v0;

        let d1 = edge1.dot(&v0_to_point);
        let d2 = edge2.dot(&v0_to_point);

        // Vertex region outside v0
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.v0;
        }

        // Vertex region outside v1
        let v1_to_point = point - self.v1;
        let d3 = edge1.dot(&v1_to_point);
        let d4 = edge2.dot(&v1_to_point);
        if d3 >= 0.0 && d4 <= d3 {
            return self.v1;
        }

        // Edge region v0-v1
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.v0 + edge1 * v;
        }

        // Vertex region outside v2
        let v2_to_point = point - self.v2;
        let d5 = edge1.dot(&v2_to_point);
        let d6 = edge2.dot(&v2_to_point);
        if d6 >= 0.0 && d5 <= d6 {
            return self.v2;
        }

        // Edge region v0-v2
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.v0 + edge2 * w;
        }

        // Edge region v1-v2
        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.v1 + (self.v2 - self.v1) * w;
        }

        // Face region
        let denom = va + vb + vc;
        if denom.abs() <= f64::EPSILON {
            // Collinear vertices: the face region is empty, fall back to the edges
            return self.closest_point_on_edges(point);
        }
        let v = vb / denom;
        let w = vc / denom;
        self.v0 + edge1 * v + edge2 * w
    }

    fn closest_point_on_edges(&self, point: Vec3) -> Vec3 {
        [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)]
            .into_iter()
            .map(|(a, b)| closest_point_on_segment(a, b, point).0)
            .min_by(|a, b| {
                (a - point)
                    .magnitude_squared()
                    .total_cmp(&(b - point).magnitude_squared())
            })
            .unwrap_or(self.v0)
    }

    /// Closest points between the segment `start`-`end` and this triangle
    ///
    /// Returns (point on segment, point on triangle). A zero-length segment is
    /// the point query.
    pub fn closest_points_to_segment(&self, start: Vec3, end: Vec3) -> (Vec3, Vec3) {
        let axis = end - start;

        // Segment crossing the face: distance is zero at the crossing point
        if let Some(n) = self.normal() {
            let ds = (start - self.v0).dot(&n);
            let de = (end - self.v0).dot(&n);
            if ds * de <= 0.0 && (ds - de).abs() > f64::EPSILON {
                let crossing = start + axis * (ds / (ds - de));
                if self.contains_coplanar_point(crossing, &n) {
                    return (crossing, crossing);
                }
            }
        }

        let mut best = {
            let on_tri = self.closest_point(start);
            (start, on_tri, (start - on_tri).magnitude_squared())
        };
        let mut consider = |on_segment: Vec3, on_triangle: Vec3| {
            let d2 = (on_segment - on_triangle).magnitude_squared();
            if d2 < best.2 {
                best = (on_segment, on_triangle, d2);
            }
        };

        let on_tri = self.closest_point(end);
        consider(end, on_tri);

        for (a, b) in [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)] {
            let (on_segment, on_edge) = closest_points_between_segments(start, end, a, b);
            consider(on_segment, on_edge);
        }

        (best.0, best.1)
    }

    /// Point-in-triangle test for a point on the triangle's plane
    fn contains_coplanar_point(&self, p: Vec3, n: &Vec3) -> bool {
        let edges = [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)];
        edges
            .iter()
            .all(|(a, b)| (b - a).cross(&(p - a)).dot(n) >= -1e-12)
    }

    /// Separating-axis overlap test against an axis-aligned box
    ///
    /// Tests the 3 box face normals, the triangle normal and the 9
    /// edge cross products (Akenine-Möller).
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let extents = aabb.extents();
        let v0 = self.v0 - center;
        let v1 = self.v1 - center;
        let v2 = self.v2 - center;

        // Returns false if `axis` separates the triangle from the box
        let overlaps_on = |axis: Vec3| -> bool {
            if axis.magnitude_squared() <= f64::EPSILON * f64::EPSILON {
                return true;
            }
            let p0 = v0.dot(&axis);
            let p1 = v1.dot(&axis);
            let p2 = v2.dot(&axis);
            let r = extents.x * axis.x.abs() + extents.y * axis.y.abs() + extents.z * axis.z.abs();
            p0.min(p1).min(p2) <= r && p0.max(p1).max(p2) >= -r
        };

        for axis in [Vec3::x(), Vec3::y(), Vec3::z()] {
            if !overlaps_on(axis) {
                return false;
            }
        }

        let edges = [v1 - v0, v2 - v1, v0 - v2];
        if !overlaps_on(edges[0].cross(&edges[1])) {
            return false;
        }

        for box_axis in [Vec3::x(), Vec3::y(), Vec3::z()] {
            for edge in &edges {
                if !overlaps_on(box_axis.cross(edge)) {
                    return false;
                }
            }
        }

        true
    }
}
