//! Octree spatial partitioning structure
//!
//! Divides the space around the static world triangles into hierarchical
//! regions so collider and ray queries only test nearby triangles. A node
//! subdivides into 8 octants while its triangle count exceeds a threshold;
//! a triangle is referenced by every octant its surface overlaps.

use log::debug;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::spatial_query::SpatialQuery;
use crate::config::ConfigError;
use crate::foundation::time::Stopwatch;
use crate::physics::collision::{ContactPolicy, Ray, Triangle};

/// Configuration for octree construction and queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Maximum triangles per leaf before subdivision
    pub triangles_per_leaf: usize,

    /// Minimum node edge length (prevents excessive subdivision)
    pub min_node_size: f64,

    /// Padding added around the triangle bounds before the root is made cubic
    pub bounds_margin: f64,

    /// How contacts against several triangles are combined
    pub contact_policy: ContactPolicy,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            triangles_per_leaf: 8,
            min_node_size: 0.05,
            bounds_margin: 0.01,
            contact_policy: ContactPolicy::Deepest,
        }
    }
}

impl OctreeConfig {
    /// Reject settings that would never terminate or never subdivide sensibly
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.triangles_per_leaf == 0 {
            return Err(ConfigError::Invalid {
                field: "octree.triangles_per_leaf",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.min_node_size.is_finite() && self.min_node_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "octree.min_node_size",
                reason: format!("expected a positive number, got {}", self.min_node_size),
            });
        }
        if !(self.bounds_margin.is_finite() && self.bounds_margin >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "octree.bounds_margin",
                reason: format!("expected a non-negative number, got {}", self.bounds_margin),
            });
        }
        Ok(())
    }
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space bounds of this node
    pub bounds: Aabb,

    /// Indices of triangles overlapping this node (leaves only)
    pub triangles: Vec<usize>,

    /// Child nodes (8 octants), None if this is a leaf
    pub children: Option<Box<[OctreeNode; 8]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl OctreeNode {
    fn new(bounds: Aabb, triangles: Vec<usize>, depth: u32) -> Self {
        Self {
            bounds,
            triangles,
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Recursively split this node until the leaf criteria hold
    fn subdivide(&mut self, all: &[Triangle], config: &OctreeConfig) {
        let should_subdivide = self.triangles.len() > config.triangles_per_leaf
            && self.depth < config.max_depth
            && self.bounds.size().x > config.min_node_size;
        if !should_subdivide {
            return;
        }

        let octants = self.bounds.octants();
        let assigned: Vec<Vec<usize>> = octants
            .iter()
            .map(|octant| {
                self.triangles
                    .iter()
                    .copied()
                    .filter(|&index| all[index].intersects_aabb(octant))
                    .collect()
            })
            .collect();

        // Splitting is pointless when every octant would see every triangle
        if assigned.iter().all(|indices| indices.len() == self.triangles.len()) {
            return;
        }

        let depth = self.depth + 1;
        let mut children = Box::new(std::array::from_fn(|octant| {
            OctreeNode::new(octants[octant], assigned[octant].clone(), depth)
        }));
        for child in children.iter_mut() {
            child.subdivide(all, config);
        }

        self.triangles = Vec::new();
        self.children = Some(children);
    }

    /// Collect triangle indices from leaves whose bounds overlap `region`
    pub fn query_region(&self, region: &Aabb, results: &mut Vec<usize>) {
        if !self.bounds.intersects(region) {
            return;
        }

        match self.children {
            Some(ref children) => {
                for child in children.iter() {
                    child.query_region(region, results);
                }
            }
            None => results.extend_from_slice(&self.triangles),
        }
    }

    /// Collect triangle indices from leaves the ray enters within `max_distance`
    pub fn query_ray(&self, ray: &Ray, max_distance: f64, results: &mut Vec<usize>) {
        match self.bounds.intersect_ray(ray.origin, ray.direction) {
            Some(entry) if entry <= max_distance => {}
            _ => return,
        }

        match self.children {
            Some(ref children) => {
                for child in children.iter() {
                    child.query_ray(ray, max_distance, results);
                }
            }
            None => results.extend_from_slice(&self.triangles),
        }
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves<'a>(&'a self, leaves: &mut Vec<&'a OctreeNode>) {
        if self.is_leaf() {
            leaves.push(self);
        } else if let Some(ref children) = self.children {
            for child in children.iter() {
                child.get_all_leaves(leaves);
            }
        }
    }

    /// Deepest level below (and including) this node
    pub fn max_depth(&self) -> u32 {
        self.children.as_ref().map_or(self.depth, |children| {
            children.iter().map(OctreeNode::max_depth).max().unwrap_or(self.depth)
        })
    }

    /// Count nodes in this subtree
    pub fn count_nodes(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |children| children.iter().map(OctreeNode::count_nodes).sum())
    }
}

/// Static octree over world triangles
///
/// Built once from a triangle list and read-only afterwards. An index built
/// from zero triangles has no root and reports no intersections.
#[derive(Debug, Clone)]
pub struct Octree {
    /// Root node containing every triangle, None for an empty world
    root: Option<OctreeNode>,

    /// Triangle storage; nodes refer to it by index
    triangles: Vec<Triangle>,

    /// Configuration
    config: OctreeConfig,
}

impl Octree {
    /// An index with no geometry
    pub fn empty(config: OctreeConfig) -> Self {
        Self {
            root: None,
            triangles: Vec::new(),
            config,
        }
    }

    /// Build an octree over `triangles`
    pub fn build(triangles: Vec<Triangle>, config: OctreeConfig) -> Self {
        let stopwatch = Stopwatch::start_new();

        let corners = triangles.iter().flat_map(|t| [t.v0, t.v1, t.v2]);
        let Some(bounds) = Aabb::from_points(corners) else {
            debug!("Octree build skipped: no triangles");
            return Self::empty(config);
        };
        let bounds = bounds.expanded(config.bounds_margin).to_cube();

        let mut root = OctreeNode::new(bounds, (0..triangles.len()).collect(), 0);
        root.subdivide(&triangles, &config);

        let octree = Self {
            root: Some(root),
            triangles,
            config,
        };
        debug!(
            "Octree built: {} triangles, {} nodes, {} leaves, depth {} in {:.2} ms",
            octree.triangles.len(),
            octree.node_count(),
            octree.get_all_leaves().len(),
            octree.depth(),
            stopwatch.elapsed_millis()
        );
        octree
    }

    /// Root node, None for an empty world
    pub fn root(&self) -> Option<&OctreeNode> {
        self.root.as_ref()
    }

    /// Bounds of the root node
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|root| root.bounds)
    }

    /// Configuration the index was built with
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// True if the index holds no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves(&self) -> Vec<&OctreeNode> {
        let mut leaves = Vec::new();
        if let Some(ref root) = self.root {
            root.get_all_leaves(&mut leaves);
        }
        leaves
    }

    /// Total node count
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, OctreeNode::count_nodes)
    }

    /// Depth of the deepest leaf
    pub fn depth(&self) -> u32 {
        self.root.as_ref().map_or(0, OctreeNode::max_depth)
    }
}

impl SpatialQuery for Octree {
    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn contact_policy(&self) -> ContactPolicy {
        self.config.contact_policy
    }

    fn region_candidates(&self, region: &Aabb) -> Vec<usize> {
        let mut results = Vec::new();
        if let Some(ref root) = self.root {
            root.query_region(region, &mut results);
        }
        results.sort_unstable();
        results.dedup();
        results
    }

    fn ray_candidates(&self, ray: &Ray, max_distance: f64) -> Vec<usize> {
        let mut results = Vec::new();
        if let Some(ref root) = self.root {
            root.query_ray(ray, max_distance, &mut results);
        }
        results.sort_unstable();
        results.dedup();
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::collision::{Capsule, Collider, Sphere};
    use crate::spatial::BruteForceIndex;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> [Triangle; 2] {
        [Triangle::new(a, b, c), Triangle::new(a, c, d)]
    }

    /// Upward-facing grid of `n`×`n` cells of size `cell` centred on the origin
    fn floor_grid(n: usize, cell: f64) -> Vec<Triangle> {
        let half = n as f64 * cell * 0.5;
        let mut triangles = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let x0 = i as f64 * cell - half;
                let z0 = j as f64 * cell - half;
                let (x1, z1) = (x0 + cell, z0 + cell);
                triangles.extend(quad(
                    Vec3::new(x0, 0.0, z0),
                    Vec3::new(x0, 0.0, z1),
                    Vec3::new(x1, 0.0, z1),
                    Vec3::new(x1, 0.0, z0),
                ));
            }
        }
        triangles
    }

    /// Closed axis-aligned box with outward-facing triangles
    fn closed_box(min: Vec3, max: Vec3) -> Vec<Triangle> {
        let p = |(x, y, z): (bool, bool, bool)| {
            Vec3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        let (lo, hi) = (false, true);
        let faces = [
            [(lo, lo, lo), (lo, lo, hi), (lo, hi, hi), (lo, hi, lo)],
            [(hi, lo, lo), (hi, hi, lo), (hi, hi, hi), (hi, lo, hi)],
            [(lo, lo, lo), (hi, lo, lo), (hi, lo, hi), (lo, lo, hi)],
            [(lo, hi, lo), (lo, hi, hi), (hi, hi, hi), (hi, hi, lo)],
            [(lo, lo, lo), (lo, hi, lo), (hi, hi, lo), (hi, lo, lo)],
            [(lo, lo, hi), (hi, lo, hi), (hi, hi, hi), (lo, hi, hi)],
        ];
        faces
            .into_iter()
            .flat_map(|[a, b, c, d]| quad(p(a), p(b), p(c), p(d)))
            .collect()
    }

    #[test]
    fn test_empty_octree_reports_nothing() {
        let octree = Octree::build(Vec::new(), OctreeConfig::default());
        assert!(octree.is_empty());
        assert!(octree.root().is_none());
        let sphere = Sphere::new(Vec3::zeros(), 10.0);
        assert!(octree.intersect_sphere(&sphere).is_none());
        assert!(!octree.contains_point(Vec3::zeros()));
        let down = Ray::new(Vec3::zeros(), Vec3::new(0.0, -1.0, 0.0));
        assert!(octree.ray_cast(&down, 100.0).is_none());
    }

    #[test]
    fn test_root_contains_every_triangle() {
        let triangles = floor_grid(8, 1.0);
        let octree = Octree::build(triangles.clone(), OctreeConfig::default());
        let root = octree.bounds().unwrap();
        for triangle in &triangles {
            assert!(root.contains(&triangle.bounds()));
        }
        let size = root.size();
        assert_relative_eq!(size.x, size.y);
        assert_relative_eq!(size.y, size.z);
    }

    #[test]
    fn test_subdivision_respects_limits() {
        let config = OctreeConfig {
            max_depth: 3,
            ..OctreeConfig::default()
        };
        let octree = Octree::build(floor_grid(16, 1.0), config);
        assert!(octree.node_count() > 1);
        assert!(octree.depth() <= 3);
        for leaf in octree.get_all_leaves() {
            assert!(leaf.depth == 3 || leaf.triangles.len() <= 8);
        }
    }

    #[test]
    fn test_every_triangle_reachable_from_leaves() {
        let triangles = floor_grid(10, 0.7);
        let octree = Octree::build(triangles.clone(), OctreeConfig::default());
        let mut seen = vec![false; triangles.len()];
        for leaf in octree.get_all_leaves() {
            for &index in &leaf.triangles {
                assert!(triangles[index].intersects_aabb(&leaf.bounds));
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_sphere_query_on_grid() {
        let octree = Octree::build(floor_grid(10, 1.0), OctreeConfig::default());
        let contact = octree
            .intersect_sphere(&Sphere::new(Vec3::new(0.3, 0.15, -1.2), 0.2))
            .unwrap();
        assert_relative_eq!(contact.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(contact.depth, 0.05, epsilon = 1e-12);

        assert!(octree
            .intersect_sphere(&Sphere::new(Vec3::new(0.3, 0.5, -1.2), 0.2))
            .is_none());
    }

    #[test]
    fn test_query_is_idempotent() {
        let octree = Octree::build(floor_grid(6, 1.0), OctreeConfig::default());
        let capsule = Capsule::new(Vec3::new(0.2, 0.3, 0.1), Vec3::new(0.2, 0.95, 0.1), 0.35);
        let first = octree.intersect_capsule(&capsule);
        let second = octree.intersect_capsule(&capsule);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_ray_cast_hits_nearest() {
        let mut triangles = floor_grid(4, 1.0);
        // Second floor above the first
        triangles.extend(floor_grid(4, 1.0).into_iter().map(|t| {
            let up = Vec3::new(0.0, 2.0, 0.0);
            Triangle::new(t.v0 + up, t.v1 + up, t.v2 + up)
        }));
        let octree = Octree::build(triangles, OctreeConfig::default());

        let ray = Ray::new(Vec3::new(0.3, 5.0, 0.6), Vec3::new(0.0, -1.0, 0.0));
        let hit = octree.ray_cast(&ray, 100.0).unwrap();
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-12);
        assert_relative_eq!(hit.point, Vec3::new(0.3, 2.0, 0.6), epsilon = 1e-12);
        assert_relative_eq!(hit.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);

        assert!(octree.ray_cast(&ray, 2.5).is_none());
    }

    #[test]
    fn test_contains_point_in_closed_box() {
        let octree = Octree::build(
            closed_box(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
            OctreeConfig::default(),
        );
        assert!(octree.contains_point(Vec3::new(0.1, 0.23, -0.37)));
        assert!(!octree.contains_point(Vec3::new(3.1, 0.23, -0.37)));
        assert!(!octree.contains_point(Vec3::new(-3.1, 0.23, -0.37)));
    }

    #[test]
    fn test_contains_point_on_box_diagonals() {
        let triangles = closed_box(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let octree = Octree::build(triangles.clone(), OctreeConfig::default());
        let brute = BruteForceIndex::new(triangles, ContactPolicy::Deepest);

        let inside = [
            Vec3::zeros(),
            Vec3::new(0.0, 0.5, 0.5),
            Vec3::new(0.4, -0.4, 0.4),
            Vec3::new(-0.7, 0.0, 0.0),
        ];
        for point in inside {
            assert!(octree.contains_point(point), "{point:?} should be inside");
            assert!(brute.contains_point(point), "{point:?} should be inside");
        }
        let outside = [
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(-2.0, 0.5, 0.5),
            Vec3::new(0.0, 1.5, 0.0),
        ];
        for point in outside {
            assert!(!octree.contains_point(point), "{point:?} should be outside");
            assert!(!brute.contains_point(point), "{point:?} should be outside");
        }
    }

    #[test]
    fn test_octree_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut triangles = Vec::new();
        for _ in 0..300 {
            let base = Vec3::new(
                rng.gen_range(-20.0..20.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-20.0..20.0),
            );
            let mut corner = || {
                base + Vec3::new(
                    rng.gen_range(-1.5..1.5),
                    rng.gen_range(-1.5..1.5),
                    rng.gen_range(-1.5..1.5),
                )
            };
            let (a, b, c) = (corner(), corner(), corner());
            triangles.push(Triangle::new(a, b, c));
        }

        for policy in [ContactPolicy::Deepest, ContactPolicy::Accumulate] {
            let config = OctreeConfig {
                contact_policy: policy,
                ..OctreeConfig::default()
            };
            let octree = Octree::build(triangles.clone(), config);
            let brute = BruteForceIndex::new(triangles.clone(), policy);

            for _ in 0..200 {
                let center = Vec3::new(
                    rng.gen_range(-22.0..22.0),
                    rng.gen_range(-6.0..6.0),
                    rng.gen_range(-22.0..22.0),
                );
                let radius = rng.gen_range(0.1..1.5);
                let collider: Collider = if rng.gen_bool(0.5) {
                    Sphere::new(center, radius).into()
                } else {
                    let height = rng.gen_range(0.0..2.0);
                    Capsule::new(center, center + Vec3::new(0.0, height, 0.0), radius).into()
                };
                assert_eq!(octree.intersect(&collider), brute.intersect(&collider));
            }
        }
    }
}
