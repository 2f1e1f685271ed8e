//! Procedural test arena
//!
//! A square floor enclosed by inward-facing walls, with optional ramps and
//! box platforms. Used by the demo and by scenario tests in place of a
//! loaded level.

use super::{GeometryError, GeometryProvider};
use crate::foundation::math::Vec3;
use crate::physics::collision::Triangle;

/// Wedge rising along +Z
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    /// Low corner at the foot of the ramp (min X, min Z)
    pub origin: Vec3,
    /// Extent along X
    pub width: f64,
    /// Horizontal extent along Z
    pub length: f64,
    /// Height gained over `length`
    pub rise: f64,
}

/// Solid box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    /// Box center
    pub center: Vec3,
    /// Half size along each axis
    pub half_extents: Vec3,
}

/// Builder for the procedural arena
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaBuilder {
    half_size: f64,
    floor_cells: usize,
    wall_height: f64,
    ramps: Vec<Ramp>,
    platforms: Vec<Platform>,
}

impl Default for ArenaBuilder {
    fn default() -> Self {
        Self {
            half_size: 20.0,
            floor_cells: 8,
            wall_height: 4.0,
            ramps: Vec::new(),
            platforms: Vec::new(),
        }
    }
}

impl ArenaBuilder {
    /// Floor and walls only
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo layout: one ramp leading onto a platform, plus a free-standing block
    pub fn standard() -> Self {
        Self::new()
            .with_ramp(Ramp {
                origin: Vec3::new(4.0, 0.0, -6.0),
                width: 4.0,
                length: 6.0,
                rise: 2.0,
            })
            .with_platform(Platform {
                center: Vec3::new(6.0, 1.0, 3.0),
                half_extents: Vec3::new(2.0, 1.0, 3.0),
            })
            .with_platform(Platform {
                center: Vec3::new(-8.0, 0.75, 8.0),
                half_extents: Vec3::new(1.5, 0.75, 1.5),
            })
    }

    /// Floor spans `[-half_size, half_size]` on X and Z
    pub fn with_half_size(mut self, half_size: f64) -> Self {
        self.half_size = half_size;
        self
    }

    /// Floor grid resolution per side
    pub fn with_floor_cells(mut self, cells: usize) -> Self {
        self.floor_cells = cells;
        self
    }

    /// Wall height; zero leaves the arena open
    pub fn with_wall_height(mut self, height: f64) -> Self {
        self.wall_height = height;
        self
    }

    /// Add a ramp
    pub fn with_ramp(mut self, ramp: Ramp) -> Self {
        self.ramps.push(ramp);
        self
    }

    /// Add a box platform
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platforms.push(platform);
        self
    }

    fn validate(&self) -> Result<(), GeometryError> {
        fn positive(field: &'static str, value: f64) -> Result<(), GeometryError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(GeometryError::InvalidParameter {
                    field,
                    reason: format!("expected a positive number, got {value}"),
                })
            }
        }

        positive("half_size", self.half_size)?;
        if self.floor_cells == 0 {
            return Err(GeometryError::InvalidParameter {
                field: "floor_cells",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.wall_height.is_finite() && self.wall_height >= 0.0) {
            return Err(GeometryError::InvalidParameter {
                field: "wall_height",
                reason: format!("expected a non-negative number, got {}", self.wall_height),
            });
        }
        for ramp in &self.ramps {
            positive("ramp.width", ramp.width)?;
            positive("ramp.length", ramp.length)?;
            positive("ramp.rise", ramp.rise)?;
        }
        for platform in &self.platforms {
            positive("platform.half_extents", platform.half_extents.min())?;
        }
        Ok(())
    }

    /// Generate the arena triangles
    pub fn build(&self) -> Result<Vec<Triangle>, GeometryError> {
        self.validate()?;

        let mut out = Vec::new();
        self.push_floor(&mut out);
        if self.wall_height > 0.0 {
            self.push_walls(&mut out);
        }
        for ramp in &self.ramps {
            push_ramp(&mut out, ramp);
        }
        for platform in &self.platforms {
            push_box(&mut out, platform);
        }
        Ok(out)
    }

    fn push_floor(&self, out: &mut Vec<Triangle>) {
        let h = self.half_size;
        let cell = 2.0 * h / self.floor_cells as f64;
        for i in 0..self.floor_cells {
            for j in 0..self.floor_cells {
                let (x0, z0) = (-h + i as f64 * cell, -h + j as f64 * cell);
                let (x1, z1) = (x0 + cell, z0 + cell);
                push_quad(
                    out,
                    [
                        Vec3::new(x0, 0.0, z0),
                        Vec3::new(x0, 0.0, z1),
                        Vec3::new(x1, 0.0, z1),
                        Vec3::new(x1, 0.0, z0),
                    ],
                    Vec3::y(),
                );
            }
        }
    }

    fn push_walls(&self, out: &mut Vec<Triangle>) {
        let (h, top) = (self.half_size, self.wall_height);
        for (x, facing) in [(-h, Vec3::x()), (h, -Vec3::x())] {
            push_quad(
                out,
                [
                    Vec3::new(x, 0.0, -h),
                    Vec3::new(x, top, -h),
                    Vec3::new(x, top, h),
                    Vec3::new(x, 0.0, h),
                ],
                facing,
            );
        }
        for (z, facing) in [(-h, Vec3::z()), (h, -Vec3::z())] {
            push_quad(
                out,
                [
                    Vec3::new(-h, 0.0, z),
                    Vec3::new(-h, top, z),
                    Vec3::new(h, top, z),
                    Vec3::new(h, 0.0, z),
                ],
                facing,
            );
        }
    }
}

impl GeometryProvider for ArenaBuilder {
    fn triangles(&self) -> Result<Vec<Triangle>, GeometryError> {
        self.build()
    }
}

/// Push a triangle wound so its normal points along `facing`
fn push_triangle(out: &mut Vec<Triangle>, [a, b, c]: [Vec3; 3], facing: Vec3) {
    let triangle = Triangle::new(a, b, c);
    if triangle.scaled_normal().dot(&facing) >= 0.0 {
        out.push(triangle);
    } else {
        out.push(Triangle::new(a, c, b));
    }
}

/// Push a planar quad (corners in perimeter order) as two triangles
fn push_quad(out: &mut Vec<Triangle>, [a, b, c, d]: [Vec3; 4], facing: Vec3) {
    push_triangle(out, [a, b, c], facing);
    push_triangle(out, [a, c, d], facing);
}

fn push_ramp(out: &mut Vec<Triangle>, ramp: &Ramp) {
    let o = ramp.origin;
    let (x0, x1) = (o.x, o.x + ramp.width);
    let (z0, z1) = (o.z, o.z + ramp.length);
    let (y0, y1) = (o.y, o.y + ramp.rise);
    let slope_normal = Vec3::new(0.0, ramp.length, -ramp.rise);

    push_quad(
        out,
        [
            Vec3::new(x0, y0, z0),
            Vec3::new(x0, y1, z1),
            Vec3::new(x1, y1, z1),
            Vec3::new(x1, y0, z0),
        ],
        slope_normal,
    );
    push_quad(
        out,
        [
            Vec3::new(x0, y0, z1),
            Vec3::new(x0, y1, z1),
            Vec3::new(x1, y1, z1),
            Vec3::new(x1, y0, z1),
        ],
        Vec3::z(),
    );
    for (x, facing) in [(x0, -Vec3::x()), (x1, Vec3::x())] {
        push_triangle(
            out,
            [Vec3::new(x, y0, z0), Vec3::new(x, y0, z1), Vec3::new(x, y1, z1)],
            facing,
        );
    }
}

fn push_box(out: &mut Vec<Triangle>, platform: &Platform) {
    let (c, e) = (platform.center, platform.half_extents);
    let corner = |sx: f64, sy: f64, sz: f64| c + Vec3::new(e.x * sx, e.y * sy, e.z * sz);

    for axis in 0..3 {
        for sign in [-1.0, 1.0] {
            // Two in-plane axes, walked around the face perimeter
            let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
            let point = |su: f64, sv: f64| {
                let mut s = [0.0; 3];
                s[axis] = sign;
                s[u] = su;
                s[v] = sv;
                corner(s[0], s[1], s[2])
            };
            let mut facing = Vec3::zeros();
            facing[axis] = sign;
            push_quad(
                out,
                [point(-1.0, -1.0), point(1.0, -1.0), point(1.0, 1.0), point(-1.0, 1.0)],
                facing,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{Octree, OctreeConfig, SpatialQuery};
    use approx::assert_relative_eq;

    #[test]
    fn test_standard_arena_triangle_count() {
        let triangles = ArenaBuilder::standard().build().unwrap();
        // floor 8×8 quads, 4 walls, ramp (slope, back, 2 sides), 2 boxes
        let expected = 8 * 8 * 2 + 4 * 2 + (2 + 2 + 2) + 2 * 12;
        assert_eq!(triangles.len(), expected);
        assert!(triangles.iter().all(|t| t.is_finite() && !t.is_degenerate()));
    }

    #[test]
    fn test_floor_faces_up_and_walls_face_in() {
        let arena = ArenaBuilder::new().with_floor_cells(2);
        let triangles = arena.build().unwrap();
        let inside = Vec3::new(0.0, 2.0, 0.0);
        for triangle in &triangles {
            let normal = triangle.normal().unwrap();
            assert!(normal.dot(&(inside - triangle.centroid())) > 0.0);
        }
        assert_relative_eq!(triangles[0].normal().unwrap(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_box_faces_point_outward() {
        let platform = Platform {
            center: Vec3::new(1.0, 2.0, 3.0),
            half_extents: Vec3::new(0.5, 1.0, 2.0),
        };
        let mut triangles = Vec::new();
        push_box(&mut triangles, &platform);
        assert_eq!(triangles.len(), 12);
        for triangle in &triangles {
            let normal = triangle.normal().unwrap();
            assert!(normal.dot(&(triangle.centroid() - platform.center)) > 0.0);
        }
    }

    #[test]
    fn test_ramp_slope_normal() {
        let mut triangles = Vec::new();
        push_ramp(
            &mut triangles,
            &Ramp {
                origin: Vec3::zeros(),
                width: 2.0,
                length: 4.0,
                rise: 1.0,
            },
        );
        let expected = Vec3::new(0.0, 4.0, -1.0).normalize();
        assert_relative_eq!(triangles[0].normal().unwrap(), expected, epsilon = 1e-12);
        assert_relative_eq!(triangles[1].normal().unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            ArenaBuilder::new().with_half_size(-1.0).build(),
            Err(GeometryError::InvalidParameter { field: "half_size", .. })
        ));
        assert!(matches!(
            ArenaBuilder::new().with_floor_cells(0).build(),
            Err(GeometryError::InvalidParameter { field: "floor_cells", .. })
        ));
        let flat_box = Platform {
            center: Vec3::zeros(),
            half_extents: Vec3::new(1.0, 0.0, 1.0),
        };
        assert!(ArenaBuilder::new().with_platform(flat_box).build().is_err());
    }

    #[test]
    fn test_open_arena_has_no_walls() {
        let triangles = ArenaBuilder::new()
            .with_floor_cells(1)
            .with_wall_height(0.0)
            .build()
            .unwrap();
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn test_platform_interiors_are_solid_in_open_arena() {
        let triangles = ArenaBuilder::standard().with_wall_height(0.0).build().unwrap();
        let octree = Octree::build(triangles, OctreeConfig::default());
        assert!(octree.contains_point(Vec3::new(6.0, 1.0, 3.0)));
        assert!(octree.contains_point(Vec3::new(-8.0, 0.75, 8.0)));
        assert!(!octree.contains_point(Vec3::new(0.0, 3.0, 0.0)));
    }
}
