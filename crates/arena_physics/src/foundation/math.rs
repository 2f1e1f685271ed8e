//! Math utilities and types
//!
//! The simulation runs in double precision; every vector in the crate is a
//! `nalgebra::Vector3<f64>`.

pub use nalgebra::Vector3;

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// World up axis
pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Normalize `v`, or return `fallback` when `v` has no usable length.
///
/// nalgebra's `normalize` divides by zero on a zero vector, which would leak
/// NaNs into body state.
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize(f64::EPSILON).unwrap_or(fallback)
}

/// Component-wise minimum of two vectors
pub fn component_min(a: &Vec3, b: &Vec3) -> Vec3 {
    a.inf(b)
}

/// Component-wise maximum of two vectors
pub fn component_max(a: &Vec3, b: &Vec3) -> Vec3 {
    a.sup(b)
}

/// Closest point to `p` on the segment `a`-`b`, and its segment parameter in `[0, 1]`
pub fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> (Vec3, f64) {
    let ab = b - a;
    let len_sq = ab.magnitude_squared();
    if len_sq <= f64::EPSILON {
        return (a, 0.0);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Closest points between segments `p1`-`q1` and `p2`-`q2`.
///
/// Returns the point on the first segment and the point on the second.
/// Degenerate (zero-length) segments collapse to point queries.
/// Ericson, "Real-Time Collision Detection", 5.1.9.
pub fn closest_points_between_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    const EPSILON: f64 = 1e-12;

    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.magnitude_squared();
    let e = d2.magnitude_squared();
    let f = d2.dot(&r);

    if a <= EPSILON && e <= EPSILON {
        return (p1, p2);
    }

    let (s, t) = if a <= EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;

            // Parallel segments: any s works, start from p1
            let mut s = if denom > EPSILON {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}
