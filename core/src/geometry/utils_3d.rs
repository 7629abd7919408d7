//! 3D segment utilities.
//!
//! This module provides nearest-point queries between points and segments and
//! between pairs of segments, used by the mesh clearance checks.

use super::{Point3, Vector3, EPSILON};
use nalgebra as na;

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment3 {
    pub first: Point3,
    pub second: Point3,
}

impl Segment3 {
    pub fn new(first: Point3, second: Point3) -> Self {
        Self { first, second }
    }

    pub fn length(&self) -> f64 {
        na::distance(&self.first, &self.second)
    }
}

// =============================================================================
// Point to Segment
// =============================================================================

/// Closest point to `point` on the segment `start-end`.
/// A degenerate segment returns `start`.
pub fn nearest_point_on_segment(start: &Point3, end: &Point3, point: &Point3) -> Point3 {
    let d = end - start;
    let len_sq = d.norm_squared();
    if len_sq == 0.0 {
        return *start;
    }
    let t = ((point - start).dot(&d) / len_sq).clamp(0.0, 1.0);
    start + d * t
}

// =============================================================================
// Segment to Segment
// =============================================================================

/// Shortest connection between two segments (or lines, when `clamp` is false).
///
/// Returns a segment whose `first` lies on `a` and whose `second` lies on `b`.
/// Parallel inputs pick the endpoint pairing closest along `a`.
pub fn shortest_line_between(a: &Segment3, b: &Segment3, clamp: bool) -> Segment3 {
    let va = a.second - a.first;
    let vb = b.second - b.first;
    let mag_a = va.norm();
    let mag_b = vb.norm();

    if mag_a == 0.0 {
        if mag_b == 0.0 {
            return Segment3::new(a.first, b.first);
        }
        return Segment3::new(a.first, nearest_point_on_segment(&b.first, &b.second, &a.first));
    } else if mag_b == 0.0 {
        return Segment3::new(nearest_point_on_segment(&a.first, &a.second, &b.first), b.first);
    }

    let ua = va / mag_a;
    let ub = vb / mag_b;
    let cross = ua.cross(&ub);
    let denom = cross.norm_squared();

    // denom is sin^2 of the angle between the directions
    if denom < EPSILON * EPSILON {
        return parallel_endpoints(a, b, &ua, mag_a, clamp);
    }

    let t = b.first - a.first;
    let t0 = det3(&t, &ub, &cross) / denom;
    let t1 = det3(&t, &ua, &cross) / denom;

    let mut pa = a.first + ua * t0;
    let mut pb = b.first + ub * t1;

    if clamp {
        if t0 < 0.0 {
            pa = a.first;
        } else if t0 > mag_a {
            pa = a.second;
        }

        if t1 < 0.0 {
            pb = b.first;
        } else if t1 > mag_b {
            pb = b.second;
        }

        if t0 < 0.0 || t0 > mag_a {
            let dot = ub.dot(&(pa - b.first)).clamp(0.0, mag_b);
            pb = b.first + ub * dot;
        }

        if t1 < 0.0 || t1 > mag_b {
            let dot = ua.dot(&(pb - a.first)).clamp(0.0, mag_a);
            pa = a.first + ua * dot;
        }
    }

    Segment3::new(pa, pb)
}

fn parallel_endpoints(a: &Segment3, b: &Segment3, ua: &Vector3, mag_a: f64, clamp: bool) -> Segment3 {
    let d0 = ua.dot(&(b.first - a.first));
    if clamp {
        let d1 = ua.dot(&(b.second - a.first));
        if d0 <= 0.0 && d1 <= 0.0 {
            if d0.abs() < d1.abs() {
                return Segment3::new(a.first, b.first);
            }
            return Segment3::new(a.first, b.second);
        } else if d0 >= mag_a && d1 >= mag_a {
            if d0.abs() < d1.abs() {
                return Segment3::new(a.second, b.first);
            }
            return Segment3::new(a.second, b.second);
        }
    }
    Segment3::new(a.first, b.first)
}

/// Determinant of the 3x3 matrix with the given rows.
fn det3(r0: &Vector3, r1: &Vector3, r2: &Vector3) -> f64 {
    na::Matrix3::from_rows(&[r0.transpose(), r1.transpose(), r2.transpose()]).determinant()
}

// =============================================================================
// Tests
// =============================================================================
