use nalgebra as na;

pub type Point3 = na::Point3<f64>;
pub type Vector3 = na::Vector3<f64>;
pub type Rotation3 = na::Rotation3<f64>;

/// Tolerance for "approximately equal" geometric branching.
pub const EPSILON: f64 = 1e-6;

/// Relative tolerance used by [`is_difference_tiny`].
pub const TINY_RELATIVE: f64 = 1e-10;

pub trait ApproxEq {
    fn approx_eq(&self, other: &Self) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).abs() < EPSILON
    }
}

impl ApproxEq for Point3 {
    fn approx_eq(&self, other: &Self) -> bool {
        na::distance_squared(self, other) < EPSILON * EPSILON
    }
}

impl ApproxEq for Vector3 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() < EPSILON * EPSILON
    }
}

/// True when `a` and `b` differ by less than a tiny fraction of their magnitude.
///
/// Two exact zeros are *not* tiny apart under this rule, matching how
/// near-vertical footprint edges are detected.
#[inline]
pub fn is_difference_tiny(a: f64, b: f64) -> bool {
    (a - b).abs() < TINY_RELATIVE * (a.abs() + b.abs())
}

pub mod primitives;
pub use primitives::*;

pub mod utils_2d;
pub mod utils_3d;
pub use utils_3d::{nearest_point_on_segment, shortest_line_between, Segment3};

pub fn dist_sq(p1: &Point3, p2: &Point3) -> f64 {
    na::distance_squared(p1, p2)
}

/// Horizontal (xy) distance between two points.
pub fn distance_2d(p1: &Point3, p2: &Point3) -> f64 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    (dx * dx + dy * dy).sqrt()
}
