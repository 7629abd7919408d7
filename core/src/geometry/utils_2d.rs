//! 2D geometry utilities working in the horizontal (xy) plane.
//!
//! Points carry a z coordinate, which is interpolated but never used for the
//! intersection decision itself.

use super::{Interval, Point3, Vector3};

// =============================================================================
// Polygon Operations
// =============================================================================

/// Compute signed area of a polygon using the Shoelace formula.
/// Positive = CCW winding, Negative = CW winding.
pub fn polygon_signed_area(vertices: &[[f64; 2]]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i][0] * vertices[j][1];
        area -= vertices[j][0] * vertices[i][1];
    }
    area / 2.0
}

/// Compute absolute area of a polygon.
pub fn polygon_area(vertices: &[[f64; 2]]) -> f64 {
    polygon_signed_area(vertices).abs()
}

// =============================================================================
// Segment Intersection
// =============================================================================

/// Intersection of segments `a1-a2` and `b1-b2` projected onto the xy plane.
///
/// Endpoints count as intersecting. Collinear overlapping segments report the
/// midpoint of their shared range. The z of the result is interpolated along
/// `b1-b2`.
pub fn segment_intersection(a1: &Point3, a2: &Point3, b1: &Point3, b2: &Point3) -> Option<Point3> {
    // a1 + t (a2 - a1) = b1 + s (b2 - b1)
    let da = a2 - a1;
    let db = b2 - b1;
    let dab = a1 - b1;

    let det = -da.x * db.y + da.y * db.x;
    if det == 0.0 {
        return collinear_overlap(b1, b2, &da, &dab);
    }

    let inv = 1.0 / det;
    let t = inv * (db.y * dab.x - db.x * dab.y);
    let s = inv * (da.y * dab.x - da.x * dab.y);
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&s) {
        return None;
    }

    Some(b1 + db * s)
}

fn collinear_overlap(
    b1: &Point3,
    b2: &Point3,
    da: &Vector3,
    dab: &Vector3,
) -> Option<Point3> {
    let db = b2 - b1;

    // Parallel but not on the same line
    if -dab.x * db.y + dab.y * db.x != 0.0 {
        return None;
    }

    if db.x.abs() > db.y.abs() {
        let overlap = Interval::new(dab.x, dab.x + da.x).intersect(&Interval::new(0.0, db.x))?;
        let dx = overlap.mean();
        Some(b1 + db * (dx / db.x))
    } else if db.y == 0.0 {
        // b degenerates to a point
        if !Interval::new(dab.y, dab.y + da.y).contains(0.0) {
            return None;
        }
        Some(*b1)
    } else {
        let overlap = Interval::new(dab.y, dab.y + da.y).intersect(&Interval::new(0.0, db.y))?;
        let dy = overlap.mean();
        Some(b1 + db * (dy / db.y))
    }
}

// =============================================================================
// Tests
// =============================================================================
