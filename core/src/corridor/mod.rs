//! Corridor centerlines and their parallel offsets.
//!
//! A [`CorridorPath`] keeps a cleaned copy of the input polyline together with
//! one offset direction per path corner, so shifted flight lines and hull
//! polygons can be produced for any signed distance without recomputing the
//! geometry.

use crate::geometry::{distance_2d, nearest_point_on_segment, utils_2d, ApproxEq, Point3, Vector3};
use tracing::{debug, trace};

/// Shifts smaller than this return the centerline unchanged.
pub const MINIMAL_POSSIBLE_SHIFT: f64 = 0.01;

/// Ring rotations applied to looped offsets before the second loop-removal pass.
const RING_SHIFT_STEPS: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct CorridorPath {
    /// Centerline after loop removal. Looped paths are stored open.
    path: Vec<Point3>,
    /// Offset direction for every entry of `origins`.
    normals: Vec<Vector3>,
    origins: Vec<Point3>,
    center_length: f64,
    looped: bool,
    valid: bool,
}

impl CorridorPath {
    pub fn new(path: Vec<Point3>, looped: bool) -> Self {
        let mut corridor = Self {
            looped,
            ..Default::default()
        };
        corridor.set_path(path);
        corridor
    }

    /// Derives a corridor covering `[start, end]` of the parent's centerline,
    /// both measured as horizontal run length from the parent's start.
    ///
    /// The parent's edges are split exactly at the window boundaries. A looped
    /// parent is walked including its closing edge, and the result is open. An
    /// empty window yields an invalid corridor.
    pub fn sub_corridor(parent: &CorridorPath, start: f64, end: f64) -> Self {
        let mut corners = parent.path.clone();
        if corners.len() < 2 {
            return Self::new(corners, false);
        }
        if parent.looped {
            corners.push(corners[0]);
        }

        let len = parent.center_length;
        // Distance to the end
        let mut end = len - end;
        let mut start = start;
        if end + start >= len {
            debug!(start, end, len, "empty sub-corridor window");
            return Self::default();
        }

        if end > 0.0 {
            let mut last = corners[corners.len() - 1];
            for i in (0..corners.len() - 1).rev() {
                let c = corners[i];
                let run = distance_2d(&c, &last);
                if run >= end {
                    last += (c - last) * (end / run);
                    corners[i + 1] = last;
                    corners.truncate(i + 2);
                    break;
                }
                end -= run;
                last = c;
            }
        }

        if start > 0.0 && corners.len() > 1 {
            let mut last = corners[0];
            for i in 1..corners.len() {
                let c = corners[i];
                let run = distance_2d(&c, &last);
                if run >= start {
                    last += (c - last) * (start / run);
                    corners[i - 1] = last;
                    corners.drain(0..i - 1);
                    break;
                }
                start -= run;
                last = c;
            }
        }

        // The parent is loop-free already and a full ring must keep its closure
        let mut sub = Self::default();
        sub.rebuild(corners);
        sub
    }

    /// Replaces the centerline and recomputes every derived quantity.
    pub fn set_path(&mut self, mut path: Vec<Point3>) {
        if self.looped && path.len() > 2 && path[0].approx_eq(&path[path.len() - 1]) {
            path.pop();
        }
        self.rebuild(remove_loops(&path));
    }

    /// Derives normals, origins and length from an already loop-free centerline.
    fn rebuild(&mut self, path: Vec<Point3>) {
        self.normals.clear();
        self.origins.clear();
        self.center_length = 0.0;
        self.valid = false;
        self.path = path;
        if self.path.len() < 2 {
            return;
        }

        let mut ring = self.path.clone();
        if self.looped {
            // Close the ring on both sides so the end vertices get proper corners
            let first = ring[0];
            let last = ring[ring.len() - 1];
            ring.insert(0, last);
            ring.push(first);
        }

        let diffs: Vec<Vector3> = ring
            .windows(2)
            .map(|w| rotate_right(&(w[1] - w[0])).try_normalize(0.0).unwrap_or_else(Vector3::zeros))
            .collect();

        self.center_length = self.path.windows(2).map(|w| distance_2d(&w[0], &w[1])).sum();
        if self.looped {
            self.center_length += distance_2d(&self.path[self.path.len() - 1], &self.path[0]);
        }

        self.normals.reserve(2 * ring.len());
        self.origins.reserve(2 * ring.len());
        self.normals.push(diffs[0]);
        self.origins.push(ring[0]);

        for (i, pair) in diffs.windows(2).enumerate() {
            let (prev, next) = (pair[0], pair[1]);
            let center = (prev + next).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            let cos2 = prev.dot(&center);
            let n1 = prev + center;
            let n2 = next + center;
            let denom = (cos2 + 1.0) * n1.norm_squared();
            let scale = if denom > 0.0 { (2.0 / denom).sqrt() } else { 0.0 };

            self.normals.push(n1 * scale);
            self.normals.push(n2 * scale);
            self.origins.push(ring[i + 1]);
            self.origins.push(ring[i + 1]);
        }

        self.normals.push(diffs[diffs.len() - 1]);
        self.origins.push(ring[ring.len() - 1]);
        self.valid = true;

        trace!(
            vertices = self.path.len(),
            offsets = self.origins.len(),
            length = self.center_length,
            "corridor rebuilt"
        );
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Cleaned centerline. Looped paths are returned open.
    pub fn path(&self) -> &[Point3] {
        &self.path
    }

    /// Horizontal length of the centerline, including the closing edge of looped paths.
    pub fn center_length(&self) -> f64 {
        self.center_length
    }

    /// Path offset sideways by `shift`, positive to the left of the travel direction.
    ///
    /// Self-intersections created by the offset are cut out. Looped paths come
    /// back closed (first point repeated at the end).
    pub fn shifted(&self, shift: f64) -> Vec<Point3> {
        if shift.abs() < MINIMAL_POSSIBLE_SHIFT || !self.valid {
            return self.path.clone();
        }

        let mut out: Vec<Point3> = self
            .origins
            .iter()
            .zip(self.normals.iter())
            .map(|(origin, normal)| origin + normal * shift)
            .collect();

        if self.looped {
            // Drop the helper points from the ring closure
            out.remove(0);
            out.pop();
        }

        let mut out = remove_loops(&out);
        if self.looped && !out.is_empty() {
            // Loops across the array boundary are only found after rotating the ring
            let steps = RING_SHIFT_STEPS % out.len();
            out.rotate_left(steps);
            out = remove_loops(&out);
            out.push(out[0]);
        }
        out
    }

    /// Point at `relative_run_length` (0..1) along the 3D length of the shifted path.
    /// Values outside the range clamp to the path ends.
    pub fn shifted_point(&self, shift: f64, relative_run_length: f64) -> Option<Point3> {
        let path = self.shifted(shift);
        let first = *path.first()?;
        if relative_run_length <= 0.0 {
            return Some(first);
        }
        if relative_run_length >= 1.0 {
            return path.last().copied();
        }

        let total: f64 = path.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        let mut remaining = total * relative_run_length;
        for w in path.windows(2) {
            let len = (w[1] - w[0]).norm();
            if len > remaining {
                return Some(w[0] + (w[1] - w[0]) * (remaining / len));
            }
            remaining -= len;
        }
        path.last().copied()
    }

    /// Closed polygon: the right offset forward, then the left offset backward.
    pub fn hull(&self, width_right: f64, width_left: f64) -> Vec<Point3> {
        if self.path.is_empty() {
            return Vec::new();
        }
        let mut out = self.shifted(width_right);
        out.extend(self.shifted(width_left).into_iter().rev());
        out
    }

    /// Hull of a corridor `width` wide, centered on the path.
    pub fn hull_symmetric(&self, width: f64) -> Vec<Point3> {
        let half = width / 2.0;
        self.hull(half, -half)
    }

    /// Horizontal run length from the path start to the centerline point
    /// closest to `point`. Ties keep the earliest edge.
    pub fn closest_point_distance(&self, point: &Point3) -> f64 {
        let mut offset = 0.0;
        let mut best_distance = f64::INFINITY;
        let mut from_start = 0.0;

        for w in self.path.windows(2) {
            let nearest = nearest_point_on_segment(&w[0], &w[1], point);
            let dist = distance_2d(point, &nearest);
            if dist < best_distance {
                best_distance = dist;
                from_start = offset + distance_2d(&w[0], &nearest);
            }
            offset += distance_2d(&w[0], &w[1]);
        }

        from_start
    }
}

/// Quarter turn around +z: (x, y, z) -> (-y, x, z).
fn rotate_right(v: &Vector3) -> Vector3 {
    Vector3::new(-v.y, v.x, v.z)
}

/// Horizontal intersection of segments `a1-a2` and `b1-b2`, if any.
pub fn intersect(a1: &Point3, a2: &Point3, b1: &Point3, b2: &Point3) -> Option<Point3> {
    utils_2d::segment_intersection(a1, a2, b1, b2)
}

/// Cuts self-intersecting loops out of a polyline.
///
/// Each edge is tested from the left against the later edges, scanning those
/// from the end of the path backwards. The first crossing found replaces the
/// loop by the intersection point and the scan continues on the shortened tail.
pub fn remove_loops(path: &[Point3]) -> Vec<Point3> {
    let mut out = path.to_vec();
    if out.len() < 4 {
        return out;
    }

    let mut removed = 0;
    let mut a1 = out[0];
    let mut i = 1;
    while i + 2 < out.len() {
        let mut a2 = out[i];
        let mut b2 = out[out.len() - 1];
        let mut k = out.len() - 2;
        while k > i {
            let b1 = out[k];
            if let Some(hit) = intersect(&a1, &a2, &b1, &b2) {
                out[i] = hit;
                out.drain(i + 1..=k);
                a2 = hit;
                removed += 1;
                break;
            }
            b2 = b1;
            k -= 1;
        }
        a1 = a2;
        i += 1;
    }

    if removed > 0 {
        trace!(removed, remaining = out.len(), "removed path loops");
    }
    out
}
