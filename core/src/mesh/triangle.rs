use crate::geometry::{
    nearest_point_on_segment, shortest_line_between, Aabb, Interval, Point3, Segment3, Vector3,
};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// A mesh face with its normal and per-axis extents computed once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
    normal: Vector3,
    min_max_x: Interval,
    min_max_y: Interval,
    min_max_z: Interval,
}

/// Closest point on a triangle to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    pub point: Point3,
    /// True when the plane projection fell outside and an edge point was used.
    pub on_border: bool,
}

/// Result of a triangle to segment clearance query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDistance {
    pub distance: f64,
    pub closest_on_triangle: Point3,
    pub closest_on_segment: Point3,
}

impl Triangle {
    /// The normal is `normalize((c - a) x (b - a))`. A zero-area triangle gets a
    /// zero normal, which turns plane projections into identity and leaves the
    /// edge checks to produce the distance.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        let ab = b - a;
        let ac = c - a;
        let normal = ac.cross(&ab).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        Self {
            a,
            b,
            c,
            normal,
            min_max_x: Interval::of3(a.x, b.x, c.x),
            min_max_y: Interval::of3(a.y, b.y, c.y),
            min_max_z: Interval::of3(a.z, b.z, c.z),
        }
    }

    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    pub fn min_max_x(&self) -> Interval {
        self.min_max_x
    }

    pub fn min_max_y(&self) -> Interval {
        self.min_max_y
    }

    pub fn min_max_z(&self) -> Interval {
        self.min_max_z
    }

    pub fn vertices(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    pub fn area(&self) -> f64 {
        (self.b - self.a).cross(&(self.c - self.a)).norm() / 2.0
    }

    pub fn centroid(&self) -> Point3 {
        Point3::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// Returns a copy with every vertex mapped through `transform`.
    pub fn transformed(&self, transform: &na::Isometry3<f64>) -> Triangle {
        Triangle::new(
            transform.transform_point(&self.a),
            transform.transform_point(&self.b),
            transform.transform_point(&self.c),
        )
    }

    /// Barycentric containment of a point lying in the triangle's plane.
    pub fn contains(&self, p: &Point3) -> bool {
        let v0 = self.c - self.a;
        let v1 = self.b - self.a;
        let v2 = p - self.a;

        let dot00 = v0.dot(&v0);
        let dot01 = v0.dot(&v1);
        let dot02 = v0.dot(&v2);
        let dot11 = v1.dot(&v1);
        let dot12 = v1.dot(&v2);

        let denom = dot00 * dot11 - dot01 * dot01;
        if denom == 0.0 {
            return false;
        }
        let inv = 1.0 / denom;
        let u = (dot11 * dot02 - dot01 * dot12) * inv;
        let v = (dot00 * dot12 - dot01 * dot02) * inv;

        u >= 0.0 && v >= 0.0 && u + v <= 1.0
    }

    pub fn closest_point(&self, p: &Point3) -> ClosestPoint {
        let rel = p - self.c;
        let on_plane = self.c + (rel - self.normal * rel.dot(&self.normal));

        if self.contains(&on_plane) {
            return ClosestPoint {
                point: on_plane,
                on_border: false,
            };
        }

        let v_ab = nearest_point_on_segment(&self.a, &self.b, &on_plane);
        let v_ac = nearest_point_on_segment(&self.a, &self.c, &on_plane);
        let v_bc = nearest_point_on_segment(&self.b, &self.c, &on_plane);
        let dist_ab = na::distance(&v_ab, p);
        let dist_ac = na::distance(&v_ac, p);
        let dist_bc = na::distance(&v_bc, p);

        let point = if dist_ab < dist_ac && dist_ab < dist_bc {
            v_ab
        } else if dist_bc < dist_ac && dist_bc < dist_ab {
            v_bc
        } else {
            v_ac
        };

        ClosestPoint {
            point,
            on_border: true,
        }
    }

    /// Clearance between this triangle and the segment `e-f`.
    ///
    /// Returns `None` as soon as the bounding ranges prove the distance exceeds
    /// `max_search`. Pass `f64::INFINITY` to always get a result.
    pub fn distance_to_segment(&self, e: &Point3, f: &Point3, max_search: f64) -> Option<SegmentDistance> {
        if max_search != f64::INFINITY {
            let max_search2 = max_search * max_search;
            let mut distance2 = 0.0;

            let axes = [
                (Interval::new(e.x, f.x), self.min_max_x),
                (Interval::new(e.y, f.y), self.min_max_y),
                (Interval::new(e.z, f.z), self.min_max_z),
            ];
            for (segment_range, triangle_range) in axes.iter() {
                let gap = segment_range.distance_to(triangle_range);
                if gap > max_search {
                    return None;
                }
                distance2 += gap * gap;
                if distance2 > max_search2 {
                    return None;
                }
            }
        }

        let segment = Segment3::new(*e, *f);
        if let Some(hit) = self.pierce(&segment) {
            return Some(SegmentDistance {
                distance: 0.0,
                closest_on_triangle: hit,
                closest_on_segment: hit,
            });
        }

        // Otherwise the minimum is reached on a triangle edge or at a segment endpoint
        let [a, b, c] = self.vertices();
        let edges = [(a, b), (b, c), (c, a)]
            .map(|(p, q)| shortest_line_between(&Segment3::new(p, q), &segment, true));
        let ends = [e, f].map(|p| Segment3::new(self.closest_point(p).point, *p));

        edges
            .into_iter()
            .chain(ends)
            .min_by(|x, y| x.length().total_cmp(&y.length()))
            .map(|shortest| SegmentDistance {
                distance: shortest.length(),
                closest_on_triangle: shortest.first,
                closest_on_segment: shortest.second,
            })
    }

    /// Point where `segment` crosses the face, if it does.
    fn pierce(&self, segment: &Segment3) -> Option<Point3> {
        if self.normal == Vector3::zeros() {
            return None;
        }
        let de = (segment.first - self.a).dot(&self.normal);
        let df = (segment.second - self.a).dot(&self.normal);
        if de * df > 0.0 || de == df {
            return None;
        }
        let t = de / (de - df);
        let hit = segment.first + (segment.second - segment.first) * t;
        self.contains(&hit).then_some(hit)
    }

    /// Whether the triangle touches or lies inside the axis-aligned box.
    pub fn intersects_box(&self, bx: &Aabb) -> bool {
        if self.min_max_x.min > bx.max.x || self.min_max_x.max < bx.min.x {
            return false;
        }
        if self.min_max_y.min > bx.max.y || self.min_max_y.max < bx.min.y {
            return false;
        }
        if self.min_max_z.min > bx.max.z || self.min_max_z.max < bx.min.z {
            return false;
        }

        if self.vertices().iter().any(|v| bx.contains_strictly(v)) {
            return true;
        }

        self.separating_axis_test(bx)
    }

    /// Separating axis test: box face normals, triangle normal, and the nine
    /// edge/axis cross products.
    fn separating_axis_test(&self, bx: &Aabb) -> bool {
        let box_normals = [Vector3::x(), Vector3::y(), Vector3::z()];
        let box_vertices = bx.corners();
        let triangle_vertices = self.vertices();

        for i in 0..3 {
            let (tri_min, tri_max) = project(&triangle_vertices, &box_normals[i]);
            if tri_max < bx.min[i] || tri_min > bx.max[i] {
                return false;
            }
        }

        let triangle_offset = self.normal.dot(&self.a.coords);
        let (box_min, box_max) = project(&box_vertices, &self.normal);
        if box_max < triangle_offset || box_min > triangle_offset {
            return false;
        }

        let edges = [self.a - self.b, self.b - self.c, self.c - self.a];
        for edge in edges.iter() {
            for box_normal in box_normals.iter() {
                let axis = edge.cross(box_normal);
                let (box_min, box_max) = project(&box_vertices, &axis);
                let (tri_min, tri_max) = project(&triangle_vertices, &axis);
                if box_max < tri_min || box_min > tri_max {
                    return false;
                }
            }
        }

        true
    }

    /// Regular sample grid on the face with roughly `step` spacing, inset by
    /// half the remainder on each side.
    pub fn raster(&self, step: f64) -> Vec<Point3> {
        let mut result = Vec::new();
        if step.is_nan() || step <= 0.0 {
            return result;
        }

        let offset = self.c;
        let va = self.a - offset;
        let vb = self.b - offset;
        let la = va.norm();
        let lb = vb.norm();
        if la == 0.0 || lb == 0.0 {
            return result;
        }
        let vea = va / la;
        let veb = vb / lb;
        let h = (va - veb * va.dot(&veb)).norm();
        if h == 0.0 {
            return result;
        }

        // Moving `step_a` along `va` moves `step` away from the `vb` edge
        let step_a = step / h * la;
        let lines = (h / step) as usize;
        let mut pos_a = (h % step) * 0.5 / h * la;

        for _ in 0..=lines {
            let l = (1.0 - pos_a / la) * lb;
            let dots = (l / step) as usize;
            let mut pos_b = (l % step) * 0.5;
            for _ in 0..=dots {
                result.push(offset + vea * pos_a + veb * pos_b);
                pos_b += step;
            }
            pos_a += step_a;
        }

        result
    }
}

fn project(points: &[Point3], axis: &Vector3) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in points {
        let val = axis.dot(&p.coords);
        min = min.min(val);
        max = max.max(val);
    }
    (min, max)
}
