use super::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Point where the infinite line through `line_point` along `line_direction`
/// crosses the plane.
///
/// Returns `None` when the line is parallel to the plane. The parallel test is an
/// exact zero comparison; nearly parallel lines produce far-away intersections.
/// A zero-length direction is also reported as `None`.
pub fn line_intersection(
    plane_normal: &Vector3,
    plane_point: &Point3,
    line_point: &Point3,
    line_direction: &Vector3,
) -> Option<Point3> {
    let direction = line_direction.try_normalize(0.0)?;
    let denom = plane_normal.dot(&direction);
    if denom == 0.0 {
        return None;
    }
    let t = (plane_normal.dot(&plane_point.coords) - plane_normal.dot(&line_point.coords)) / denom;
    Some(line_point + direction * t)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3,
    pub normal: Vector3,
}

impl Plane {
    pub fn new(origin: Point3, normal: Vector3) -> Self {
        Self {
            origin,
            normal: normal.normalize(),
        }
    }

    /// The z = 0 plane with an upward normal.
    pub fn ground() -> Self {
        Self::new(Point3::origin(), Vector3::z())
    }

    pub fn project_point(&self, p: &Point3) -> Point3 {
        let v = p - self.origin;
        let dist = v.dot(&self.normal);
        p - self.normal * dist
    }

    pub fn intersect_line(&self, point: &Point3, direction: &Vector3) -> Option<Point3> {
        line_intersection(&self.normal, &self.origin, point, direction)
    }
}

/// Closed 1D range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn of3(a: f64, b: f64, c: f64) -> Self {
        Self {
            min: a.min(b).min(c),
            max: a.max(b).max(c),
        }
    }

    /// Gap between the two ranges, zero when they overlap.
    pub fn distance_to(&self, other: &Interval) -> f64 {
        if other.min > self.max {
            other.min - self.max
        } else if self.min > other.max {
            self.min - other.max
        } else {
            0.0
        }
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min > max {
            None
        } else {
            Some(Interval { min, max })
        }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    pub fn mean(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn extend(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);

        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// The eight corners, starting at `min` and ending at `max`.
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            a,
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            b,
        ]
    }

    /// Strict containment: points on the faces are outside.
    pub fn contains_strictly(&self, p: &Point3) -> bool {
        p.x > self.min.x && p.x < self.max.x &&
        p.y > self.min.y && p.y < self.max.y &&
        p.z > self.min.z && p.z < self.max.z
    }
}
