use crate::footprint::CameraOrientation;
use crate::geometry::{Point3, Vector3};
use crate::mesh::TriangleMesh;
use serde::{Deserialize, Serialize};

/// A required photo position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Point3,
    /// Index of the mesh face this waypoint was sampled from.
    #[serde(default)]
    pub triangle: Option<usize>,
    /// Unit viewing direction of the camera.
    #[serde(default)]
    pub normal: Option<Vector3>,
    /// Explicit camera attitude; derived from `normal` when absent.
    #[serde(default)]
    pub orientation: Option<CameraOrientation>,
}

impl Waypoint {
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            triangle: None,
            normal: None,
            orientation: None,
        }
    }

    pub fn with_triangle(mut self, triangle: usize) -> Self {
        self.triangle = Some(triangle);
        self
    }

    /// Sets the viewing direction; zero vectors are ignored.
    pub fn with_normal(mut self, normal: Vector3) -> Self {
        self.normal = normal.try_normalize(0.0);
        self
    }

    pub fn with_orientation(mut self, orientation: CameraOrientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Camera attitude in degrees: the explicit one, or pitch below the
    /// horizon and heading (clockwise from +y) of the view direction.
    pub fn camera_orientation(&self) -> Option<CameraOrientation> {
        self.orientation.or_else(|| {
            self.normal.map(|n| {
                let pitch = (-n.z).clamp(-1.0, 1.0).asin().to_degrees();
                let yaw = n.x.atan2(n.y).to_degrees();
                CameraOrientation::new(0.0, pitch, yaw)
            })
        })
    }

    /// Angle between the view directions, when both are known.
    pub fn camera_change(&self, other: &Waypoint) -> Option<f64> {
        Some(self.normal?.angle(&other.normal?))
    }
}

/// Photo positions covering every face of `mesh`.
///
/// Each face is rastered with `step` spacing; the samples are lifted by
/// `distance` along the face normal and look back onto the face.
pub fn waypoints_from_mesh(mesh: &TriangleMesh, step: f64, distance: f64) -> Vec<Waypoint> {
    mesh.triangles()
        .iter()
        .enumerate()
        .flat_map(|(idx, tri)| {
            let normal = *tri.normal();
            tri.raster(step).into_iter().map(move |p| {
                Waypoint::new(p + normal * distance)
                    .with_triangle(idx)
                    .with_normal(-normal)
            })
        })
        .collect()
}
