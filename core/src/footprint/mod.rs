//! Camera footprint computation.
//!
//! Projects the four sensor-corner rays of a camera hovering at a given altitude
//! onto the flat ground plane and derives coverage metrics from the resulting
//! quadrilateral.

mod calculator;
pub use calculator::{compute_footprint, compute_footprint_with_angles, corner_directions};

#[cfg(test)]
mod tests_footprint;

use crate::geometry::Point3;
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Intrinsics of a frame camera. Sensor dimensions share the unit of the focal length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParameters {
    pub focal_length: f64,
    pub sensor_width: f64,
    pub sensor_height: f64,
    pub pixels_x: u32,
    pub pixels_y: u32,
    /// Translation of the sensor center along its width (off-center optics).
    #[serde(default)]
    pub sensor_x_offset: f64,
    /// Translation of the sensor center along its height.
    #[serde(default)]
    pub sensor_y_offset: f64,
}

impl CameraParameters {
    pub fn new(focal_length: f64, sensor_width: f64, sensor_height: f64, pixels_x: u32, pixels_y: u32) -> Self {
        Self {
            focal_length,
            sensor_width,
            sensor_height,
            pixels_x,
            pixels_y,
            sensor_x_offset: 0.0,
            sensor_y_offset: 0.0,
        }
    }

    /// Builder-style setter for the sensor-center translation.
    pub fn with_sensor_offset(mut self, x_offset: f64, y_offset: f64) -> Self {
        self.sensor_x_offset = x_offset;
        self.sensor_y_offset = y_offset;
        self
    }

    /// Ground size of one pixel at nadir from `altitude`.
    pub fn ground_sampling_distance(&self, altitude: f64) -> f64 {
        self.sensor_width / self.pixels_x as f64 * altitude / self.focal_length
    }
}

/// Vehicle attitude in degrees.
///
/// * `roll` - around the flight direction, clockwise, 0 is level
/// * `pitch` - around the horizontal axis orthogonal to flight, 0 is level
/// * `yaw` - heading, clockwise, 0 is north
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraOrientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl CameraOrientation {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Rotation applying pitch (x) first, then roll (z), then yaw (y).
    pub fn rotation(&self) -> na::UnitQuaternion<f64> {
        let pitch = na::UnitQuaternion::from_axis_angle(&na::Vector3::x_axis(), self.pitch.to_radians());
        let yaw = na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), self.yaw.to_radians());
        let roll = na::UnitQuaternion::from_axis_angle(&na::Vector3::z_axis(), self.roll.to_radians());
        yaw * roll * pitch
    }
}

/// Ground coverage of a single photo.
///
/// "In flight" runs along the local y axis, "parallel flight" along x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoFootprint {
    /// Ground intersections of the four corner rays; `None` when a ray never hits.
    pub corners: Option<[Point3; 4]>,
    pub center_offset_in_flight: f64,
    pub center_offset_parallel_flight: f64,
    pub size_in_flight: f64,
    pub size_parallel_flight: f64,
    /// Shift between the left and right cut centers along the flight direction.
    pub overshoot: f64,
    /// Usable inner rectangle area over total footprint area.
    pub efficiency: f64,
    /// Pixel size growth at the image center relative to nadir.
    pub pixel_enlargement_center: f64,
    /// Shoelace area of the projected quadrilateral.
    pub area: f64,
}

impl PhotoFootprint {
    pub fn is_empty(&self) -> bool {
        self.corners.is_none()
    }
}
