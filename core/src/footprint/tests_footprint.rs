use crate::footprint::{
    compute_footprint, compute_footprint_with_angles, corner_directions, CameraOrientation, CameraParameters,
};
use nalgebra as na;

fn survey_camera() -> CameraParameters {
    CameraParameters::new(20.0, 22.3, 14.9, 5472, 3648)
}

#[test]
fn test_nadir_matches_pinhole_projection() {
    let cam = survey_camera();
    let fp = compute_footprint(&cam, 100.0, &na::UnitQuaternion::identity());
    let corners = fp.corners.expect("Nadir camera must hit the ground");

    let half_height = 14.9 / 2.0 * 100.0 / 20.0;
    let half_width = 22.3 / 2.0 * 100.0 / 20.0;
    for c in corners.iter() {
        assert!((c.x.abs() - half_height).abs() < 0.01 * half_height, "x={}", c.x);
        assert!((c.y.abs() - half_width).abs() < 0.01 * half_width, "y={}", c.y);
        assert!(c.z.abs() < 1e-9);
    }

    assert!((fp.size_parallel_flight - 2.0 * half_height).abs() < 1e-6);
    assert!((fp.size_in_flight - 2.0 * half_width).abs() < 1e-6);
}

#[test]
fn test_nadir_is_centered_and_fully_efficient() {
    let fp = compute_footprint(&survey_camera(), 80.0, &na::UnitQuaternion::identity());
    assert!(fp.center_offset_in_flight.abs() < 1e-9);
    assert!(fp.center_offset_parallel_flight.abs() < 1e-9);
    assert!(fp.overshoot.abs() < 1e-9);
    assert!((fp.efficiency - 1.0).abs() < 1e-9);
    assert!((fp.pixel_enlargement_center - 1.0).abs() < 1e-9);
}

#[test]
fn test_rolled_90_swaps_extents() {
    let cam = survey_camera();
    let fp = compute_footprint_with_angles(&cam, 100.0, &CameraOrientation::new(90.0, 0.0, 0.0));
    assert!((fp.size_parallel_flight - 111.5).abs() < 1e-3, "{:?}", fp);
    assert!((fp.size_in_flight - 74.5).abs() < 1e-3, "{:?}", fp);
    assert!((fp.efficiency - 1.0).abs() < 1e-6);
    assert!(fp.center_offset_in_flight.abs() < 1e-6);
}

#[test]
fn test_oblique_footprints_are_finite() {
    let cam = survey_camera();
    for pitch in [-30.0, -10.0, 5.0, 20.0, 35.0] {
        let fp = compute_footprint_with_angles(&cam, 100.0, &CameraOrientation::new(0.0, pitch, 0.0));
        assert!(fp.area > 0.0);
        assert!(fp.efficiency > 0.0 && fp.efficiency <= 1.0 + 1e-9, "{:?}", fp);
        assert!(fp.pixel_enlargement_center >= 1.0 - 1e-9);

        for roll in [-20.0, 15.0] {
            let orientation = CameraOrientation::new(roll, pitch, 0.0);
            let fp = compute_footprint_with_angles(&cam, 100.0, &orientation);
            let corners = fp.corners.expect("Oblique camera still hits the ground");
            for c in corners.iter() {
                assert!(c.x.is_finite() && c.y.is_finite());
            }
            assert!(fp.area > 0.0);
        }
    }
}

#[test]
fn test_pitched_camera_shifts_center() {
    let cam = survey_camera();
    let fp = compute_footprint_with_angles(&cam, 100.0, &CameraOrientation::new(0.0, 20.0, 0.0));
    let offset = fp.center_offset_in_flight.hypot(fp.center_offset_parallel_flight);
    assert!(offset > 1.0);
    assert!(fp.pixel_enlargement_center > 1.0);
}

#[test]
fn test_sensor_offset_moves_footprint() {
    let cam = survey_camera().with_sensor_offset(2.0, 0.0);
    let fp = compute_footprint(&cam, 100.0, &na::UnitQuaternion::identity());
    let corners = fp.corners.unwrap();
    let mean_y: f64 = corners.iter().map(|c| c.y).sum::<f64>() / 4.0;
    assert!((mean_y.abs() - 2.0 * 100.0 / 20.0).abs() < 1e-6);
}

#[test]
fn test_zero_focal_length_yields_empty_footprint() {
    let cam = CameraParameters::new(0.0, 22.3, 14.9, 5472, 3648);
    let fp = compute_footprint(&cam, 100.0, &na::UnitQuaternion::identity());
    assert!(fp.is_empty());
}

#[test]
fn test_zero_altitude_propagates_non_finite() {
    let fp = compute_footprint(&survey_camera(), 0.0, &na::UnitQuaternion::identity());
    assert!(!fp.pixel_enlargement_center.is_finite());
}

#[test]
fn test_corner_directions_layout() {
    let dirs = corner_directions(&survey_camera());
    assert!(dirs.iter().all(|d| d.z == -20.0));
    assert_eq!(dirs[0].x, 7.45);
    assert_eq!(dirs[1].y, 11.15);
}

#[test]
fn test_ground_sampling_distance() {
    let gsd = survey_camera().ground_sampling_distance(100.0);
    assert!((gsd - 22.3 / 5472.0 * 5.0).abs() < 1e-12);
}

#[test]
fn test_camera_parameters_from_json() {
    let json = r#"{"focal_length": 35.0, "sensor_width": 36.0, "sensor_height": 24.0,
                   "pixels_x": 7952, "pixels_y": 5304}"#;
    let cam: CameraParameters = serde_json::from_str(json).unwrap();
    assert_eq!(cam.sensor_x_offset, 0.0);
    assert_eq!(cam.pixels_y, 5304);
}
