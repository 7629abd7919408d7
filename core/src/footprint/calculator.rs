use super::{CameraOrientation, CameraParameters, PhotoFootprint};
use crate::geometry::{is_difference_tiny, line_intersection, utils_2d, Point3, Vector3, EPSILON};
use nalgebra as na;

/// Unrotated rays through the four sensor corners, camera looking down -z.
///
/// Order: the corners are listed counter-clockwise, starting with the one whose
/// projection lies at negative x and positive y for a level camera.
pub fn corner_directions(camera: &CameraParameters) -> [Vector3; 4] {
    let length = camera.focal_length;
    let y = camera.sensor_height / 2.0;
    let x = camera.sensor_width / 2.0;
    let y_transl = camera.sensor_y_offset;
    let x_transl = camera.sensor_x_offset;
    [
        Vector3::new(y + y_transl, -x + x_transl, -length),
        Vector3::new(y + y_transl, x + x_transl, -length),
        Vector3::new(-y + y_transl, x + x_transl, -length),
        Vector3::new(-y + y_transl, -x + x_transl, -length),
    ]
}

/// Convenience wrapper taking roll/pitch/yaw in degrees.
pub fn compute_footprint_with_angles(
    camera: &CameraParameters,
    altitude: f64,
    orientation: &CameraOrientation,
) -> PhotoFootprint {
    compute_footprint(camera, altitude, &orientation.rotation())
}

/// Projects the camera footprint onto the z = 0 plane from `altitude` and
/// derives the usable rectangle inside it.
///
/// Degenerate cameras (zero focal length, zero altitude) do not panic: either a
/// corner ray never meets the ground and an empty footprint comes back, or the
/// metrics turn NaN/infinite.
pub fn compute_footprint(
    camera: &CameraParameters,
    altitude: f64,
    orientation: &na::UnitQuaternion<f64>,
) -> PhotoFootprint {
    let plane_normal = Vector3::z();
    let plane_point = Point3::origin();
    let origin = Point3::new(0.0, 0.0, -altitude);

    let mut corners = [Point3::origin(); 4];
    for (i, dir) in corner_directions(camera).iter().enumerate() {
        let ray = orientation * dir.normalize();
        match line_intersection(&plane_normal, &plane_point, &origin, &ray) {
            Some(hit) => corners[i] = hit,
            None => return PhotoFootprint::default(),
        }
    }

    let xs = corners.map(|c| c.x);
    let ys = corners.map(|c| c.y);
    let mut footprint = usable_rectangle(&xs, &ys, altitude);
    footprint.corners = Some(corners);
    footprint
}

/// True when `x` lies within the x range of an edge, with tolerance.
fn spans(x1: f64, x2: f64, x: f64) -> bool {
    x >= x1.min(x2) - EPSILON && x <= x1.max(x2) + EPSILON
}

fn y_at(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    y1 + (y2 - y1) / (x2 - x1) * (x - x1)
}

fn usable_rectangle(xs: &[f64; 4], ys: &[f64; 4], altitude: f64) -> PhotoFootprint {
    let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // Base line of the trapezoid runs between the extreme corners; ties go to
    // the last matching index.
    let mut id_left = 0;
    let mut id_right = 0;
    for i in 0..4 {
        if (xs[i] - min_x).abs() < EPSILON {
            id_left = i;
        }
        if (xs[i] - max_x).abs() < EPSILON {
            id_right = i;
        }
    }

    let mut tops = (0..4).filter(|&i| i != id_left && i != id_right);
    let id_top1 = tops.next().unwrap_or(0);
    let id_top2 = tops.next().unwrap_or(id_top1);

    // Height of each top corner above the opposite polygon side
    let mut height_top1: f64 = 0.0;
    let mut height_top2: f64 = 0.0;
    for i in 0..4 {
        let j = (i + 1) % 4;
        let (x1, x2) = (xs[i], xs[j]);
        if (x1 - x2).abs() < EPSILON {
            continue;
        }
        let (y1, y2) = (ys[i], ys[j]);

        let x = xs[id_top1];
        if spans(x1, x2, x) {
            height_top1 = height_top1.max((y_at(x1, y1, x2, y2, x) - ys[id_top1]).abs());
        }

        let x = xs[id_top2];
        if spans(x1, x2, x) {
            height_top2 = height_top2.max((y_at(x1, y1, x2, y2, x) - ys[id_top2]).abs());
        }
    }

    let (id_top_higher, height_higher, height_lower) = if height_top1 > height_top2 {
        (id_top1, height_top1, height_top2)
    } else {
        (id_top2, height_top2, height_top1)
    };

    let (id_top_left, id_top_right, height_left, height_right) = if xs[id_top1] > xs[id_top2] {
        (id_top2, id_top1, height_top2, height_top1)
    } else {
        (id_top1, id_top2, height_top1, height_top2)
    };

    // Virtual apex of the triangle spanned by both top sides
    let dx_left = xs[id_top_left] - xs[id_left];
    let dx_right = xs[id_right] - xs[id_top_right];
    let g = xs[id_right] - xs[id_left];
    let det = height_left * dx_right + height_right * dx_left;

    let (cut_left_dx, cut_right_dx, high) = if det.abs() >= EPSILON {
        let alpha = height_right * g / det;
        let virt_top_dx = alpha * dx_left;
        let high_virt = alpha * height_left;

        if height_top1 > high_virt * 0.5 && height_top2 > high_virt * 0.5 {
            (virt_top_dx * 0.5, (g + virt_top_dx) * 0.5, high_virt * 0.5)
        } else if height_lower * 2.0 < height_higher {
            let top_higher_dx = xs[id_top_higher] - xs[id_left];
            (top_higher_dx * 0.5, (g + top_higher_dx) * 0.5, height_higher * 0.5)
        } else {
            let high = height_lower;
            (
                high / high_virt * virt_top_dx,
                g - high / high_virt * (g - virt_top_dx),
                high,
            )
        }
    } else {
        (0.0, g, height_lower)
    };

    // Rounding can push the cuts just outside the polygon
    let cut_left_x = (cut_left_dx + xs[id_left]).max(xs[id_left]);
    let cut_right_x = (cut_right_dx + xs[id_left]).min(xs[id_right]);

    let mut cut_left_y_max = f64::NEG_INFINITY;
    let mut cut_left_y_min = f64::INFINITY;
    let mut cut_right_y_max = f64::NEG_INFINITY;
    let mut cut_right_y_min = f64::INFINITY;

    // Back on the real polygon: where do the cuts enter and leave it
    for i in 0..4 {
        let j = (i + 1) % 4;
        let (x1, x2) = (xs[i], xs[j]);
        let (y1, y2) = (ys[i], ys[j]);
        let near_vertical = is_difference_tiny(x1, x2) || (x1 - x2).abs() < EPSILON;

        for (x, y_max, y_min) in [
            (cut_left_x, &mut cut_left_y_max, &mut cut_left_y_min),
            (cut_right_x, &mut cut_right_y_max, &mut cut_right_y_min),
        ] {
            if !spans(x1, x2, x) {
                continue;
            }
            if near_vertical {
                *y_max = y_max.max(y1).max(y2);
                *y_min = y_min.min(y1).min(y2);
            } else {
                let y = y_at(x1, y1, x2, y2, x);
                *y_max = y_max.max(y);
                *y_min = y_min.min(y);
            }
        }
    }

    let cut_left_y_mean = (cut_left_y_max + cut_left_y_min) * 0.5;
    let cut_right_y_mean = (cut_right_y_max + cut_right_y_min) * 0.5;

    let center_offset_parallel_flight = (cut_right_x + cut_left_x) * 0.5;
    let center_offset_in_flight = (cut_left_y_mean + cut_right_y_mean) * 0.5;
    let size_parallel_flight = cut_right_dx - cut_left_dx;

    let polygon: Vec<[f64; 2]> = (0..4).map(|i| [xs[i], ys[i]]).collect();
    let area = utils_2d::polygon_area(&polygon);
    let efficiency = high * size_parallel_flight / area;

    let pixel_enlargement_center = (altitude * altitude
        + center_offset_parallel_flight * center_offset_parallel_flight
        + center_offset_in_flight * center_offset_in_flight)
        .sqrt()
        / altitude;

    PhotoFootprint {
        corners: None,
        center_offset_in_flight,
        center_offset_parallel_flight,
        size_in_flight: high,
        size_parallel_flight,
        overshoot: cut_left_y_mean - cut_right_y_mean,
        efficiency,
        pixel_enlargement_center,
        area,
    }
}
