use crate::contour::{
    contour_levels, contours, contours_with_config, trace_level, ContourConfig, ElevationRaster, NO_DATA,
};
use crate::error::RasterError;

fn twin_peaks() -> ElevationRaster {
    #[rustfmt::skip]
    let data = vec![
        0.0, 0.0, 0.0, 0.0,
        0.0, 2.0, 1.0, 0.0,
        0.0, 1.0, 2.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
    ];
    ElevationRaster::new(4, 4, data).unwrap()
}

fn plateau(missing: Option<(usize, usize)>) -> ElevationRaster {
    let mut data = vec![0.0; 25];
    for r in 1..4 {
        for c in 1..4 {
            data[r * 5 + c] = 5.0;
        }
    }
    if let Some((r, c)) = missing {
        data[r * 5 + c] = NO_DATA;
    }
    ElevationRaster::new(5, 5, data).unwrap()
}

#[test]
fn test_flat_raster_has_no_contours() {
    let raster = ElevationRaster::new(3, 3, vec![5.0; 9]).unwrap();
    assert!(contours(&raster, 1.0).unwrap().is_empty());
    assert!(trace_level(&raster, 4.0).is_empty());
    assert!(trace_level(&raster, 6.0).is_empty());
    assert!(trace_level(&raster, 5.0).is_empty());
}

#[test]
fn test_levels_span_range_evenly() {
    let raster = ElevationRaster::new(1, 3, vec![0.0, 7.0, 10.0]).unwrap();
    let levels = contour_levels(&raster, 3.0).unwrap();
    // ceil(10 / 3) + 1 levels, step shrunk to 2.5
    assert_eq!(levels, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
}

#[test]
fn test_saddle_level_yields_closed_loops() {
    let lines = trace_level(&twin_peaks(), 1.0);
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert!(line.is_closed());
        assert_eq!(line.points.len(), 5);
        assert_eq!(line.points.first(), line.points.last());
        assert!(line.points.iter().all(|p| p.z == 1.0));
    }
}

#[test]
fn test_contours_over_all_levels() {
    let lines = contours(&twin_peaks(), 1.0).unwrap();
    // Level 0 circles both peaks, level 1 splits at the saddle, level 2 is empty
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].level, 0.0);
    assert_eq!(lines[0].points.len(), 9);
    assert!(lines[1..].iter().all(|l| l.level == 1.0));
}

#[test]
fn test_crossings_lie_between_samples() {
    let raster = plateau(None).with_geometry(100.0, 200.0, 10.0, 10.0);
    let lines = trace_level(&raster, 2.5);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].is_closed());
    for p in &lines[0].points {
        assert!(p.x > 100.0 && p.x < 140.0, "{:?}", p);
        assert!(p.y > 200.0 && p.y < 240.0, "{:?}", p);
    }
}

#[test]
fn test_missing_sample_splits_contour() {
    let closed = trace_level(&plateau(None), 1.0);
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].points.len(), 13);

    let split = trace_level(&plateau(Some((4, 2))), 1.0);
    assert_eq!(split.len(), 1);
    let line = &split[0];
    assert!(!line.is_closed());
    assert_eq!(line.points.len(), 10);
}

#[test]
fn test_min_points_filter() {
    let config = ContourConfig::default().with_level_step(1.0).with_min_points(6);
    let lines = contours_with_config(&twin_peaks(), &config).unwrap();
    assert_eq!(lines.len(), 1);
}

#[test]
fn test_invalid_inputs() {
    assert_eq!(
        ElevationRaster::new(2, 3, vec![0.0; 5]),
        Err(RasterError::ShapeMismatch { rows: 2, cols: 3, len: 5 })
    );

    let raster = twin_peaks();
    assert!(matches!(contours(&raster, 0.0), Err(RasterError::InvalidLevelStep(_))));
    assert!(matches!(contours(&raster, f64::NAN), Err(RasterError::InvalidLevelStep(_))));
    // Would need millions of levels over a range of 2
    assert_eq!(contour_levels(&raster, 1e-6), Err(RasterError::InvalidLevelStep(1e-6)));

    // Empty grids are valid and contour to nothing
    let empty = ElevationRaster::new(0, 4, Vec::new()).unwrap();
    assert!(contours(&empty, 1.0).unwrap().is_empty());

    let all_missing = ElevationRaster::new(2, 2, vec![NO_DATA; 4]).unwrap();
    assert!(all_missing.value_range().is_none());
    assert!(contours(&all_missing, 1.0).unwrap().is_empty());
}

#[test]
fn test_config_from_json() {
    let config: ContourConfig = serde_json::from_str(r#"{"level_step": 2.5}"#).unwrap();
    assert_eq!(config.level_step, 2.5);
    assert_eq!(config.min_points, 2);
}
