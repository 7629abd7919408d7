//! Iso-lines over elevation rasters.
//!
//! Contours are traced with marching squares, one closed walk per connected
//! level set. Missing samples break a walk into separate open polylines.

mod marching;
pub use marching::trace_level;

#[cfg(test)]
mod tests_contour;

use crate::error::{RasterError, RasterResult};
use crate::geometry::{Interval, Point3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sample value marking missing data.
pub const NO_DATA: f64 = f64::NEG_INFINITY;

/// Row-major grid of elevation samples.
///
/// Sample `(row, col)` sits at `(origin_x + col * cell_width, origin_y + row * cell_height)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationRaster {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl ElevationRaster {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> RasterResult<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(RasterError::ShapeMismatch {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            data,
            origin_x: 0.0,
            origin_y: 0.0,
            cell_width: 1.0,
            cell_height: 1.0,
        })
    }

    /// Builder-style placement of the grid in the local frame.
    pub fn with_geometry(mut self, origin_x: f64, origin_y: f64, cell_width: f64, cell_height: f64) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self.cell_width = cell_width;
        self.cell_height = cell_height;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Sample at `(row, col)`, `None` when missing or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let v = self.data[row * self.cols + col];
        if v == NO_DATA || v.is_nan() {
            None
        } else {
            Some(v)
        }
    }

    /// Min/max over the valid samples, `None` when there are none.
    pub fn value_range(&self) -> Option<Interval> {
        self.data
            .iter()
            .filter(|v| **v != NO_DATA && !v.is_nan())
            .fold(None, |acc: Option<Interval>, &v| match acc {
                Some(r) => Some(Interval::new(r.min.min(v), r.max.max(v))),
                None => Some(Interval::new(v, v)),
            })
    }

    /// Local position of a fractional grid coordinate.
    pub(crate) fn position(&self, row: f64, col: f64, z: f64) -> Point3 {
        Point3::new(
            self.origin_x + col * self.cell_width,
            self.origin_y + row * self.cell_height,
            z,
        )
    }
}

/// One traced piece of an iso-line. Closed loops repeat their first point at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourPolyline {
    pub level: f64,
    pub points: Vec<Point3>,
}

impl ContourPolyline {
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Requested distance between levels; adjusted so the levels span the value range evenly.
    pub level_step: f64,
    /// Polylines with fewer points are dropped.
    pub min_points: usize,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            level_step: 10.0,
            min_points: 2,
        }
    }
}

impl ContourConfig {
    pub fn with_level_step(mut self, level_step: f64) -> Self {
        self.level_step = level_step;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }
}

/// Upper bound on the number of level intervals a single call may trace.
pub const MAX_LEVELS: usize = 10_000;

/// Iso-values for `raster`: `ceil(range / step) + 1` levels from the minimum
/// to the maximum, evenly spaced. Steps producing more than [`MAX_LEVELS`]
/// intervals are rejected.
pub fn contour_levels(raster: &ElevationRaster, level_step: f64) -> RasterResult<Vec<f64>> {
    if !level_step.is_finite() || level_step <= 0.0 {
        return Err(RasterError::InvalidLevelStep(level_step));
    }
    let Some(range) = raster.value_range() else {
        return Ok(Vec::new());
    };

    let intervals = (range.size() / level_step).ceil();
    if intervals > MAX_LEVELS as f64 {
        return Err(RasterError::InvalidLevelStep(level_step));
    }
    let count = intervals as usize + 1;
    if count == 1 {
        return Ok(vec![range.min]);
    }
    let step = range.size() / (count - 1) as f64;
    Ok((0..count).map(|k| range.min + k as f64 * step).collect())
}

/// Traces every level of the raster at roughly `level_step` spacing.
pub fn contours(raster: &ElevationRaster, level_step: f64) -> RasterResult<Vec<ContourPolyline>> {
    contours_with_config(raster, &ContourConfig::default().with_level_step(level_step))
}

pub fn contours_with_config(raster: &ElevationRaster, config: &ContourConfig) -> RasterResult<Vec<ContourPolyline>> {
    let levels = contour_levels(raster, config.level_step)?;

    let mut out = Vec::new();
    for &level in &levels {
        out.extend(
            trace_level(raster, level)
                .into_iter()
                .filter(|line| line.points.len() >= config.min_points),
        );
    }

    debug!(
        rows = raster.rows(),
        cols = raster.cols(),
        levels = levels.len(),
        polylines = out.len(),
        "traced contours"
    );
    Ok(out)
}
