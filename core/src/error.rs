//! Error types shared across the computation modules.
//!
//! Geometric degeneracy is not an error here: it surfaces as `Option::None`,
//! and obstructed travel as an infinite cost. These enums cover inputs that
//! cannot be processed at all and interrupted computations.

use thiserror::Error;

/// Errors raised while building or contouring an elevation raster.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RasterError {
    #[error("Raster data has {len} samples, expected {rows}x{cols}")]
    ShapeMismatch { rows: usize, cols: usize, len: usize },

    #[error("Contour level step must be positive and finite, got {0}")]
    InvalidLevelStep(f64),
}

/// Result type for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors raised by tour cost-matrix construction and optimization.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TourError {
    #[error("Computation was cancelled")]
    Cancelled,

    #[error("No waypoints to plan a tour over")]
    EmptyCloud,

    #[error("Cost matrix has {actual} nodes, expected {expected}")]
    MismatchedMatrix { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid tour: {0}")]
    InvalidTour(String),
}

/// Result type for tour operations.
pub type TourResult<T> = Result<T, TourError>;
