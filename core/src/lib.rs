//! Geometric core of a survey flight planner.
//!
//! Camera footprints, corridor offsetting, terrain contours, obstacle meshes
//! and waypoint tour optimization. Every computation is synchronous and
//! self-contained; long-running ones take a [`cancel::Cancel`] handle.

pub mod cancel;
pub mod contour;
pub mod corridor;
pub mod error;
pub mod footprint;
pub mod geometry;
pub mod mesh;
pub mod tour;

pub use cancel::{Cancel, CancellationToken, NeverCancel};
pub use contour::{contours, ContourPolyline, ElevationRaster};
pub use corridor::CorridorPath;
pub use error::{RasterError, TourError};
pub use footprint::{compute_footprint, CameraOrientation, CameraParameters, PhotoFootprint};
pub use mesh::{Triangle, TriangleMesh};
pub use tour::{CostMatrix, TourOptimizer, TourSolution, Waypoint};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
