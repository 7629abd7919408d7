//! Visiting order of photo waypoints.
//!
//! [`CostMatrix`] prices every edge between waypoints, marking edges that pass
//! too close to the obstacle mesh as infinitely expensive. [`TourOptimizer`]
//! then improves a visiting order with 2-opt moves.

mod config;
mod cost;
mod optimizer;
mod waypoint;

pub use config::{CostModelConfig, OptimizerConfig};
pub use cost::{edge_cost, find_collisions, CloudVisit, Collision, CostMatrix, MetaCostMatrix};
pub use optimizer::{TourOptimizer, TourSolution, TwoOptNeighborhood};
pub use waypoint::{waypoints_from_mesh, Waypoint};

#[cfg(test)]
mod tests_tour;
