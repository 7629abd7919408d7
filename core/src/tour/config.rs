//! Tunables for the tour cost model and the optimizer.

use crate::error::{TourError, TourResult};
use serde::{Deserialize, Serialize};

/// Weights turning geometry into tour cost (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModelConfig {
    /// Minimum clearance between any flight segment and the mesh.
    /// Default: 2.0
    pub safety_distance: f64,

    /// Factor applied to the vertical component of each edge.
    /// Default: 2.0
    pub vertical_penalty: f64,

    /// Cost per degree of camera pitch change between consecutive waypoints.
    pub pitch_penalty_per_degree: f64,

    /// Cost per degree of camera roll change between consecutive waypoints.
    pub roll_penalty_per_degree: f64,

    /// Cost per degree of heading change at each visited waypoint.
    pub yaw_penalty_per_degree: f64,

    /// Cost per radian between the view directions of two waypoints.
    pub camera_change_penalty_per_radian: f64,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            safety_distance: 2.0,
            vertical_penalty: 2.0,
            pitch_penalty_per_degree: 0.0,
            roll_penalty_per_degree: 0.0,
            yaw_penalty_per_degree: 0.0,
            camera_change_penalty_per_radian: 0.0,
        }
    }
}

impl CostModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_safety_distance(mut self, meters: f64) -> Self {
        self.safety_distance = meters;
        self
    }

    pub fn with_vertical_penalty(mut self, factor: f64) -> Self {
        self.vertical_penalty = factor;
        self
    }

    /// Sets the pitch, roll and yaw weights at once.
    pub fn with_orientation_penalties(mut self, pitch: f64, roll: f64, yaw: f64) -> Self {
        self.pitch_penalty_per_degree = pitch;
        self.roll_penalty_per_degree = roll;
        self.yaw_penalty_per_degree = yaw;
        self
    }

    pub fn with_camera_change_penalty(mut self, per_radian: f64) -> Self {
        self.camera_change_penalty_per_radian = per_radian;
        self
    }

    /// Rejects negative or non-finite weights.
    pub fn validate(&self) -> TourResult<()> {
        let weights = [
            ("safety_distance", self.safety_distance),
            ("pitch_penalty_per_degree", self.pitch_penalty_per_degree),
            ("roll_penalty_per_degree", self.roll_penalty_per_degree),
            ("yaw_penalty_per_degree", self.yaw_penalty_per_degree),
            ("camera_change_penalty_per_radian", self.camera_change_penalty_per_radian),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(TourError::InvalidConfig(format!("{name} must be finite and >= 0, got {value}")));
            }
        }
        if !self.vertical_penalty.is_finite() || self.vertical_penalty <= 0.0 {
            return Err(TourError::InvalidConfig(format!(
                "vertical_penalty must be finite and > 0, got {}",
                self.vertical_penalty
            )));
        }
        Ok(())
    }
}

/// Budget and seeding of the local search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Upper bound on neighborhood scans (one per accepted move, plus the final one).
    /// Default: 10_000
    pub max_passes: usize,

    /// Upper bound on evaluated candidate tours.
    /// Default: 1_000_000
    pub max_evaluations: usize,

    /// Seed for the neighborhood start; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_passes: 10_000,
            max_evaluations: 1_000_000,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }

    pub fn with_max_evaluations(mut self, evaluations: usize) -> Self {
        self.max_evaluations = evaluations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
