//! 2-opt local search over tour permutations.

use super::config::OptimizerConfig;
use super::cost::CostMatrix;
use super::waypoint::Waypoint;
use crate::cancel::Cancel;
use crate::error::{TourError, TourResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Accepted moves must beat the current cost by more than this.
const MIN_IMPROVEMENT: f64 = 1e-9;

/// Enumerates every segment reversal `(a, b)`, `a < b`, of an `n`-node tour
/// exactly once, starting at a random pair and wrapping around.
#[derive(Debug, Clone)]
pub struct TwoOptNeighborhood {
    n: usize,
    start: (usize, usize),
    current: Option<(usize, usize)>,
}

impl TwoOptNeighborhood {
    pub fn new<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        if n < 2 {
            return Self {
                n,
                start: (0, 0),
                current: None,
            };
        }
        let a = rng.random_range(0..n - 1);
        let b = rng.random_range(a + 1..n);
        Self {
            n,
            start: (a, b),
            current: Some((a, b)),
        }
    }

    /// Total number of moves.
    pub fn size(&self) -> usize {
        self.n * self.n.saturating_sub(1) / 2
    }

    /// Copy of `tour` with positions `a..=b` reversed.
    pub fn apply(tour: &[usize], a: usize, b: usize) -> Vec<usize> {
        let mut candidate = tour.to_vec();
        candidate[a..=b].reverse();
        candidate
    }

    fn advance(&self, (a, b): (usize, usize)) -> (usize, usize) {
        if b + 1 < self.n {
            return (a, b + 1);
        }
        let a = if a + 2 < self.n { a + 1 } else { 0 };
        (a, a + 1)
    }
}

impl Iterator for TwoOptNeighborhood {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        let next = self.advance(current);
        self.current = (next != self.start).then_some(next);
        Some(current)
    }
}

/// A visiting order over the tour nodes of a cost matrix.
///
/// Every node index appears exactly once. Deserialized solutions are
/// checked for that too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredSolution")]
pub struct TourSolution {
    order: Vec<usize>,
    cost: f64,
}

#[derive(Deserialize)]
struct StoredSolution {
    order: Vec<usize>,
    cost: f64,
}

impl TryFrom<StoredSolution> for TourSolution {
    type Error = TourError;

    fn try_from(stored: StoredSolution) -> TourResult<Self> {
        if !is_permutation(&stored.order, stored.order.len()) {
            return Err(TourError::InvalidTour(format!("{:?} is not a permutation", stored.order)));
        }
        Ok(Self {
            order: stored.order,
            cost: stored.cost,
        })
    }
}

fn is_permutation(order: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    order.len() == n
        && order.iter().all(|&i| {
            if i >= n || seen[i] {
                return false;
            }
            seen[i] = true;
            true
        })
}

impl TourSolution {
    /// Evaluates `order` on `matrix` after checking it is a permutation of its nodes.
    pub fn new(order: Vec<usize>, matrix: &CostMatrix) -> TourResult<Self> {
        if order.len() != matrix.len() {
            return Err(TourError::MismatchedMatrix {
                expected: matrix.len(),
                actual: order.len(),
            });
        }
        if !is_permutation(&order, matrix.len()) {
            return Err(TourError::InvalidTour(format!("{order:?} is not a permutation")));
        }
        let cost = matrix.calculate_cost(&order);
        Ok(Self { order, cost })
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// False when every edge combination tried so far hit the mesh.
    pub fn is_feasible(&self) -> bool {
        self.cost.is_finite()
    }

    /// The waypoints in visiting order.
    pub fn ordered_waypoints(&self, waypoints: &[Waypoint]) -> Vec<Waypoint> {
        self.order.iter().filter_map(|&i| waypoints.get(i).copied()).collect()
    }
}

/// First-improvement 2-opt driver.
#[derive(Debug, Clone, Default)]
pub struct TourOptimizer {
    config: OptimizerConfig,
}

impl TourOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Optimizes starting from the identity order.
    pub fn optimize(&self, matrix: &CostMatrix, cancel: &impl Cancel) -> TourResult<TourSolution> {
        self.optimize_from(matrix, (0..matrix.len()).collect(), cancel)
    }

    /// Repeatedly scans the 2-opt neighborhood of the current tour and takes
    /// the first strictly cheaper candidate, until a full scan finds none or
    /// the budget runs out. Cancellation is polled before every evaluation.
    pub fn optimize_from(
        &self,
        matrix: &CostMatrix,
        initial: Vec<usize>,
        cancel: &impl Cancel,
    ) -> TourResult<TourSolution> {
        let mut best = TourSolution::new(initial, matrix)?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut evaluations = 0;
        let mut passes = 0;
        let mut accepted = 0;
        let mut converged = false;

        'passes: while passes < self.config.max_passes {
            passes += 1;
            let mut improved = false;

            for (a, b) in TwoOptNeighborhood::new(best.order.len(), &mut rng) {
                if cancel.is_cancelled() {
                    debug!(passes, evaluations, "tour optimization cancelled");
                    return Err(TourError::Cancelled);
                }
                if evaluations >= self.config.max_evaluations {
                    break 'passes;
                }
                evaluations += 1;

                let candidate = TwoOptNeighborhood::apply(&best.order, a, b);
                let cost = matrix.calculate_cost(&candidate);
                if cost + MIN_IMPROVEMENT < best.cost {
                    trace!(a, b, from = best.cost, to = cost, "accepted 2-opt move");
                    best = TourSolution { order: candidate, cost };
                    accepted += 1;
                    improved = true;
                    break;
                }
            }

            if !improved {
                converged = true;
                break;
            }
        }

        debug!(
            nodes = best.order.len(),
            passes,
            evaluations,
            accepted,
            converged,
            cost = best.cost,
            "tour optimized"
        );
        if !best.is_feasible() {
            warn!(nodes = best.order.len(), "no feasible tour found");
        }
        Ok(best)
    }
}
