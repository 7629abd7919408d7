//! Pairwise travel costs between waypoints.
//!
//! Node indices `0..len()` are the waypoints (or sub-clouds); the two
//! synthetic nodes `before()` and `after()` pin the start and end of every
//! tour. Edges passing closer to the mesh than the safety distance cost
//! `f64::INFINITY`.

use super::config::CostModelConfig;
use super::waypoint::Waypoint;
use crate::cancel::Cancel;
use crate::error::{TourError, TourResult};
use crate::footprint::CameraOrientation;
use crate::geometry::{Point3, Vector3};
use crate::mesh::TriangleMesh;
use serde::{Deserialize, Serialize};
use std::iter;
use tracing::{debug, trace};

/// Dense row-major cost table over `len() + 2` nodes.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    nodes: usize,
    costs: Vec<f64>,
    /// Heading of each edge in degrees, NaN for edges without horizontal extent.
    yaw: Vec<f64>,
    orientations: Vec<Option<CameraOrientation>>,
    config: CostModelConfig,
}

/// Travel cost of a single edge, infinite when the mesh is too close.
pub fn edge_cost(a: &Waypoint, b: &Waypoint, mesh: &TriangleMesh, config: &CostModelConfig) -> f64 {
    if mesh.first_obstruction(&a.position, &b.position, config.safety_distance).is_some() {
        return f64::INFINITY;
    }
    let d = b.position - a.position;
    let scaled = Vector3::new(d.x, d.y, d.z * config.vertical_penalty);
    let camera = a
        .camera_change(b)
        .map_or(0.0, |angle| angle * config.camera_change_penalty_per_radian);
    scaled.norm() + camera
}

/// Heading of `a -> b` in degrees, clockwise from +y.
fn bearing(a: &Point3, b: &Point3) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    if dx == 0.0 && dy == 0.0 {
        return f64::NAN;
    }
    dx.atan2(dy).to_degrees()
}

fn reverse_bearing(yaw: f64) -> f64 {
    if yaw.is_nan() {
        yaw
    } else if yaw > 0.0 {
        yaw - 180.0
    } else {
        yaw + 180.0
    }
}

/// Smallest absolute difference between two angles in degrees.
fn angle_change(a: f64, b: f64) -> f64 {
    let d = (b - a).rem_euclid(360.0);
    d.min(360.0 - d)
}

impl CostMatrix {
    /// Costs between every pair of `waypoints` plus the fixed `before` and
    /// `after` positions. Cancellation is polled once per row.
    pub fn for_one_cloud(
        waypoints: &[Waypoint],
        before: Point3,
        after: Point3,
        mesh: &TriangleMesh,
        config: &CostModelConfig,
        cancel: &impl Cancel,
    ) -> TourResult<Self> {
        config.validate()?;
        if waypoints.is_empty() {
            return Err(TourError::EmptyCloud);
        }

        let nodes: Vec<Waypoint> = waypoints
            .iter()
            .copied()
            .chain([Waypoint::new(before), Waypoint::new(after)])
            .collect();
        let mut matrix = Self::empty(nodes.len(), *config);
        matrix.orientations = nodes.iter().map(Waypoint::camera_orientation).collect();

        for i in 0..nodes.len() {
            if cancel.is_cancelled() {
                debug!(row = i, "cost matrix cancelled");
                return Err(TourError::Cancelled);
            }
            for j in (i + 1)..nodes.len() {
                let cost = edge_cost(&nodes[i], &nodes[j], mesh, config);
                matrix.set_edge(i, j, cost, bearing(&nodes[i].position, &nodes[j].position));
            }
        }

        debug!(
            nodes = matrix.nodes,
            obstructed = matrix.obstructed_edges(),
            triangles = mesh.len(),
            "built cost matrix"
        );
        Ok(matrix)
    }

    fn empty(nodes: usize, config: CostModelConfig) -> Self {
        let mut costs = vec![f64::INFINITY; nodes * nodes];
        for i in 0..nodes {
            costs[i * nodes + i] = 0.0;
        }
        Self {
            nodes,
            costs,
            yaw: vec![f64::NAN; nodes * nodes],
            orientations: vec![None; nodes],
            config,
        }
    }

    fn set_edge(&mut self, i: usize, j: usize, cost: f64, yaw: f64) {
        self.costs[i * self.nodes + j] = cost;
        self.costs[j * self.nodes + i] = cost;
        self.yaw[i * self.nodes + j] = yaw;
        self.yaw[j * self.nodes + i] = reverse_bearing(yaw);
    }

    /// Number of tour nodes, excluding `before` and `after`.
    pub fn len(&self) -> usize {
        self.nodes - 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn before(&self) -> usize {
        self.nodes - 2
    }

    pub fn after(&self) -> usize {
        self.nodes - 1
    }

    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.costs[from * self.nodes + to]
    }

    /// Heading of the edge in degrees, NaN when it is purely vertical.
    pub fn yaw(&self, from: usize, to: usize) -> f64 {
        self.yaw[from * self.nodes + to]
    }

    pub fn is_obstructed(&self, from: usize, to: usize) -> bool {
        self.cost(from, to).is_infinite()
    }

    /// Number of obstructed unordered pairs.
    pub fn obstructed_edges(&self) -> usize {
        (0..self.nodes)
            .flat_map(|i| ((i + 1)..self.nodes).map(move |j| (i, j)))
            .filter(|&(i, j)| self.is_obstructed(i, j))
            .count()
    }

    /// Total cost of visiting `tour` between `before` and `after`.
    ///
    /// Returns `f64::INFINITY` as soon as one edge is obstructed. Heading
    /// changes at each node and camera pitch/roll changes between consecutive
    /// waypoints are added with the configured weights.
    pub fn calculate_cost(&self, tour: &[usize]) -> f64 {
        let path: Vec<usize> = iter::once(self.before())
            .chain(tour.iter().copied())
            .chain(iter::once(self.after()))
            .collect();

        let mut total = 0.0;
        let mut last_yaw = f64::NAN;
        for w in path.windows(2) {
            let (a, b) = (w[0], w[1]);
            let cost = self.cost(a, b);
            if cost.is_infinite() {
                return f64::INFINITY;
            }
            total += cost;

            let yaw = self.yaw(a, b);
            if !yaw.is_nan() {
                if !last_yaw.is_nan() {
                    total += angle_change(last_yaw, yaw) * self.config.yaw_penalty_per_degree;
                }
                last_yaw = yaw;
            }

            if let (Some(oa), Some(ob)) = (self.orientations[a], self.orientations[b]) {
                total += (oa.pitch - ob.pitch).abs() * self.config.pitch_penalty_per_degree;
                total += angle_change(oa.roll, ob.roll) * self.config.roll_penalty_per_degree;
            }
        }
        total
    }
}

/// Cost table over clusters of waypoints that are visited as blocks.
#[derive(Debug, Clone)]
pub struct MetaCostMatrix {
    matrix: CostMatrix,
    /// For each ordered node pair, the member of the first and of the second
    /// cluster realizing the cheapest connection.
    best: Vec<(usize, usize)>,
    sizes: Vec<usize>,
}

/// One stop of an expanded meta tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudVisit {
    pub cloud: usize,
    pub member: usize,
}

impl MetaCostMatrix {
    /// Costs between every pair of sub-clouds, minimized over member pairs,
    /// plus the fixed `before` and `after` positions.
    pub fn for_meta_clouds(
        clouds: &[Vec<Waypoint>],
        before: Point3,
        after: Point3,
        mesh: &TriangleMesh,
        config: &CostModelConfig,
        cancel: &impl Cancel,
    ) -> TourResult<Self> {
        config.validate()?;
        if clouds.is_empty() || clouds.iter().any(Vec::is_empty) {
            return Err(TourError::EmptyCloud);
        }

        let before = [Waypoint::new(before)];
        let after = [Waypoint::new(after)];
        let nodes: Vec<&[Waypoint]> = clouds
            .iter()
            .map(Vec::as_slice)
            .chain([&before[..], &after[..]])
            .collect();
        let n = nodes.len();

        let mut matrix = CostMatrix::empty(n, *config);
        let mut best = vec![(0, 0); n * n];

        for i in 0..n {
            if cancel.is_cancelled() {
                debug!(row = i, "meta cost matrix cancelled");
                return Err(TourError::Cancelled);
            }
            for j in (i + 1)..n {
                let mut cheapest = (f64::INFINITY, 0, 0);
                for (a, wa) in nodes[i].iter().enumerate() {
                    for (b, wb) in nodes[j].iter().enumerate() {
                        let cost = edge_cost(wa, wb, mesh, config);
                        if cost < cheapest.0 {
                            cheapest = (cost, a, b);
                        }
                    }
                }

                let (cost, a, b) = cheapest;
                let yaw = bearing(&nodes[i][a].position, &nodes[j][b].position);
                matrix.set_edge(i, j, cost, yaw);
                best[i * n + j] = (a, b);
                best[j * n + i] = (b, a);
            }
            trace!(row = i, "meta cost row done");
        }

        debug!(
            clouds = clouds.len(),
            waypoints = clouds.iter().map(Vec::len).sum::<usize>(),
            obstructed = matrix.obstructed_edges(),
            "built meta cost matrix"
        );
        Ok(Self {
            matrix,
            best,
            sizes: nodes.iter().map(|c| c.len()).collect(),
        })
    }

    /// The cluster-level cost table, usable by the optimizer.
    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    /// Members of `from` and `to` joined by the cheapest edge between them.
    pub fn best_members(&self, from: usize, to: usize) -> (usize, usize) {
        self.best[from * self.matrix.nodes + to]
    }

    /// Flattens an ordering of clusters into single waypoint visits.
    ///
    /// Each cluster is entered at the member closest to its predecessor and
    /// left at the member closest to its successor; the remaining members are
    /// visited in between in their original order.
    pub fn expand(&self, tour: &[usize]) -> Vec<CloudVisit> {
        let path: Vec<usize> = iter::once(self.matrix.before())
            .chain(tour.iter().copied())
            .chain(iter::once(self.matrix.after()))
            .collect();

        let mut out = Vec::with_capacity(self.sizes.iter().sum());
        for w in path.windows(3) {
            let (prev, cloud, next) = (w[0], w[1], w[2]);
            let entry = self.best_members(prev, cloud).1;
            let exit = self.best_members(cloud, next).0;

            out.push(CloudVisit { cloud, member: entry });
            out.extend(
                (0..self.sizes[cloud])
                    .filter(|&m| m != entry && m != exit)
                    .map(|member| CloudVisit { cloud, member }),
            );
            if exit != entry {
                out.push(CloudVisit { cloud, member: exit });
            }
        }
        out
    }
}

/// A flight segment that violates the safety distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    /// Index of the segment start in the checked path.
    pub segment: usize,
    pub triangle: usize,
    pub distance: f64,
}

/// Checks every consecutive edge of a finished path against the mesh.
pub fn find_collisions(mesh: &TriangleMesh, safety_distance: f64, path: &[Point3]) -> Vec<Collision> {
    path.windows(2)
        .enumerate()
        .filter_map(|(segment, w)| {
            mesh.first_obstruction(&w[0], &w[1], safety_distance)
                .map(|(triangle, res)| Collision {
                    segment,
                    triangle,
                    distance: res.distance,
                })
        })
        .collect()
}
