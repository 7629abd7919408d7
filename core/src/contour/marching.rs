//! Marching squares tracer.
//!
//! The raster is walked on a grid padded by one ring of missing samples, so
//! every walk stays inside the grid and ends back at its start cell. Cells are
//! addressed in padded coordinates: padded sample `(i, j)` is raster sample
//! `(i - 1, j - 1)`.

use super::{ContourPolyline, ElevationRaster};
use crate::geometry::Point3;
use tracing::{trace, warn};

// Corner bits of a cell code
const UPPER_LEFT: u8 = 1;
const UPPER_RIGHT: u8 = 2;
const LOWER_LEFT: u8 = 4;
const LOWER_RIGHT: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    North,
    East,
    South,
    West,
}

impl Step {
    fn apply(self, i: usize, j: usize) -> (usize, usize) {
        match self {
            Step::North => (i - 1, j),
            Step::East => (i, j + 1),
            Step::South => (i + 1, j),
            Step::West => (i, j - 1),
        }
    }
}

/// Transition table. The saddles 6 and 9 keep the two raised corners apart;
/// which of their two crossings applies depends on how the cell was entered.
fn next_step(code: u8, previous: Option<Step>) -> Step {
    match code {
        1 | 5 | 13 => Step::North,
        2 | 3 | 7 => Step::East,
        4 | 12 | 14 => Step::West,
        8 | 10 | 11 => Step::South,
        6 => {
            if previous == Some(Step::North) {
                Step::West
            } else {
                Step::East
            }
        }
        9 => {
            if previous == Some(Step::East) {
                Step::North
            } else {
                Step::South
            }
        }
        _ => unreachable!("marching squares code {code} has no crossing"),
    }
}

struct Grid<'a> {
    raster: &'a ElevationRaster,
    level: f64,
    /// Cells per padded row.
    width: usize,
    height: usize,
}

impl Grid<'_> {
    fn sample(&self, i: usize, j: usize) -> Option<f64> {
        if i == 0 || j == 0 {
            return None;
        }
        self.raster.get(i - 1, j - 1)
    }

    fn above(&self, i: usize, j: usize) -> bool {
        self.sample(i, j).is_some_and(|v| v > self.level)
    }

    fn code(&self, i: usize, j: usize) -> u8 {
        let mut code = 0;
        if self.above(i, j) {
            code |= UPPER_LEFT;
        }
        if self.above(i, j + 1) {
            code |= UPPER_RIGHT;
        }
        if self.above(i + 1, j) {
            code |= LOWER_LEFT;
        }
        if self.above(i + 1, j + 1) {
            code |= LOWER_RIGHT;
        }
        code
    }

    fn corners(&self, i: usize, j: usize) -> Option<[f64; 4]> {
        Some([
            self.sample(i, j)?,
            self.sample(i, j + 1)?,
            self.sample(i + 1, j)?,
            self.sample(i + 1, j + 1)?,
        ])
    }

    /// Crossing point inside cell `(i, j)`.
    ///
    /// Walks from the cell center towards the corner farthest across the
    /// level and stops where the linear blend hits it. `None` when a corner is
    /// missing.
    fn crossing(&self, i: usize, j: usize) -> Option<Point3> {
        let values = self.corners(i, j)?;
        let offsets = [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)];
        let center = values.iter().sum::<f64>() / 4.0;

        let pick = |better: fn(f64, f64) -> bool| {
            (1..4).fold(0, |best, k| if better(values[k], values[best]) { k } else { best })
        };
        let corner = if center > self.level {
            pick(|a, b| a < b)
        } else {
            pick(|a, b| a > b)
        };

        let span = values[corner] - center;
        let t = if span == 0.0 { 0.0 } else { (self.level - center) / span };

        // Cell center in raster coordinates
        let row = i as f64 - 0.5;
        let col = j as f64 - 0.5;
        let (dr, dc) = offsets[corner];
        Some(self.raster.position(
            row + t * (dr - 0.5),
            col + t * (dc - 0.5),
            self.level,
        ))
    }
}

/// Traces the iso-line at `level`. A sample counts as raised when it is
/// present and strictly above the level.
pub fn trace_level(raster: &ElevationRaster, level: f64) -> Vec<ContourPolyline> {
    if raster.rows() == 0 || raster.cols() == 0 {
        return Vec::new();
    }

    let grid = Grid {
        raster,
        level,
        width: raster.cols() + 1,
        height: raster.rows() + 1,
    };

    let mut codes = vec![0u8; grid.width * grid.height];
    let mut finished = vec![true; grid.width * grid.height];
    for i in 0..grid.height {
        for j in 0..grid.width {
            let idx = i * grid.width + j;
            codes[idx] = grid.code(i, j);
            finished[idx] = codes[idx] == 0 || codes[idx] == 15 || grid.corners(i, j).is_none();
        }
    }

    let mut lines = Vec::new();
    for i in 0..grid.height {
        for j in 0..grid.width {
            if finished[i * grid.width + j] {
                continue;
            }
            for points in walk(&grid, &codes, &mut finished, (i, j)) {
                lines.push(ContourPolyline { level, points });
            }
        }
    }

    trace!(level, polylines = lines.len(), "traced level");
    lines
}

/// Follows one contour from `start` until it returns there. Each gap of
/// missing samples splits the walk; the piece running into the start is
/// joined with the piece leaving it.
fn walk(grid: &Grid, codes: &[u8], finished: &mut [bool], start: (usize, usize)) -> Vec<Vec<Point3>> {
    // A saddle cell is entered at most twice
    let limit = 2 * codes.len();

    let mut pieces: Vec<Vec<Point3>> = Vec::new();
    let mut current = Vec::new();
    let mut broken = false;
    let mut first_step = None;
    let mut previous = None;
    let (mut i, mut j) = start;

    for _ in 0..limit {
        let idx = i * grid.width + j;
        let step = next_step(codes[idx], previous);
        if (i, j) == start && previous.is_some() && first_step == Some(step) {
            break;
        }
        finished[idx] = true;

        match grid.crossing(i, j) {
            Some(p) => current.push(p),
            None => {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
                broken = true;
            }
        }

        if first_step.is_none() {
            first_step = Some(step);
        }
        previous = Some(step);
        (i, j) = step.apply(i, j);
    }

    if (i, j) != start {
        warn!(?start, "contour walk did not close");
    }

    if !broken {
        if let Some(&first) = current.first() {
            current.push(first);
        }
        return vec![current];
    }

    if !current.is_empty() {
        match pieces.first_mut() {
            Some(head) => {
                current.append(head);
                *head = current;
            }
            None => pieces.push(current),
        }
    }
    pieces
}
