//! Strategies for finding the nearest vehicle ahead.
//!
//! Every strategy must return the same leader for the same input: the vehicle with the
//! smallest strictly positive forward separation, ties broken by the lowest [VehicleId].

use crate::math::forward_distance;
use crate::VehicleId;
use smallvec::SmallVec;

/// The nearest vehicle ahead of another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leader {
    /// The ID of the vehicle ahead.
    pub id: VehicleId,
    /// The forward separation to the vehicle ahead.
    pub gap: f64,
}

impl Leader {
    /// Whether this leader should be preferred over `other`.
    fn is_closer_than(&self, other: Option<&Leader>) -> bool {
        match other {
            None => true,
            Some(other) => self.gap < other.gap || (self.gap == other.gap && self.id < other.id),
        }
    }
}

/// An index which answers nearest-ahead queries.
pub trait NearestAhead {
    /// Rebuilds the index from the vehicle x coordinates of the current tick.
    fn rebuild(&mut self, vehicles: &[(VehicleId, f64)], width: f64);

    /// Finds the nearest vehicle strictly ahead of the vehicle `id` located at `x`.
    fn nearest_ahead(&self, id: VehicleId, x: f64) -> Option<Leader>;
}

/// Compares against every vehicle. O(V) per query.
#[derive(Clone, Debug, Default)]
pub struct LinearScan {
    vehicles: Vec<(VehicleId, f64)>,
    width: f64,
}

impl NearestAhead for LinearScan {
    fn rebuild(&mut self, vehicles: &[(VehicleId, f64)], width: f64) {
        self.vehicles.clear();
        self.vehicles.extend_from_slice(vehicles);
        self.width = width;
    }

    fn nearest_ahead(&self, id: VehicleId, x: f64) -> Option<Leader> {
        let mut best: Option<Leader> = None;
        for (other, other_x) in &self.vehicles {
            if *other == id {
                continue;
            }
            let gap = forward_distance(x, *other_x, self.width);
            if gap <= 0.0 {
                continue;
            }
            let candidate = Leader { id: *other, gap };
            if candidate.is_closer_than(best.as_ref()) {
                best = Some(candidate);
            }
        }
        best
    }
}

/// Buckets vehicles into fixed-size cells along the road and walks forward
/// from the querying vehicle's cell, stopping at the first cell with a candidate.
///
/// There are never more cells than vehicles; a smaller `cell_size` is widened to fit.
#[derive(Clone, Debug)]
pub struct CellGrid {
    cell_size: f64,
    /// The length of each cell after the last rebuild.
    cell_len: f64,
    width: f64,
    cells: Vec<SmallVec<[(VehicleId, f64); 4]>>,
}

impl CellGrid {
    /// Creates an empty grid. `cell_size` must be positive.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cell_len: cell_size,
            width: 0.0,
            cells: vec![],
        }
    }

    fn cell_of(&self, x: f64) -> usize {
        usize::min((x / self.cell_len) as usize, self.cells.len() - 1)
    }
}

impl NearestAhead for CellGrid {
    fn rebuild(&mut self, vehicles: &[(VehicleId, f64)], width: f64) {
        let max_cells = usize::max(vehicles.len(), 1);
        let num_cells = ((width / self.cell_size).ceil() as usize).clamp(1, max_cells);
        self.cell_len = width / num_cells as f64;
        self.width = width;
        self.cells.clear();
        self.cells.resize(num_cells, SmallVec::new());
        for (id, x) in vehicles {
            let cell = self.cell_of(*x);
            self.cells[cell].push((*id, *x));
        }
    }

    fn nearest_ahead(&self, id: VehicleId, x: f64) -> Option<Leader> {
        if self.cells.is_empty() {
            return None;
        }
        let num_cells = self.cells.len();
        let start = self.cell_of(x);

        // Step 0 covers the part of the own cell ahead of `x`, step `num_cells` the part behind it
        for step in 0..=num_cells {
            let cell = &self.cells[(start + step) % num_cells];
            let mut best: Option<Leader> = None;
            for (other, other_x) in cell {
                if *other == id {
                    continue;
                }
                let in_range = match step {
                    0 => *other_x > x,
                    s if s == num_cells => *other_x < x,
                    _ => true,
                };
                if !in_range {
                    continue;
                }
                let gap = forward_distance(x, *other_x, self.width);
                if gap <= 0.0 {
                    continue;
                }
                let candidate = Leader { id: *other, gap };
                if candidate.is_closer_than(best.as_ref()) {
                    best = Some(candidate);
                }
            }
            if best.is_some() {
                return best;
            }
        }
        None
    }
}
