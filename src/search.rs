//! "Points near a target" on the sphere, two ways.
//!
//! - [`exhaustive_within`] computes the haversine distance from the target to
//!   every point. Exact, linear in the dataset size, no pruning.
//! - [`grid_within`] precomputes a cell per point once ([`assign_cells`]) and
//!   then keeps every point whose cell is among the cells covering the search
//!   circle. This is grid-membership filtering: an approximation that can
//!   include points beyond the radius and is not corrected afterwards.
//!
//! [`compare`] measures how far the two answers agree.
//!
//! ```rust
//! use spindex::grid::H3Grid;
//! use spindex::search::{assign_cells, compare, exhaustive_within, grid_within};
//! use geo::Point;
//!
//! let points = vec![
//!     Point::new(-122.4194, 37.7749), // San Francisco
//!     Point::new(-122.2712, 37.8044), // Oakland
//!     Point::new(-118.2437, 34.0522), // Los Angeles
//! ];
//! let target = Point::new(-122.4194, 37.7749);
//!
//! let exact = exhaustive_within(&target, &points, 20.0);
//! assert_eq!(exact, vec![0, 1]);
//!
//! let grid = H3Grid::new(6)?;
//! let cells = assign_cells(&grid, &points)?;
//! let hits = grid_within(&grid, &cells, &target, 20.0)?;
//! assert!(hits.indices.contains(&0));
//! assert!(!hits.indices.contains(&2));
//!
//! let cmp = compare(&exact, &hits.indices, points.len());
//! assert!(cmp.agreement() > 0.6);
//! # Ok::<(), spindex::SpindexError>(())
//! ```

use crate::distance::haversine_km;
use crate::error::Result;
use crate::grid::CellGrid;
use geo::Point;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Indices of every point within `radius_km` of `target`, in dataset order.
pub fn exhaustive_within(target: &Point, points: &[Point], radius_km: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| haversine_km(target, point) <= radius_km)
        .map(|(i, _)| i)
        .collect()
}

/// The cell of every point in a dataset, computed once up front.
#[derive(Debug, Clone)]
pub struct CellAssignment<C> {
    cells: Vec<C>,
}

impl<C: Clone + Eq + std::hash::Hash> CellAssignment<C> {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell of the point at `index`.
    pub fn cell(&self, index: usize) -> Option<&C> {
        self.cells.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.cells.iter()
    }

    /// Number of points per occupied cell.
    pub fn occupancy(&self) -> FxHashMap<C, usize> {
        let mut counts = FxHashMap::default();
        for cell in &self.cells {
            *counts.entry(cell.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of distinct occupied cells.
    pub fn distinct_cells(&self) -> usize {
        self.cells.iter().collect::<FxHashSet<_>>().len()
    }
}

/// Compute the cell of every point. Fails on the first point the grid rejects.
pub fn assign_cells<G: CellGrid>(
    grid: &G,
    points: &[Point],
) -> Result<CellAssignment<G::Cell>> {
    let cells = points
        .iter()
        .map(|point| grid.cell_for(point))
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "assigned {} points to {} cells",
        cells.len(),
        cells.iter().collect::<FxHashSet<_>>().len()
    );

    Ok(CellAssignment { cells })
}

/// Result of a grid-membership search.
#[derive(Debug, Clone, PartialEq)]
pub struct GridHits {
    /// Candidate indices, in dataset order.
    pub indices: Vec<usize>,
    /// Ring distance of the disk the covering cells were drawn from.
    pub rings: u32,
    /// Number of cells covering the search circle.
    pub covering_cells: usize,
}

/// Candidates whose precomputed cell lies among the cells covering
/// `radius_km` around `target` (see [`CellGrid::cover`]).
pub fn grid_within<G: CellGrid>(
    grid: &G,
    assignment: &CellAssignment<G::Cell>,
    target: &Point,
    radius_km: f64,
) -> Result<GridHits> {
    let cover = grid.cover(target, radius_km)?;

    let indices = assignment
        .iter()
        .enumerate()
        .filter(|(_, cell)| cover.contains(*cell))
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    log::debug!(
        "{} cover around {}: {} rings, {} cells, {} candidates",
        grid.name(),
        cover.origin,
        cover.rings,
        cover.len(),
        indices.len()
    );

    Ok(GridHits {
        indices,
        rings: cover.rings,
        covering_cells: cover.len(),
    })
}

/// Confusion counts of an approximate result against the exact one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Comparison {
    pub total: usize,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

impl Comparison {
    /// Share of the dataset both methods classify the same way.
    pub fn agreement(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total)
    }

    /// Share of exact hits the approximation found.
    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// Share of approximate hits that are exact hits.
    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// Intersection over union of the two hit sets.
    pub fn jaccard(&self) -> f64 {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives + self.false_negatives,
        )
    }
}

// an empty denominator means there was nothing to get wrong
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        1.0
    } else {
        num as f64 / den as f64
    }
}

/// Compare exact and approximate index sets over a dataset of `total` points.
pub fn compare(exact: &[usize], approx: &[usize], total: usize) -> Comparison {
    let exact: FxHashSet<usize> = exact.iter().copied().collect();
    let approx: FxHashSet<usize> = approx.iter().copied().collect();

    let true_positives = exact.intersection(&approx).count();
    let false_positives = approx.len() - true_positives;
    let false_negatives = exact.len() - true_positives;
    let true_negatives = total.saturating_sub(true_positives + false_positives + false_negatives);

    Comparison {
        total,
        true_positives,
        false_positives,
        false_negatives,
        true_negatives,
    }
}
