//! Cell hashing schemes.
//!
//! A [`CellGrid`] tessellates the globe into cells and exposes the three
//! operations the grid-membership search needs:
//!
//! 1. coordinate + precision level → cell identifier ([`CellGrid::cell_for`])
//! 2. cell identifier → boundary polygon ([`CellGrid::boundary`])
//! 3. cell identifier + ring distance → surrounding cells ([`CellGrid::disk`])
//!
//! On top of those, [`CellGrid::cover`] picks the cells a radius search has
//! to look at.
//!
//! Cell identifiers are opaque: callers only compare, hash and print them.
//!
//! ```rust
//! use spindex::grid::{CellGrid, H3Grid};
//! use geo::Point;
//!
//! let grid = H3Grid::new(9)?;
//! let cell = grid.cell_for(&Point::new(-122.4194, 37.7749))?;
//! let disk = grid.disk(&cell, 1)?;
//! assert_eq!(disk.len(), 7);
//! assert!(disk.contains(&cell));
//! # Ok::<(), spindex::SpindexError>(())
//! ```

mod geohash_grid;
mod h3_grid;

pub use geohash_grid::GeohashGrid;
pub use h3_grid::{H3Grid, hex_rings_for_radius};

use crate::error::Result;
use geo::{Point, Polygon};
use rustc_hash::FxHashSet;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A discrete global grid that assigns every coordinate to one cell.
pub trait CellGrid {
    /// Opaque cell identifier.
    type Cell: Clone + Eq + Hash + Debug + Display;

    /// Short scheme name used in logs and reports.
    fn name(&self) -> &'static str;

    /// The cell containing `point` (x = longitude, y = latitude).
    fn cell_for(&self, point: &Point) -> Result<Self::Cell>;

    /// Boundary of `cell` as a polygon with a closed exterior ring.
    ///
    /// Calling this twice for the same cell yields the same polygon.
    fn boundary(&self, cell: &Self::Cell) -> Result<Polygon>;

    /// All cells within `k` grid steps of `cell`, including `cell` itself.
    fn disk(&self, cell: &Self::Cell, k: u32) -> Result<FxHashSet<Self::Cell>>;

    /// Characteristic edge length of a cell near `at`, in kilometres.
    fn edge_length_km(&self, at: &Point) -> f64;

    /// How many rings a disk around the cell at `at` needs so that it covers
    /// every point within `radius_km`. Zero for non-positive radii.
    fn rings_for_radius(&self, at: &Point, radius_km: f64) -> u32;

    /// Every cell that may hold a point within `radius_km` of `at`.
    ///
    /// The set is a superset of the cells intersecting the circle: no cell
    /// holding a point inside the radius is left out, while cells wholly
    /// outside it are dropped where the grid can tell. A non-positive or NaN
    /// radius yields the origin cell alone.
    fn cover(&self, at: &Point, radius_km: f64) -> Result<Cover<Self::Cell>>;
}

/// The cells covering a search circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Cover<C: Eq + Hash> {
    /// Cell containing the circle's centre.
    pub origin: C,
    /// Ring distance of the disk the cells were drawn from.
    pub rings: u32,
    pub cells: FxHashSet<C>,
}

impl<C: Clone + Eq + Hash> Cover<C> {
    /// A cover made of the origin cell alone.
    pub fn single(origin: C) -> Self {
        let mut cells = FxHashSet::default();
        cells.insert(origin.clone());
        Self {
            origin,
            rings: 0,
            cells,
        }
    }

    pub fn contains(&self, cell: &C) -> bool {
        self.cells.contains(cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// radius for which no cell beyond the origin is needed
pub(crate) fn is_degenerate_radius(radius_km: f64) -> bool {
    radius_km.is_nan() || radius_km <= 0.0
}

/// Hard cap on disk size; beyond this a brute-force scan is cheaper anyway.
pub const MAX_RINGS: u32 = 256;
