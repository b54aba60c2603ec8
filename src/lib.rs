//! Spatial indexing walkthrough: H3 and geohash cells, great-circle search by
//! exhaustive scan and by grid membership, R-tree and KD-tree planar queries,
//! and cell boundaries rendered on a web map.
//!
//! ```rust
//! use spindex::prelude::*;
//!
//! let grid = H3Grid::new(7)?;
//! let target = Point::new(-122.4194, 37.7749);
//! let cell = grid.cell_for(&target)?;
//!
//! let points = vec![target, Point::new(-122.2712, 37.8044)];
//! let exact = exhaustive_within(&target, &points, 5.0);
//! let cells = assign_cells(&grid, &points)?;
//! let hits = grid_within(&grid, &cells, &target, 5.0)?;
//!
//! assert_eq!(exact, vec![0]);
//! assert!(hits.indices.contains(&0));
//!
//! let mut map = MapView::new(GeoCoord::new(37.7749, -122.4194), 13);
//! map.add_cell(&grid, &cell)?;
//! # Ok::<(), spindex::SpindexError>(())
//! ```

pub mod config;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod grid;
pub mod map;
pub mod planar;
pub mod search;
pub mod validation;
pub mod walkthrough;

pub use config::{Config, MapConfig, PlanarConfig};
pub use error::{Result, SpindexError};
pub use walkthrough::{Report, Walkthrough};

pub use geo::{Point, Polygon};

pub use distance::{DistanceMetric, EARTH_RADIUS_KM, distance_between, haversine_km};

pub use spindex_types::bbox::BoundingBox;
pub use spindex_types::point::{GeoCoord, PlanarPoint};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, Report, Result, SpindexError, Walkthrough};

    pub use geo::{Point, Polygon};

    pub use crate::{BoundingBox, GeoCoord, PlanarPoint};

    pub use crate::distance::{DistanceMetric, distance_between, haversine_km};

    pub use crate::grid::{CellGrid, GeohashGrid, H3Grid};

    pub use crate::search::{assign_cells, compare, exhaustive_within, grid_within};

    pub use crate::planar::{KdTreeIndex, PlanarIndex, RTreeIndex};

    pub use crate::map::MapView;
}
