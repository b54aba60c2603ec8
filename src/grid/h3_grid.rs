//! Hexagonal cells from the H3 system, backed by `h3o`.

use super::{CellGrid, Cover, MAX_RINGS, is_degenerate_radius};
use crate::distance::{MAX_GREAT_CIRCLE_KM, haversine_km};
use crate::error::{Result, SpindexError};
use geo::{Coord, Destination, Haversine, LineString, Point, Polygon};
use h3o::{CellIndex, LatLng, Resolution};
use rustc_hash::FxHashSet;
use std::f64::consts::PI;

// Points sampled on the search circle when measuring its ring distance
const MIN_CIRCLE_SAMPLES: f64 = 32.0;
const MAX_CIRCLE_SAMPLES: f64 = 4096.0;

// Rings added on top of the farthest sampled cell
const RING_MARGIN: u32 = 2;

// Radius inflation when the ring distance cannot be measured
const FALLBACK_SLACK: f64 = 1.25;

// Slack for rounding in the cell reach test, in kilometres
const REACH_TOLERANCE_KM: f64 = 1e-6;

/// H3 grid at a fixed resolution.
///
/// # Examples
///
/// ```rust
/// use spindex::grid::{CellGrid, H3Grid};
/// use geo::Point;
///
/// // Neighbourhood-sized hexagons, ~1.4 km edges
/// let grid = H3Grid::new(7)?;
/// let cell = grid.cell_for(&Point::new(-122.4194, 37.7749))?;
/// let boundary = grid.boundary(&cell)?;
/// // six vertices plus the closing one
/// assert_eq!(boundary.exterior().0.len(), 7);
/// # Ok::<(), spindex::SpindexError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct H3Grid {
    resolution: Resolution,
}

impl H3Grid {
    /// Create a grid at `resolution` (0 = continent sized, 15 = about a metre).
    pub fn new(resolution: u8) -> Result<Self> {
        let resolution = Resolution::try_from(resolution)
            .map_err(|_| SpindexError::InvalidResolution(resolution))?;
        Ok(Self { resolution })
    }

    pub fn resolution(&self) -> u8 {
        u8::from(self.resolution)
    }

    /// Parse the hexadecimal form of a cell index, e.g. `"8928308280fffff"`.
    pub fn parse_cell(&self, s: &str) -> Result<CellIndex> {
        let cell: CellIndex = s
            .parse()
            .map_err(|e| SpindexError::Cell(format!("'{}': {}", s, e)))?;
        if cell.resolution() != self.resolution {
            return Err(SpindexError::Cell(format!(
                "cell {} has resolution {}, grid uses {}",
                cell,
                u8::from(cell.resolution()),
                self.resolution()
            )));
        }
        Ok(cell)
    }

    /// Ring distance from `origin` to the farthest cell on the circle of
    /// `radius_km` around `at`, or `None` when H3 cannot measure it (the
    /// circle crosses pentagon distortion or spans too much of the globe).
    fn measured_rings(
        &self,
        origin: CellIndex,
        at: &Point,
        radius_km: f64,
        edge_km: f64,
    ) -> Option<u32> {
        if radius_km >= MAX_GREAT_CIRCLE_KM / 2.0 {
            return None;
        }

        let circumference = 2.0 * PI * radius_km;
        let samples = (circumference / edge_km)
            .ceil()
            .clamp(MIN_CIRCLE_SAMPLES, MAX_CIRCLE_SAMPLES);
        // samples further apart than one edge can skip a ring between them
        let spacing_rings = (circumference / samples / (1.5 * edge_km)).ceil() as u32;

        let mut farthest = 0u32;
        for i in 0..samples as u32 {
            let bearing = 360.0 * f64::from(i) / samples;
            let on_circle = Haversine.destination(*at, bearing, radius_km * 1_000.0);
            let cell = LatLng::new(on_circle.y(), on_circle.x())
                .ok()?
                .to_cell(self.resolution);
            let distance = origin.grid_distance(cell).ok()?;
            farthest = farthest.max(u32::try_from(distance).ok()?);
        }

        Some(farthest + spacing_rings + RING_MARGIN)
    }
}

impl CellGrid for H3Grid {
    type Cell = CellIndex;

    fn name(&self) -> &'static str {
        "h3"
    }

    fn cell_for(&self, point: &Point) -> Result<CellIndex> {
        let latlng = LatLng::new(point.y(), point.x())?;
        Ok(latlng.to_cell(self.resolution))
    }

    fn boundary(&self, cell: &CellIndex) -> Result<Polygon> {
        let coords: Vec<Coord> = cell
            .boundary()
            .iter()
            .map(|vertex| Coord {
                x: vertex.lng(),
                y: vertex.lat(),
            })
            .collect();

        if coords.len() < 3 {
            return Err(SpindexError::Cell(format!(
                "cell {} has a degenerate boundary",
                cell
            )));
        }

        // Polygon::new closes the exterior ring
        Ok(Polygon::new(LineString::from(coords), vec![]))
    }

    fn disk(&self, cell: &CellIndex, k: u32) -> Result<FxHashSet<CellIndex>> {
        Ok(cell.grid_disk::<FxHashSet<_>>(k))
    }

    /// Edge of a regular hexagon with the area of the cell at `at`. H3 cells
    /// shrink by up to half away from the icosahedron face centres, so this
    /// can differ a lot from the resolution's average edge.
    fn edge_length_km(&self, at: &Point) -> f64 {
        match LatLng::new(at.y(), at.x()) {
            Ok(latlng) => local_edge_km(latlng.to_cell(self.resolution)),
            Err(_) => self.resolution.edge_length_km(),
        }
    }

    /// Measured on the grid: the ring distance to cells sampled on the search
    /// circle, plus a margin. Falls back to [`hex_rings_for_radius`] with the
    /// local edge and an inflated radius where H3 cannot measure distances.
    fn rings_for_radius(&self, at: &Point, radius_km: f64) -> u32 {
        if is_degenerate_radius(radius_km) {
            return 0;
        }
        let Ok(latlng) = LatLng::new(at.y(), at.x()) else {
            return hex_rings_for_radius(radius_km, self.resolution.edge_length_km());
        };
        let origin = latlng.to_cell(self.resolution);
        let edge_km = local_edge_km(origin);

        let rings = match self.measured_rings(origin, at, radius_km, edge_km) {
            Some(rings) => rings,
            None => {
                log::debug!(
                    "cannot measure ring distance around {}, sizing {} km from edge {} km",
                    origin,
                    radius_km,
                    edge_km
                );
                hex_rings_for_radius(radius_km * FALLBACK_SLACK, edge_km)
            }
        };

        if rings > MAX_RINGS {
            log::warn!(
                "radius {} km needs {} rings around {}, capping at {}",
                radius_km,
                rings,
                origin,
                MAX_RINGS
            );
            return MAX_RINGS;
        }
        rings
    }

    fn cover(&self, at: &Point, radius_km: f64) -> Result<Cover<CellIndex>> {
        let origin = self.cell_for(at)?;
        if is_degenerate_radius(radius_km) {
            return Ok(Cover::single(origin));
        }

        let rings = self.rings_for_radius(at, radius_km);
        let mut cells: FxHashSet<CellIndex> = self
            .disk(&origin, rings)?
            .into_iter()
            .filter(|cell| may_reach(*cell, at, radius_km))
            .collect();
        cells.insert(origin);

        Ok(Cover {
            origin,
            rings,
            cells,
        })
    }
}

fn local_edge_km(cell: CellIndex) -> f64 {
    // area of a regular hexagon is 3√3/2 · e²
    (2.0 * cell.area_km2() / (3.0 * 3f64.sqrt())).sqrt()
}

/// Whether `cell` can hold a point within `radius_km` of `at`: its centre
/// must lie within the radius plus the centre's distance to its farthest
/// vertex.
fn may_reach(cell: CellIndex, at: &Point, radius_km: f64) -> bool {
    let center = LatLng::from(cell);
    let center = Point::new(center.lng(), center.lat());
    let reach = cell
        .boundary()
        .iter()
        .map(|vertex| haversine_km(&center, &Point::new(vertex.lng(), vertex.lat())))
        .fold(0.0, f64::max);
    haversine_km(at, &center) <= radius_km + reach + REACH_TOLERANCE_KM
}

/// Rings needed for a hexagon disk to cover a circle of `radius_km`.
///
/// The target lies within one edge of its cell's centre, and a disk of `k`
/// rings holds every point within `1.5k + 0.5` edges of that centre. One
/// ring is added on top to absorb local variation in cell size.
///
/// ```rust
/// use spindex::grid::hex_rings_for_radius;
///
/// assert_eq!(hex_rings_for_radius(0.0, 1.0), 0);
/// assert_eq!(hex_rings_for_radius(1.0, 1.0), 2);
/// assert_eq!(hex_rings_for_radius(10.0, 1.0), 8);
/// ```
pub fn hex_rings_for_radius(radius_km: f64, edge_km: f64) -> u32 {
    if radius_km.is_nan() || radius_km <= 0.0 || edge_km.is_nan() || edge_km <= 0.0 {
        return 0;
    }
    let rings = ((radius_km + 2.0 * edge_km) / (1.5 * edge_km)).ceil();
    if rings >= f64::from(MAX_RINGS) {
        log::warn!(
            "radius {} km needs {} rings at edge {} km, capping at {}",
            radius_km,
            rings,
            edge_km,
            MAX_RINGS
        );
        return MAX_RINGS;
    }
    rings as u32
}
