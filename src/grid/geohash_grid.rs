//! Rectangular cells from the geohash system.

use super::{CellGrid, Cover, MAX_RINGS, is_degenerate_radius};
use crate::distance::{EARTH_RADIUS_KM, haversine_km};
use crate::error::{Result, SpindexError};
use geo::{Point, Polygon, Rect};
use geohash::{decode_bbox, encode, neighbors};
use rustc_hash::FxHashSet;

const KM_PER_DEGREE: f64 = std::f64::consts::PI * EARTH_RADIUS_KM / 180.0;

// Slack for rounding in the cell distance test, in kilometres
const DISTANCE_TOLERANCE_KM: f64 = 1e-6;

/// Geohash grid at a fixed precision (string length).
///
/// Cells are latitude/longitude rectangles, so they shrink east-west towards
/// the poles. Disks are built by expanding the eight neighbours ring by ring;
/// radius covers use separate row and column counts instead, since a circle
/// spans more columns than rows away from the equator.
///
/// # Examples
///
/// ```rust
/// use spindex::grid::{CellGrid, GeohashGrid};
/// use geo::Point;
///
/// let grid = GeohashGrid::new(7)?;
/// let cell = grid.cell_for(&Point::new(-74.0060, 40.7128))?;
/// assert_eq!(cell.len(), 7);
/// assert_eq!(grid.disk(&cell, 1)?.len(), 9);
/// # Ok::<(), spindex::SpindexError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeohashGrid {
    precision: usize,
}

impl GeohashGrid {
    /// Create a grid with `precision` characters per hash (1-12).
    pub fn new(precision: usize) -> Result<Self> {
        if !(1..=12).contains(&precision) {
            return Err(SpindexError::InvalidPrecision(precision));
        }
        Ok(Self { precision })
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Cell height and width in degrees.
    pub fn cell_size_deg(&self) -> (f64, f64) {
        let bits = 5 * self.precision as i32;
        let lat_bits = bits / 2;
        let lon_bits = bits - lat_bits;
        (180.0 / 2f64.powi(lat_bits), 360.0 / 2f64.powi(lon_bits))
    }

    /// Rows and columns of cells on each side of the origin cell that a circle
    /// of `radius_km` centred at latitude `lat` can reach.
    fn cover_extent(&self, lat: f64, radius_km: f64) -> (u32, u32) {
        let (height, width) = self.cell_size_deg();
        let all_cols = (180.0 / width).ceil();

        let angle = radius_km / EARTH_RADIUS_KM;
        let lat_extent = angle.to_degrees();
        let cos_lat = lat.to_radians().cos();

        // widest longitude offset on a spherical cap, or every column when
        // the cap holds a pole
        let cols = if angle >= std::f64::consts::FRAC_PI_2 || angle.sin() >= cos_lat {
            all_cols
        } else {
            let lon_extent = (angle.sin() / cos_lat).asin().to_degrees();
            ((lon_extent / width).ceil() + 1.0).min(all_cols)
        };
        let rows = ((lat_extent / height).ceil() + 1.0).min((180.0 / height).ceil());

        (
            cap_rings(rows, "rows", lat, radius_km),
            cap_rings(cols, "columns", lat, radius_km),
        )
    }
}

impl CellGrid for GeohashGrid {
    type Cell = String;

    fn name(&self) -> &'static str {
        "geohash"
    }

    fn cell_for(&self, point: &Point) -> Result<String> {
        let coord = geohash::Coord {
            x: point.x(),
            y: point.y(),
        };
        Ok(encode(coord, self.precision)?)
    }

    fn boundary(&self, cell: &String) -> Result<Polygon> {
        Ok(decode_bbox(cell)?.to_polygon())
    }

    fn disk(&self, cell: &String, k: u32) -> Result<FxHashSet<String>> {
        // validates the hash before expanding
        decode_bbox(cell)?;

        let mut cells = FxHashSet::default();
        cells.insert(cell.clone());

        let mut frontier = vec![cell.clone()];
        for _ in 0..k {
            let mut next = Vec::new();
            for hash in &frontier {
                let nb = match neighbors(hash) {
                    Ok(nb) => nb,
                    Err(e) => {
                        // polar rows have no neighbour beyond the pole
                        log::debug!("no neighbours for {}: {}", hash, e);
                        continue;
                    }
                };
                for neighbor in [nb.n, nb.ne, nb.e, nb.se, nb.s, nb.sw, nb.w, nb.nw] {
                    if cells.insert(neighbor.clone()) {
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(cells)
    }

    fn edge_length_km(&self, at: &Point) -> f64 {
        let (height_deg, width_deg) = self.cell_size_deg();
        let height_km = height_deg * KM_PER_DEGREE;
        let width_km = width_deg * KM_PER_DEGREE * at.y().to_radians().cos().abs();
        height_km.min(width_km)
    }

    /// The larger of the row and column counts of [`GeohashGrid::cover`].
    fn rings_for_radius(&self, at: &Point, radius_km: f64) -> u32 {
        if is_degenerate_radius(radius_km) {
            return 0;
        }
        let (rows, cols) = self.cover_extent(at.y(), radius_km);
        rows.max(cols)
    }

    /// Enumerates the rectangle of cells the circle's latitude and longitude
    /// extent can reach, then keeps those whose nearest point lies within the
    /// radius. Wraps across the antimeridian and spans every column when the
    /// circle contains a pole.
    fn cover(&self, at: &Point, radius_km: f64) -> Result<Cover<String>> {
        let origin = self.cell_for(at)?;
        if is_degenerate_radius(radius_km) {
            return Ok(Cover::single(origin));
        }

        let (rows, cols) = self.cover_extent(at.y(), radius_km);
        let (height, width) = self.cell_size_deg();
        let center = decode_bbox(&origin)?.center();

        let mut cells = FxHashSet::default();
        cells.insert(origin.clone());
        for row in -(rows as i64)..=rows as i64 {
            let lat = center.y + row as f64 * height;
            if !(-90.0..=90.0).contains(&lat) {
                continue;
            }
            for col in -(cols as i64)..=cols as i64 {
                let lon = wrap_longitude(center.x + col as f64 * width);
                let hash = encode(geohash::Coord { x: lon, y: lat }, self.precision)?;
                if cells.contains(&hash) {
                    continue;
                }
                let rect = decode_bbox(&hash)?;
                if distance_to_rect_km(at, &rect) <= radius_km + DISTANCE_TOLERANCE_KM {
                    cells.insert(hash);
                }
            }
        }

        Ok(Cover {
            origin,
            rings: rows.max(cols),
            cells,
        })
    }
}

fn cap_rings(count: f64, axis: &str, lat: f64, radius_km: f64) -> u32 {
    if count >= f64::from(MAX_RINGS) {
        log::warn!(
            "radius {} km needs {} geohash {} near latitude {}, capping at {}",
            radius_km,
            count,
            axis,
            lat,
            MAX_RINGS
        );
        return MAX_RINGS;
    }
    count as u32
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Great-circle distance from `at` to the nearest point of a geohash cell.
fn distance_to_rect_km(at: &Point, rect: &Rect) -> f64 {
    let (min, max) = (rect.min(), rect.max());

    // inside the cell's meridian band the nearest point is due north or south
    let east_of_min = (at.x() - min.x).rem_euclid(360.0);
    if east_of_min <= max.x - min.x {
        let nearest = Point::new(at.x(), at.y().clamp(min.y, max.y));
        return haversine_km(at, &nearest);
    }

    distance_to_meridian_km(at, min.x, min.y, max.y)
        .min(distance_to_meridian_km(at, max.x, min.y, max.y))
}

/// Distance from `at` to the meridian `lon` between latitudes `south` and
/// `north`. Along a meridian the distance has a single minimum, at the
/// latitude `atan2(sin φ, cos φ · cos Δλ)`.
fn distance_to_meridian_km(at: &Point, lon: f64, south: f64, north: f64) -> f64 {
    let lat = at.y().to_radians();
    let delta_lon = (lon - at.x()).to_radians();
    let closest = lat
        .sin()
        .atan2(lat.cos() * delta_lon.cos())
        .to_degrees()
        .clamp(south, north);

    [south, north, closest]
        .into_iter()
        .map(|edge_lat| haversine_km(at, &Point::new(lon, edge_lat)))
        .fold(f64::INFINITY, f64::min)
}
