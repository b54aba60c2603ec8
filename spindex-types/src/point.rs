use geo::Point;
use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees, written latitude first.
///
/// Nothing about the range is enforced here; out-of-range values are carried
/// through unchanged and it is up to the consumer to decide what they mean.
///
/// # Examples
///
/// ```
/// use spindex_types::point::GeoCoord;
///
/// let nyc = GeoCoord::new(40.7128, -74.0060);
/// assert_eq!(nyc.lat, 40.7128);
/// assert_eq!(nyc.lon, -74.0060);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

impl GeoCoord {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Convert to a `geo::Point` (x = longitude, y = latitude).
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Build from a `geo::Point` (x = longitude, y = latitude).
    pub fn from_point(point: Point<f64>) -> Self {
        Self {
            lat: point.y(),
            lon: point.x(),
        }
    }
}

impl From<GeoCoord> for Point<f64> {
    fn from(coord: GeoCoord) -> Self {
        coord.to_point()
    }
}

impl From<Point<f64>> for GeoCoord {
    fn from(point: Point<f64>) -> Self {
        GeoCoord::from_point(point)
    }
}

/// A point on a flat plane, in arbitrary units.
///
/// Used for the tree comparisons where geographic curvature is irrelevant.
///
/// # Examples
///
/// ```
/// use spindex_types::point::PlanarPoint;
///
/// let a = PlanarPoint::new(0.0, 0.0);
/// let b = PlanarPoint::new(3.0, 4.0);
/// assert_eq!(a.distance(&b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &PlanarPoint) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared Euclidean distance, for comparisons that can skip the root.
    #[inline]
    pub fn distance_squared(&self, other: &PlanarPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl From<[f64; 2]> for PlanarPoint {
    fn from(coords: [f64; 2]) -> Self {
        Self::new(coords[0], coords[1])
    }
}
