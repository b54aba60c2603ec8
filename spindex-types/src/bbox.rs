use crate::point::GeoCoord;
use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A latitude/longitude window used to draw random samples.
///
/// # Examples
///
/// ```
/// use spindex_types::bbox::BoundingBox;
/// use spindex_types::point::GeoCoord;
///
/// let bay_area = BoundingBox::new(37.2, -122.6, 38.0, -121.8);
/// assert!(bay_area.contains(GeoCoord::new(37.7749, -122.4194)));
/// assert!(!bay_area.contains(GeoCoord::new(40.7128, -74.0060)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// The whole globe.
    pub const fn world() -> Self {
        Self::new(-90.0, -180.0, 90.0, 180.0)
    }

    /// A box spanning `half_span_deg` degrees on each side of `center`.
    pub fn around(center: GeoCoord, half_span_deg: f64) -> Self {
        Self::new(
            center.lat - half_span_deg,
            center.lon - half_span_deg,
            center.lat + half_span_deg,
            center.lon + half_span_deg,
        )
    }

    /// Whether min <= max on both axes.
    pub fn is_ordered(&self) -> bool {
        self.min_lat <= self.max_lat && self.min_lon <= self.max_lon
    }

    /// Inclusive containment test.
    pub fn contains(&self, coord: GeoCoord) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.lat)
            && (self.min_lon..=self.max_lon).contains(&coord.lon)
    }

    pub fn center(&self) -> GeoCoord {
        GeoCoord::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Convert to a `geo::Rect` (x = longitude, y = latitude).
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            geo::coord! { x: self.min_lon, y: self.min_lat },
            geo::coord! { x: self.max_lon, y: self.max_lat },
        )
    }

    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        self.contains(GeoCoord::from_point(*point))
    }
}
