//! Great-circle and planar distance functions.
//!
//! [`haversine_km`] is the hand-written formula that the exhaustive scan relies
//! on. [`distance_between`] wraps the `geo` crate's metric spaces so the
//! hand-written function can be cross-checked against a library implementation.

use geo::{Distance, Euclidean, Geodesic, Haversine, Point, Rhumb};
use spindex_types::point::PlanarPoint;

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Half the circumference of the mean sphere: the largest possible
/// great-circle distance.
pub const MAX_GREAT_CIRCLE_KM: f64 = std::f64::consts::PI * EARTH_RADIUS_KM;

/// Distance metrics for spatial calculations.
///
/// - **Haversine**: Fast spherical distance, good for most lon/lat calculations
/// - **Geodesic**: More accurate ellipsoidal distance (Karney 2013), slower
/// - **Rhumb**: Constant bearing distance, useful for navigation
/// - **Euclidean**: Planar distance, only for projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    Haversine,
    Geodesic,
    Rhumb,
    Euclidean,
}

/// Great-circle distance between two geographic points in kilometres.
///
/// Points use x = longitude and y = latitude, in degrees. Coordinates are not
/// range-checked.
///
/// # Examples
///
/// ```rust
/// use spindex::distance::haversine_km;
/// use geo::Point;
///
/// let sf = Point::new(-122.4194, 37.7749);
/// assert_eq!(haversine_km(&sf, &sf), 0.0);
///
/// let d = haversine_km(&Point::new(0.0, 0.0), &Point::new(180.0, 0.0));
/// assert!((d - 20_015.0).abs() < 1.0);
/// ```
pub fn haversine_km(a: &Point, b: &Point) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let delta_lat = (b.y() - a.y()).to_radians();
    let delta_lon = (b.x() - a.x()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // rounding can push h a hair past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Distance from `a` to `b` under one of `geo`'s metric spaces, in metres
/// for the geographic metrics and in degrees for [`DistanceMetric::Euclidean`].
///
/// Used to cross-check [`haversine_km`], which works in kilometres:
///
/// ```rust
/// use spindex::distance::{DistanceMetric, distance_between, haversine_km};
/// use geo::Point;
///
/// let sf = Point::new(-122.4194, 37.7749);
/// let oakland = Point::new(-122.2712, 37.8044);
///
/// let metres = distance_between(&sf, &oakland, DistanceMetric::Haversine);
/// assert!((metres / 1_000.0 - haversine_km(&sf, &oakland)).abs() < 1e-3);
/// ```
pub fn distance_between(a: &Point, b: &Point, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Haversine => Haversine.distance(*a, *b),
        DistanceMetric::Geodesic => Geodesic.distance(*a, *b),
        DistanceMetric::Rhumb => Rhumb.distance(*a, *b),
        DistanceMetric::Euclidean => Euclidean.distance(*a, *b),
    }
}

/// Euclidean distance between two planar points.
#[inline]
pub fn planar_distance(a: &PlanarPoint, b: &PlanarPoint) -> f64 {
    a.distance(b)
}
