//! Uniformly random sample data.
//!
//! Datasets are regenerated on every run. Pass a seed to make a run
//! reproducible; without one the generator is seeded from OS entropy.

use geo::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spindex_types::bbox::BoundingBox;
use spindex_types::point::PlanarPoint;

/// A `StdRng` seeded from `seed`, or from entropy when `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// `n` points drawn uniformly in latitude and longitude from `bbox`.
///
/// Uniform in degrees, not in area: near the poles points bunch up.
///
/// # Examples
///
/// ```rust
/// use spindex::dataset::{random_geo_points, seeded_rng};
/// use spindex_types::bbox::BoundingBox;
///
/// let bbox = BoundingBox::new(37.0, -123.0, 38.0, -122.0);
/// let points = random_geo_points(100, &bbox, &mut seeded_rng(Some(7)));
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|p| bbox.contains_point(p)));
/// ```
pub fn random_geo_points<R: Rng + ?Sized>(
    n: usize,
    bbox: &BoundingBox,
    rng: &mut R,
) -> Vec<Point> {
    (0..n)
        .map(|_| {
            let lat = uniform(rng, bbox.min_lat, bbox.max_lat);
            let lon = uniform(rng, bbox.min_lon, bbox.max_lon);
            Point::new(lon, lat)
        })
        .collect()
}

/// `n` planar points drawn uniformly from `[0, extent)` on both axes.
pub fn random_planar_points<R: Rng + ?Sized>(
    n: usize,
    extent: f64,
    rng: &mut R,
) -> Vec<PlanarPoint> {
    (0..n)
        .map(|_| PlanarPoint::new(uniform(rng, 0.0, extent), uniform(rng, 0.0, extent)))
        .collect()
}

// gen_range panics on an empty range
fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if low < high {
        rng.gen_range(low..high)
    } else {
        low
    }
}
