//! Opt-in validation for geographic inputs.
//!
//! The search routines never call these; they accept whatever they are given.
//! Configuration loading and the walkthrough use them to fail early.

use crate::error::{Result, SpindexError};
use geo::Point;

/// Checks that `point` is a usable longitude/latitude pair: both finite,
/// with `x` in `-180..=180` and `y` in `-90..=90`. The bounds are inclusive,
/// so both poles and the antimeridian pass.
///
/// ```
/// use spindex::validation::validate_geographic_point;
/// use geo::Point;
///
/// assert!(validate_geographic_point(&Point::new(180.0, -90.0)).is_ok());
/// // latitude and longitude swapped
/// assert!(validate_geographic_point(&Point::new(37.7749, -122.4194)).is_err());
/// ```
pub fn validate_geographic_point(point: &Point) -> Result<()> {
    let (lon, lat) = (point.x(), point.y());

    if !lon.is_finite() || !lat.is_finite() {
        return Err(SpindexError::InvalidInput(format!(
            "coordinate ({}, {}) is not finite",
            lon, lat
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(SpindexError::InvalidInput(format!(
            "longitude {} is outside -180..=180",
            lon
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(SpindexError::InvalidInput(format!(
            "latitude {} is outside -90..=90",
            lat
        )));
    }

    Ok(())
}

/// Checks every point, reporting the index of the first bad one.
pub fn validate_points(points: &[Point]) -> Result<()> {
    for (i, point) in points.iter().enumerate() {
        validate_geographic_point(point).map_err(|e| {
            SpindexError::InvalidInput(format!("point at index {}: {}", i, e))
        })?;
    }
    Ok(())
}

/// A search radius must be finite and strictly positive.
pub fn validate_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(SpindexError::InvalidInput(format!(
            "radius {} is not a positive finite number",
            radius
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_points() {
        assert!(validate_geographic_point(&Point::new(0.0, 0.0)).is_ok());
        assert!(validate_geographic_point(&Point::new(180.0, 90.0)).is_ok());
        assert!(validate_geographic_point(&Point::new(-180.0, -90.0)).is_ok());
    }

    #[test]
    fn test_invalid_points() {
        assert!(validate_geographic_point(&Point::new(180.1, 0.0)).is_err());
        assert!(validate_geographic_point(&Point::new(0.0, -90.5)).is_err());
        assert!(validate_geographic_point(&Point::new(f64::NAN, 0.0)).is_err());
        assert!(validate_geographic_point(&Point::new(0.0, f64::INFINITY)).is_err());
    }

    #[test]
    fn test_error_names_the_bad_axis() {
        let err = validate_geographic_point(&Point::new(37.7749, -122.4194)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: latitude -122.4194 is outside -90..=90"
        );

        let err = validate_geographic_point(&Point::new(181.0, 0.0)).unwrap_err();
        assert!(err.to_string().contains("longitude 181"));

        let err = validate_geographic_point(&Point::new(f64::NAN, 0.0)).unwrap_err();
        assert!(err.to_string().contains("not finite"));
    }

    #[test]
    fn test_validate_points_reports_index() {
        let points = vec![
            Point::new(-74.0, 40.7),
            Point::new(-73.9, 40.8),
            Point::new(999.0, 40.0),
        ];

        let err = validate_points(&points).unwrap_err();
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn test_validate_radius() {
        assert!(validate_radius(1.5).is_ok());
        assert!(validate_radius(0.0).is_err());
        assert!(validate_radius(-3.0).is_err());
        assert!(validate_radius(f64::NAN).is_err());
    }
}
