//! # spindex-types
//!
//! Coordinate types shared by the spindex walkthrough.
//!
//! - **Point types**: `GeoCoord` (latitude/longitude degrees), `PlanarPoint` (x/y units)
//! - **Area types**: `BoundingBox` (a latitude/longitude window)
//!
//! All types are serializable with Serde and convert to and from the `geo`
//! crate's primitives, which use x = longitude and y = latitude.
//!
//! ## Examples
//!
//! ```rust
//! use spindex_types::point::GeoCoord;
//!
//! let sf = GeoCoord::new(37.7749, -122.4194);
//! let point = sf.to_point();
//! assert_eq!(point.x(), -122.4194);
//! assert_eq!(point.y(), 37.7749);
//! ```

pub mod bbox;
pub mod point;

pub use geo;
