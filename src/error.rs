//! Error types for spindex.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpindexError>;

#[derive(Debug, Error)]
pub enum SpindexError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid H3 resolution {0}, expected 0..=15")]
    InvalidResolution(u8),

    #[error("Invalid geohash precision {0}, expected 1..=12")]
    InvalidPrecision(usize),

    #[error("Cell operation failed: {0}")]
    Cell(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<h3o::error::InvalidLatLng> for SpindexError {
    fn from(err: h3o::error::InvalidLatLng) -> Self {
        SpindexError::InvalidInput(err.to_string())
    }
}

impl From<geohash::GeohashError> for SpindexError {
    fn from(err: geohash::GeohashError) -> Self {
        SpindexError::Cell(err.to_string())
    }
}
