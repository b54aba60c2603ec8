//! Walkthrough configuration.
//!
//! Every field has a default, so an empty JSON object (or TOML document) is a
//! valid configuration. Unknown fields are rejected.

use crate::error::{Result, SpindexError};
use crate::validation::{validate_geographic_point, validate_radius};
use serde::{Deserialize, Serialize};
use spindex_types::bbox::BoundingBox;
use spindex_types::point::{GeoCoord, PlanarPoint};
use std::path::{Path, PathBuf};

/// Top-level configuration for a walkthrough run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Seed for the random datasets; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Number of random geographic points
    #[serde(default = "Config::default_sample_size")]
    pub sample_size: usize,

    /// Window the geographic points are drawn from
    #[serde(default = "Config::default_bbox")]
    pub bbox: BoundingBox,

    /// The "points near a target" centre, also the example coordinate
    #[serde(default = "Config::default_target")]
    pub target: GeoCoord,

    #[serde(default = "Config::default_radius_km")]
    pub radius_km: f64,

    #[serde(default = "Config::default_h3_resolution")]
    pub h3_resolution: u8,

    #[serde(default = "Config::default_geohash_precision")]
    pub geohash_precision: usize,

    #[serde(default)]
    pub planar: PlanarConfig,

    #[serde(default)]
    pub map: MapConfig,
}

/// Settings for the planar tree comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanarConfig {
    #[serde(default = "PlanarConfig::default_sample_size")]
    pub sample_size: usize,

    /// Points are drawn from `[0, extent)` on both axes
    #[serde(default = "PlanarConfig::default_extent")]
    pub extent: f64,

    #[serde(default = "PlanarConfig::default_center")]
    pub center: PlanarPoint,

    #[serde(default = "PlanarConfig::default_radius")]
    pub radius: f64,
}

impl PlanarConfig {
    const fn default_sample_size() -> usize {
        10_000
    }

    const fn default_extent() -> f64 {
        1_000.0
    }

    const fn default_center() -> PlanarPoint {
        PlanarPoint::new(500.0, 500.0)
    }

    const fn default_radius() -> f64 {
        50.0
    }
}

impl Default for PlanarConfig {
    fn default() -> Self {
        Self {
            sample_size: Self::default_sample_size(),
            extent: Self::default_extent(),
            center: Self::default_center(),
            radius: Self::default_radius(),
        }
    }
}

/// Settings for the rendered map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapConfig {
    #[serde(default = "MapConfig::default_zoom")]
    pub zoom: u8,

    /// Rings of neighbouring cells drawn around the example cell
    #[serde(default = "MapConfig::default_neighbor_rings")]
    pub neighbor_rings: u32,

    /// Where to write the HTML page; nothing is written when absent
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl MapConfig {
    const fn default_zoom() -> u8 {
        13
    }

    const fn default_neighbor_rings() -> u32 {
        1
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: Self::default_zoom(),
            neighbor_rings: Self::default_neighbor_rings(),
            output: None,
        }
    }
}

impl Config {
    const fn default_sample_size() -> usize {
        100_000
    }

    const fn default_target() -> GeoCoord {
        GeoCoord::new(37.7749, -122.4194)
    }

    fn default_bbox() -> BoundingBox {
        BoundingBox::around(Self::default_target(), 1.0)
    }

    const fn default_radius_km() -> f64 {
        10.0
    }

    const fn default_h3_resolution() -> u8 {
        7
    }

    const fn default_geohash_precision() -> usize {
        6
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        if sample_size > 5_000_000 {
            log::warn!(
                "Sample size of {} makes the exhaustive scan slow and holds every point in memory",
                sample_size
            );
        }
        self.sample_size = sample_size;
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = bbox;
        self
    }

    pub fn with_target(mut self, target: GeoCoord) -> Self {
        self.target = target;
        self
    }

    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        assert!(radius_km > 0.0, "Radius must be greater than zero");
        self.radius_km = radius_km;
        self
    }

    pub fn with_h3_resolution(mut self, resolution: u8) -> Self {
        self.h3_resolution = resolution;
        self
    }

    pub fn with_geohash_precision(mut self, precision: usize) -> Self {
        self.geohash_precision = precision;
        self
    }

    pub fn with_planar(mut self, planar: PlanarConfig) -> Self {
        self.planar = planar;
        self
    }

    pub fn with_map(mut self, map: MapConfig) -> Self {
        self.map = map;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_geographic_point(&self.target.to_point())
            .map_err(|e| SpindexError::Config(format!("target: {}", e)))?;
        validate_radius(self.radius_km)
            .map_err(|e| SpindexError::Config(format!("radius_km: {}", e)))?;

        if !self.bbox.is_ordered() {
            return Err(SpindexError::Config(format!(
                "bbox minimums must not exceed maximums: {:?}",
                self.bbox
            )));
        }
        for corner in [
            GeoCoord::new(self.bbox.min_lat, self.bbox.min_lon),
            GeoCoord::new(self.bbox.max_lat, self.bbox.max_lon),
        ] {
            validate_geographic_point(&corner.to_point())
                .map_err(|e| SpindexError::Config(format!("bbox: {}", e)))?;
        }

        if self.h3_resolution > 15 {
            return Err(SpindexError::Config(format!(
                "h3_resolution must be in 0..=15, got {}",
                self.h3_resolution
            )));
        }
        if !(1..=12).contains(&self.geohash_precision) {
            return Err(SpindexError::Config(format!(
                "geohash_precision must be in 1..=12, got {}",
                self.geohash_precision
            )));
        }

        if !self.planar.extent.is_finite() || self.planar.extent <= 0.0 {
            return Err(SpindexError::Config(format!(
                "planar.extent must be positive, got {}",
                self.planar.extent
            )));
        }
        validate_radius(self.planar.radius)
            .map_err(|e| SpindexError::Config(format!("planar.radius: {}", e)))?;

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| SpindexError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SpindexError::Config(e.to_string()))
    }

    /// Load from a `.json` or `.toml` file, picked by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            #[cfg(feature = "toml")]
            Some("toml") => Self::from_toml(&contents),
            other => Err(SpindexError::Config(format!(
                "unsupported config file extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            sample_size: Self::default_sample_size(),
            bbox: Self::default_bbox(),
            target: Self::default_target(),
            radius_km: Self::default_radius_km(),
            h3_resolution: Self::default_h3_resolution(),
            geohash_precision: Self::default_geohash_precision(),
            planar: PlanarConfig::default(),
            map: MapConfig::default(),
        }
    }
}
