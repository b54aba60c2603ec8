//! The end-to-end walkthrough.
//!
//! Runs each section in order and collects the numbers into a [`Report`]:
//!
//! 1. the cell of one example coordinate, its boundary and a map of it
//! 2. a random geographic dataset searched exhaustively and by grid
//!    membership, once with H3 and once with geohash
//! 3. a random planar dataset searched with an R-tree, a KD-tree and a
//!    brute-force scan
//!
//! ```rust
//! use spindex::{Config, Walkthrough};
//!
//! let config = Config::default().with_seed(1).with_sample_size(2_000);
//! let report = Walkthrough::new(config).run()?;
//!
//! assert_eq!(report.example.vertex_count, 7);
//! assert!(report.planar.agree);
//! # Ok::<(), spindex::SpindexError>(())
//! ```

use crate::config::Config;
use crate::dataset::{random_geo_points, random_planar_points, seeded_rng};
use crate::error::Result;
use crate::grid::{CellGrid, GeohashGrid, H3Grid};
use crate::map::MapView;
use crate::planar::{BruteForceIndex, KdTreeIndex, PlanarIndex, RTreeIndex};
use crate::search::{Comparison, assign_cells, compare, exhaustive_within, grid_within};
use geo::Point;
use serde::{Deserialize, Serialize};
use spindex_types::point::{GeoCoord, PlanarPoint};
use std::time::Instant;

/// The example cell drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleCell {
    pub coordinate: GeoCoord,
    pub resolution: u8,
    pub cell: String,
    /// Boundary vertices, closing vertex included.
    pub vertex_count: usize,
    pub neighbors: usize,
}

/// Exhaustive versus grid-membership search under one cell scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridReport {
    pub scheme: String,
    /// H3 resolution or geohash precision.
    pub level: usize,
    pub distinct_cells: usize,
    pub rings: u32,
    pub covering_cells: usize,
    pub exhaustive_hits: usize,
    pub grid_hits: usize,
    pub comparison: Comparison,
    pub assign_us: u64,
    pub query_us: u64,
}

/// The geographic half of the walkthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoReport {
    pub sample_size: usize,
    pub target: GeoCoord,
    pub radius_km: f64,
    pub exhaustive_hits: usize,
    pub exhaustive_us: u64,
    pub h3: GridReport,
    pub geohash: GridReport,
}

/// One planar index's answer and cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexReport {
    pub name: String,
    pub hits: usize,
    pub build_us: u64,
    pub query_us: u64,
}

/// The planar half of the walkthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarReport {
    pub sample_size: usize,
    pub center: PlanarPoint,
    pub radius: f64,
    pub indexes: Vec<IndexReport>,
    /// Whether every index returned the same point set.
    pub agree: bool,
}

/// Everything a walkthrough run measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub seed: Option<u64>,
    pub example: ExampleCell,
    pub geo: GeoReport,
    pub planar: PlanarReport,
}

impl Report {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Runs the walkthrough sections for one configuration.
pub struct Walkthrough {
    config: Config,
}

impl Walkthrough {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every section, writing the map when an output path is configured.
    pub fn run(&self) -> Result<Report> {
        self.config.validate()?;
        log::info!("spatial indexing walkthrough (seed: {:?})", self.config.seed);

        let example = self.example_cell()?;

        let map = self.build_map()?;
        if let Some(path) = &self.config.map.output {
            map.write_html(path)?;
        }

        let geo = self.geo_comparison()?;
        let planar = self.planar_comparison();

        Ok(Report {
            seed: self.config.seed,
            example,
            geo,
            planar,
        })
    }

    /// Section 1: the H3 cell of the target coordinate.
    pub fn example_cell(&self) -> Result<ExampleCell> {
        log::info!("== example cell ==");
        let grid = H3Grid::new(self.config.h3_resolution)?;
        let target = self.config.target.to_point();

        let cell = grid.cell_for(&target)?;
        let boundary = grid.boundary(&cell)?;
        let neighbors = grid.disk(&cell, 1)?.len().saturating_sub(1);

        log::info!(
            "({}, {}) at resolution {} is cell {} with {} boundary vertices",
            self.config.target.lat,
            self.config.target.lon,
            grid.resolution(),
            cell,
            boundary.exterior().0.len()
        );

        Ok(ExampleCell {
            coordinate: self.config.target,
            resolution: grid.resolution(),
            cell: cell.to_string(),
            vertex_count: boundary.exterior().0.len(),
            neighbors,
        })
    }

    /// The example cell, its neighbouring rings and the geohash cell of the
    /// same coordinate, one layer each, centred on their mean centroid.
    pub fn build_map(&self) -> Result<MapView> {
        let h3 = H3Grid::new(self.config.h3_resolution)?;
        let geohash = GeohashGrid::new(self.config.geohash_precision)?;
        let target = self.config.target.to_point();

        let mut map = MapView::new(self.config.target, self.config.map.zoom);

        let origin = h3.cell_for(&target)?;
        map.add_cell(&h3, &origin)?;

        let mut ring_cells: Vec<_> = h3
            .disk(&origin, self.config.map.neighbor_rings)?
            .into_iter()
            .filter(|cell| *cell != origin)
            .collect();
        // stable layer order across runs
        ring_cells.sort_unstable();
        for cell in &ring_cells {
            map.add_cell(&h3, cell)?;
        }

        let hash = geohash.cell_for(&target)?;
        map.add_cell(&geohash, &hash)?;

        map.recenter();
        Ok(map)
    }

    /// Section 2: exhaustive versus grid-membership search on the sphere.
    pub fn geo_comparison(&self) -> Result<GeoReport> {
        log::info!("== great-circle search: exhaustive vs grid membership ==");
        let mut rng = seeded_rng(self.config.seed);
        let points = random_geo_points(self.config.sample_size, &self.config.bbox, &mut rng);
        let target = self.config.target.to_point();
        let radius_km = self.config.radius_km;

        let start = Instant::now();
        let exact = exhaustive_within(&target, &points, radius_km);
        let exhaustive_us = micros(start);
        log::info!(
            "exhaustive: {} of {} points within {} km ({} us)",
            exact.len(),
            points.len(),
            radius_km,
            exhaustive_us
        );

        let h3 = H3Grid::new(self.config.h3_resolution)?;
        let level = usize::from(h3.resolution());
        let h3_report = grid_report(&h3, level, &points, &target, radius_km, &exact)?;

        let geohash = GeohashGrid::new(self.config.geohash_precision)?;
        let geohash_report =
            grid_report(&geohash, geohash.precision(), &points, &target, radius_km, &exact)?;

        Ok(GeoReport {
            sample_size: points.len(),
            target: self.config.target,
            radius_km,
            exhaustive_hits: exact.len(),
            exhaustive_us,
            h3: h3_report,
            geohash: geohash_report,
        })
    }

    /// Section 3: tree indexes on the plane.
    pub fn planar_comparison(&self) -> PlanarReport {
        log::info!("== planar search: R-tree vs KD-tree ==");
        let planar = &self.config.planar;
        // separate stream from the geographic dataset
        let seed = self.config.seed.map(|s| s.wrapping_add(1));
        let mut rng = seeded_rng(seed);
        let points = random_planar_points(planar.sample_size, planar.extent, &mut rng);

        let indexes = [
            timed_build(|| Ok(RTreeIndex::build(&points)))?,
            timed_build(|| KdTreeIndex::build(&points))?,
            timed_build(|| Ok(BruteForceIndex::build(&points)))?,
        ];

        let mut reports = Vec::with_capacity(indexes.len());
        let mut answers: Vec<Vec<usize>> = Vec::with_capacity(indexes.len());
        for (index, build_us) in indexes {
            let start = Instant::now();
            let hits = index.within_radius(&planar.center, planar.radius);
            let query_us = micros(start);

            log::info!(
                "{}: {} points within {} of ({}, {}) (build {} us, query {} us)",
                index.name(),
                hits.len(),
                planar.radius,
                planar.center.x,
                planar.center.y,
                build_us,
                query_us
            );

            reports.push(IndexReport {
                name: index.name().to_string(),
                hits: hits.len(),
                build_us,
                query_us,
            });
            answers.push(hits);
        }

        let agree = answers.windows(2).all(|pair| pair[0] == pair[1]);
        if !agree {
            log::warn!("planar indexes disagree on the radius query");
        }

        PlanarReport {
            sample_size: points.len(),
            center: planar.center,
            radius: planar.radius,
            indexes: reports,
            agree,
        }
    }
}

fn grid_report<G: CellGrid>(
    grid: &G,
    level: usize,
    points: &[Point],
    target: &Point,
    radius_km: f64,
    exact: &[usize],
) -> Result<GridReport> {
    let start = Instant::now();
    let assignment = assign_cells(grid, points)?;
    let assign_us = micros(start);

    let start = Instant::now();
    let hits = grid_within(grid, &assignment, target, radius_km)?;
    let query_us = micros(start);

    let comparison = compare(exact, &hits.indices, points.len());
    log::info!(
        "{} level {}: {} candidates from {} cells in {} rings, agreement {:.4}, recall {:.4}",
        grid.name(),
        level,
        hits.indices.len(),
        hits.covering_cells,
        hits.rings,
        comparison.agreement(),
        comparison.recall()
    );

    Ok(GridReport {
        scheme: grid.name().to_string(),
        level,
        distinct_cells: assignment.distinct_cells(),
        rings: hits.rings,
        covering_cells: hits.covering_cells,
        exhaustive_hits: exact.len(),
        grid_hits: hits.indices.len(),
        comparison,
        assign_us,
        query_us,
    })
}

fn timed_build<I: PlanarIndex + 'static>(
    build: impl FnOnce() -> Result<I>,
) -> Result<(Box<dyn PlanarIndex>, u64)> {
    let start = Instant::now();
    let index = build()?;
    Ok((Box::new(index), micros(start)))
}

fn micros(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::error::SpindexError;
    use spindex_types::bbox::BoundingBox;

    fn small_config() -> Config {
        Config::default()
            .with_seed(42)
            .with_sample_size(5_000)
            .with_radius_km(5.0)
    }

    #[test]
    fn test_run_is_reproducible_with_seed() {
        let a = Walkthrough::new(small_config()).run().unwrap();
        let b = Walkthrough::new(small_config()).run().unwrap();

        assert_eq!(a.example, b.example);
        assert_eq!(a.geo.exhaustive_hits, b.geo.exhaustive_hits);
        assert_eq!(a.geo.h3.comparison, b.geo.h3.comparison);
        assert_eq!(a.geo.geohash.comparison, b.geo.geohash.comparison);
        assert_eq!(a.planar.indexes[0].hits, b.planar.indexes[0].hits);
    }

    #[test]
    fn test_run_report_contents() {
        let report = Walkthrough::new(small_config()).run().unwrap();

        assert_eq!(report.seed, Some(42));
        assert_eq!(report.example.resolution, 7);
        assert_eq!(report.example.vertex_count, 7);
        assert_eq!(report.example.neighbors, 6);

        assert_eq!(report.geo.sample_size, 5_000);
        assert_eq!(report.geo.h3.scheme, "h3");
        assert_eq!(report.geo.geohash.scheme, "geohash");
        for grid in [&report.geo.h3, &report.geo.geohash] {
            assert!(grid.comparison.agreement() >= 0.9, "{:?}", grid);
            assert!(grid.comparison.recall() >= 0.99, "{:?}", grid);
            assert!(grid.grid_hits >= report.geo.exhaustive_hits);
        }

        let names: Vec<_> = report.planar.indexes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["rtree", "kdtree", "brute_force"]);
        assert!(report.planar.agree);
    }

    #[test]
    fn test_run_high_latitude() {
        let target = GeoCoord::new(64.70, 10.54);
        let config = Config::default()
            .with_seed(1)
            .with_sample_size(20_000)
            .with_target(target)
            .with_bbox(BoundingBox::around(target, 1.0))
            .with_radius_km(50.0);
        let report = Walkthrough::new(config).run().unwrap();

        assert!(report.geo.exhaustive_hits > 1_000);
        for grid in [&report.geo.h3, &report.geo.geohash] {
            assert!(grid.comparison.agreement() >= 0.9, "{:?}", grid);
            assert!(grid.comparison.recall() >= 0.99, "{:?}", grid);
            assert!(grid.comparison.jaccard() >= 0.8, "{:?}", grid);
        }
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let config = Config::default().with_h3_resolution(20);
        assert!(matches!(
            Walkthrough::new(config).run(),
            Err(SpindexError::Config(_))
        ));
    }

    #[test]
    fn test_empty_datasets() {
        let mut config = small_config().with_sample_size(0);
        config.planar.sample_size = 0;

        let report = Walkthrough::new(config).run().unwrap();
        assert_eq!(report.geo.exhaustive_hits, 0);
        assert_eq!(report.geo.h3.grid_hits, 0);
        assert_eq!(report.geo.h3.comparison.agreement(), 1.0);
        assert!(report.planar.agree);
        assert!(report.planar.indexes.iter().all(|i| i.hits == 0));
    }

    #[test]
    fn test_build_map_layers() {
        let map = Walkthrough::new(small_config()).build_map().unwrap();
        // origin, six neighbours, one geohash cell
        assert_eq!(map.layers().len(), 8);

        let center = map.center();
        let target = small_config().target;
        assert!((center.lat - target.lat).abs() < 0.05);
        assert!((center.lon - target.lon).abs() < 0.05);
    }

    #[test]
    fn test_run_writes_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");
        let config = small_config().with_map(MapConfig {
            output: Some(path.clone()),
            ..MapConfig::default()
        });

        Walkthrough::new(config).run().unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("L.control.layers"));
    }

    #[test]
    fn test_report_serializes() {
        let report = Walkthrough::new(small_config().with_sample_size(100))
            .run()
            .unwrap();
        let json = report.to_json().unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.example.cell, report.example.cell);
        assert_eq!(parsed.geo.h3.comparison, report.geo.h3.comparison);
        assert_eq!(parsed.planar.indexes.len(), 3);
    }
}
