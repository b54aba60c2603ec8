//! Spatial Indexing Walkthrough
//!
//! Runs every section with the configuration given on the command line (a
//! `.json` file, or `.toml` with the `toml` feature) or with the defaults.
//!
//! ```text
//! RUST_LOG=info cargo run --example walkthrough -- walkthrough.json
//! ```

use spindex::{Config, Walkthrough};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=debug to see cell and disk details)
    env_logger::init();

    println!("=== Spatial Indexing Walkthrough ===\n");
    println!("A spatial index groups nearby data so proximity queries can skip");
    println!("most of the dataset instead of measuring every point.\n");

    let mut config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    if config.map.output.is_none() {
        config.map.output = Some(PathBuf::from("walkthrough_map.html"));
    }

    let report = Walkthrough::new(config.clone()).run()?;

    println!("1. Example Cell");
    println!("---------------");
    println!(
        "   ({}, {}) -> {} at resolution {}",
        report.example.coordinate.lat,
        report.example.coordinate.lon,
        report.example.cell,
        report.example.resolution
    );
    println!(
        "   {} boundary vertices, {} neighbours",
        report.example.vertex_count, report.example.neighbors
    );
    if let Some(path) = &config.map.output {
        println!("   Map written to {}\n", path.display());
    }

    println!("2. Great-Circle Search");
    println!("----------------------");
    let geo = &report.geo;
    println!(
        "   Exhaustive scan: {} of {} points within {} km ({} us)",
        geo.exhaustive_hits, geo.sample_size, geo.radius_km, geo.exhaustive_us
    );
    for grid in [&geo.h3, &geo.geohash] {
        println!(
            "   {} level {}: {} candidates, {} rings, agreement {:.2}%, recall {:.2}% ({} us)",
            grid.scheme,
            grid.level,
            grid.grid_hits,
            grid.rings,
            grid.comparison.agreement() * 100.0,
            grid.comparison.recall() * 100.0,
            grid.query_us
        );
    }
    println!();

    println!("3. Planar Trees");
    println!("---------------");
    for index in &report.planar.indexes {
        println!(
            "   {}: {} hits (build {} us, query {} us)",
            index.name, index.hits, index.build_us, index.query_us
        );
    }
    println!(
        "   Indexes {}\n",
        if report.planar.agree { "agree" } else { "DISAGREE" }
    );

    println!("Report:");
    println!("{}", report.to_json()?);

    Ok(())
}
