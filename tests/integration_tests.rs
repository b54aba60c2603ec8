use spindex::dataset::{random_geo_points, random_planar_points, seeded_rng};
use spindex::distance::MAX_GREAT_CIRCLE_KM;
use spindex::grid::{CellGrid, GeohashGrid, H3Grid};
use spindex::map::MapView;
use spindex::planar::{BruteForceIndex, KdTreeIndex, PlanarIndex, RTreeIndex, brute_force_within};
use spindex::search::{assign_cells, compare, exhaustive_within, grid_within};
use spindex::{
    BoundingBox, Config, DistanceMetric, GeoCoord, PlanarPoint, Point, Walkthrough,
    distance_between, haversine_km,
};
use tempfile::TempDir;

#[test]
fn test_haversine_known_distances() {
    let sf = Point::new(-122.4194, 37.7749);
    assert_eq!(haversine_km(&sf, &sf), 0.0);

    let d = haversine_km(&Point::new(0.0, 0.0), &Point::new(180.0, 0.0));
    assert!((d - 20_015.0).abs() < 1.0, "antipodal distance was {}", d);

    // NYC to London, about 5570 km
    let nyc = Point::new(-74.0060, 40.7128);
    let london = Point::new(-0.1278, 51.5074);
    let d = haversine_km(&nyc, &london);
    assert!((d - 5_570.0).abs() < 10.0, "NYC-London was {}", d);
}

#[test]
fn test_haversine_properties_on_random_points() {
    let points = random_geo_points(500, &BoundingBox::world(), &mut seeded_rng(Some(99)));

    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ab = haversine_km(a, b);
        let ba = haversine_km(b, a);

        assert!((ab - ba).abs() < 1e-9);
        assert!(ab >= 0.0);
        assert!(ab <= MAX_GREAT_CIRCLE_KM + 1e-9);
        assert_eq!(haversine_km(a, a), 0.0);
    }
}

#[test]
fn test_haversine_matches_geo() {
    let points = random_geo_points(200, &BoundingBox::world(), &mut seeded_rng(Some(5)));

    for pair in points.windows(2) {
        let ours = haversine_km(&pair[0], &pair[1]);
        let theirs = distance_between(&pair[0], &pair[1], DistanceMetric::Haversine) / 1_000.0;
        assert!(
            (ours - theirs).abs() <= 1e-6 * ours.max(1.0),
            "{} vs {}",
            ours,
            theirs
        );
    }
}

#[test]
fn test_grid_search_pipeline_london() {
    let center = GeoCoord::new(51.5074, -0.1278);
    let bbox = BoundingBox::around(center, 0.5);
    let points = random_geo_points(20_000, &bbox, &mut seeded_rng(Some(31)));
    let target = center.to_point();

    let exact = exhaustive_within(&target, &points, 5.0);
    assert!(!exact.is_empty());
    assert!(
        exact
            .iter()
            .all(|&i| haversine_km(&target, &points[i]) <= 5.0)
    );

    let h3 = H3Grid::new(7).unwrap();
    let h3_cells = assign_cells(&h3, &points).unwrap();
    let h3_hits = grid_within(&h3, &h3_cells, &target, 5.0).unwrap();
    let h3_cmp = compare(&exact, &h3_hits.indices, points.len());
    assert!(h3_cmp.agreement() >= 0.9, "{:?}", h3_cmp);
    assert!(h3_cmp.recall() >= 0.99, "{:?}", h3_cmp);

    let geohash = GeohashGrid::new(6).unwrap();
    let gh_cells = assign_cells(&geohash, &points).unwrap();
    let gh_hits = grid_within(&geohash, &gh_cells, &target, 5.0).unwrap();
    let gh_cmp = compare(&exact, &gh_hits.indices, points.len());
    assert!(gh_cmp.agreement() >= 0.9, "{:?}", gh_cmp);
    assert!(gh_cmp.recall() >= 0.99, "{:?}", gh_cmp);

    // grid membership over-approximates rather than corrects
    assert!(h3_hits.indices.len() >= exact.len());
    assert!(gh_hits.indices.len() >= exact.len());
}

/// Grid search keeps every point inside the radius wherever the target sits,
/// including high latitudes where H3 cells are much smaller than average and
/// geohash cells are narrow.
#[test]
fn test_grid_search_recall_across_latitudes() {
    let h3 = H3Grid::new(7).unwrap();
    let geohash = GeohashGrid::new(6).unwrap();

    for (lat, lon, radius_km) in [
        (0.0, 0.0, 50.0),
        (0.0, 0.0, 100.0),
        (60.0, 25.0, 50.0),
        (64.70, 10.54, 50.0),
        (-41.3, 174.8, 40.0),
    ] {
        let center = GeoCoord::new(lat, lon);
        let bbox = BoundingBox::around(center, 1.0);
        let points = random_geo_points(20_000, &bbox, &mut seeded_rng(Some(61)));
        let target = center.to_point();
        let exact = exhaustive_within(&target, &points, radius_km);
        assert!(!exact.is_empty());

        let h3_cells = assign_cells(&h3, &points).unwrap();
        let h3_hits = grid_within(&h3, &h3_cells, &target, radius_km).unwrap();
        let h3_cmp = compare(&exact, &h3_hits.indices, points.len());
        assert!(h3_cmp.recall() >= 0.99, "h3 at {lat},{lon} r={radius_km}: {h3_cmp:?}");
        assert!(h3_cmp.agreement() >= 0.9, "h3 at {lat},{lon} r={radius_km}: {h3_cmp:?}");

        let gh_cells = assign_cells(&geohash, &points).unwrap();
        let gh_hits = grid_within(&geohash, &gh_cells, &target, radius_km).unwrap();
        let gh_cmp = compare(&exact, &gh_hits.indices, points.len());
        assert!(gh_cmp.recall() >= 0.99, "geohash at {lat},{lon} r={radius_km}: {gh_cmp:?}");
        assert!(gh_cmp.agreement() >= 0.9, "geohash at {lat},{lon} r={radius_km}: {gh_cmp:?}");
    }
}

#[test]
fn test_finer_resolution_tightens_grid_search() {
    let center = GeoCoord::new(37.7749, -122.4194);
    let bbox = BoundingBox::around(center, 0.3);
    let points = random_geo_points(20_000, &bbox, &mut seeded_rng(Some(8)));
    let target = center.to_point();
    let exact = exhaustive_within(&target, &points, 3.0);

    let false_positives = |resolution: u8| {
        let grid = H3Grid::new(resolution).unwrap();
        let cells = assign_cells(&grid, &points).unwrap();
        let hits = grid_within(&grid, &cells, &target, 3.0).unwrap();
        compare(&exact, &hits.indices, points.len()).false_positives
    };

    assert!(false_positives(9) < false_positives(6));
}

#[test]
fn test_boundaries_are_idempotent() {
    let point = Point::new(-74.0060, 40.7128);

    let h3 = H3Grid::new(9).unwrap();
    let cell = h3.cell_for(&point).unwrap();
    assert_eq!(h3.boundary(&cell).unwrap(), h3.boundary(&cell).unwrap());

    let geohash = GeohashGrid::new(8).unwrap();
    let hash = geohash.cell_for(&point).unwrap();
    assert_eq!(
        geohash.boundary(&hash).unwrap(),
        geohash.boundary(&hash).unwrap()
    );
}

#[test]
fn test_planar_trees_agree() {
    let mut rng = seeded_rng(Some(17));
    let points = random_planar_points(20_000, 1_000.0, &mut rng);
    let centers = random_planar_points(25, 1_000.0, &mut rng);

    let indexes: Vec<Box<dyn PlanarIndex>> = vec![
        Box::new(RTreeIndex::build(&points)),
        Box::new(KdTreeIndex::build(&points).unwrap()),
        Box::new(BruteForceIndex::build(&points)),
    ];

    for center in &centers {
        for radius in [0.0, 10.0, 75.0] {
            let expected = brute_force_within(center, &points, radius);
            for index in &indexes {
                assert_eq!(
                    index.within_radius(center, radius),
                    expected,
                    "{} radius {}",
                    index.name(),
                    radius
                );
            }
        }

        let min = PlanarPoint::new(center.x - 40.0, center.y - 25.0);
        let max = PlanarPoint::new(center.x + 40.0, center.y + 25.0);
        let expected = indexes[2].within_box(&min, &max);
        for index in &indexes {
            assert_eq!(index.within_box(&min, &max), expected, "{}", index.name());
        }
    }
}

#[test]
fn test_rtree_nearest_matches_brute_force() {
    let mut rng = seeded_rng(Some(23));
    let points = random_planar_points(2_000, 100.0, &mut rng);
    let rtree = RTreeIndex::build(&points);

    for center in random_planar_points(20, 100.0, &mut rng) {
        let nearest = rtree.nearest(&center).unwrap();
        let best = points
            .iter()
            .map(|p| center.distance(p))
            .fold(f64::INFINITY, f64::min);
        assert_eq!(center.distance(&points[nearest]), best);
    }
}

#[test]
fn test_map_with_cell_disk() {
    let h3 = H3Grid::new(8).unwrap();
    let origin = h3.cell_for(&Point::new(-122.4194, 37.7749)).unwrap();
    let disk = h3.disk(&origin, 1).unwrap();

    let polygons: Vec<_> = disk.iter().map(|c| h3.boundary(c).unwrap()).collect();
    let mut map = MapView::centered_on(&polygons, 14).unwrap();
    for cell in &disk {
        map.add_cell(&h3, cell).unwrap();
    }

    let collection = map.to_feature_collection();
    assert_eq!(collection.features.len(), 7);

    let html = map.to_html().unwrap();
    for cell in &disk {
        assert!(html.contains(&cell.to_string()));
    }
}

#[test]
fn test_walkthrough_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("walkthrough.json");
    let map_path = dir.path().join("map.html");

    let json = serde_json::json!({
        "seed": 12,
        "sample_size": 3000,
        "radius_km": 4.0,
        "h3_resolution": 8,
        "planar": { "sample_size": 2000, "radius": 30.0 },
        "map": { "zoom": 15, "output": map_path },
    });
    std::fs::write(&config_path, json.to_string()).unwrap();

    let config = Config::from_file(&config_path).unwrap();
    let report = Walkthrough::new(config).run().unwrap();

    assert_eq!(report.seed, Some(12));
    assert_eq!(report.example.resolution, 8);
    assert_eq!(report.geo.sample_size, 3000);
    assert_eq!(report.planar.sample_size, 2000);
    assert!(report.planar.agree);
    assert!(report.geo.h3.comparison.agreement() >= 0.9);

    let html = std::fs::read_to_string(&map_path).unwrap();
    assert!(html.contains(&report.example.cell));
    assert!(html.contains("], 15)"));
}
