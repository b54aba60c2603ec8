//! Web map rendering for cell boundaries.
//!
//! A [`MapView`] collects named polygon layers over a base map and renders
//! them either as a GeoJSON `FeatureCollection` or as a self-contained
//! Leaflet HTML page with one toggleable layer per polygon.
//!
//! ```rust
//! use spindex::grid::{CellGrid, H3Grid};
//! use spindex::map::MapView;
//! use spindex_types::point::GeoCoord;
//! use geo::Point;
//!
//! let grid = H3Grid::new(9)?;
//! let cell = grid.cell_for(&Point::new(-122.4194, 37.7749))?;
//!
//! let mut map = MapView::new(GeoCoord::new(37.7749, -122.4194), 14);
//! map.add_cell(&grid, &cell)?;
//!
//! let html = map.to_html()?;
//! assert!(html.contains("L.map"));
//! assert!(html.contains(&cell.to_string()));
//! # Ok::<(), spindex::SpindexError>(())
//! ```

use crate::error::Result;
use crate::grid::CellGrid;
use geo::{Centroid, Coord, LineString, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::Map;
use spindex_types::point::GeoCoord;
use std::path::Path;

const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";
const LEAFLET_VERSION: &str = "1.9.4";

/// Close a ring by repeating the first coordinate at the end if needed.
///
/// ```rust
/// use spindex::map::close_ring;
/// use geo::Coord;
///
/// let ring = close_ring(vec![
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 1.0, y: 0.0 },
///     Coord { x: 1.0, y: 1.0 },
/// ]);
/// assert_eq!(ring.len(), 4);
/// assert_eq!(ring.first(), ring.last());
/// ```
pub fn close_ring(mut coords: Vec<Coord>) -> Vec<Coord> {
    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied())
        && first != last
    {
        coords.push(first);
    }
    coords
}

/// One named polygon on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    pub name: String,
    pub polygon: Polygon,
}

/// A base map plus polygon layers.
#[derive(Debug, Clone)]
pub struct MapView {
    center: GeoCoord,
    zoom: u8,
    layers: Vec<MapLayer>,
}

impl MapView {
    pub fn new(center: GeoCoord, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            layers: Vec::new(),
        }
    }

    /// A map centred on the mean centroid of `polygons`, or `None` if there
    /// is nothing to centre on.
    pub fn centered_on(polygons: &[Polygon], zoom: u8) -> Option<Self> {
        mean_centroid(polygons.iter()).map(|center| Self::new(center, zoom))
    }

    pub fn center(&self) -> GeoCoord {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    /// Add a polygon as a named layer.
    pub fn add_polygon(&mut self, name: impl Into<String>, polygon: Polygon) -> &mut Self {
        self.layers.push(MapLayer {
            name: name.into(),
            polygon,
        });
        self
    }

    /// Add a polygon given as an ordered coordinate list; the ring is closed
    /// for you.
    pub fn add_ring(&mut self, name: impl Into<String>, coords: &[GeoCoord]) -> &mut Self {
        let ring = coords
            .iter()
            .map(|c| Coord { x: c.lon, y: c.lat })
            .collect();
        let polygon = Polygon::new(LineString::from(close_ring(ring)), vec![]);
        self.add_polygon(name, polygon)
    }

    /// Add the boundary of `cell` as a layer named after the cell.
    pub fn add_cell<G: CellGrid>(&mut self, grid: &G, cell: &G::Cell) -> Result<&mut Self> {
        let polygon = grid.boundary(cell)?;
        Ok(self.add_polygon(cell.to_string(), polygon))
    }

    /// Move the centre to the mean centroid of the current layers.
    pub fn recenter(&mut self) -> &mut Self {
        if let Some(center) = mean_centroid(self.layers.iter().map(|l| &l.polygon)) {
            self.center = center;
        }
        self
    }

    /// One feature per layer, with the layer name as a `name` property.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .layers
            .iter()
            .map(|layer| {
                let mut props = Map::new();
                props.insert(
                    "name".to_string(),
                    serde_json::Value::String(layer.name.clone()),
                );
                Feature {
                    bbox: None,
                    geometry: Some(polygon_geometry(&layer.polygon)),
                    id: None,
                    properties: Some(props),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_feature_collection())?)
    }

    /// A standalone Leaflet page: base tiles centred on the map centre, a
    /// GeoJSON overlay per layer, and a layer control to toggle them.
    pub fn to_html(&self) -> Result<String> {
        let mut overlays = String::new();
        for (layer, feature) in self
            .layers
            .iter()
            .zip(self.to_feature_collection().features)
        {
            overlays.push_str(&format!(
                "      overlays[{}] = L.geoJSON({}).addTo(map);\n",
                script_safe(&serde_json::to_string(&layer.name)?),
                script_safe(&serde_json::to_string(&feature)?),
            ));
        }

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>spindex map</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
    <style>html, body, #map {{ height: 100%; margin: 0; }}</style>
  </head>
  <body>
    <div id="map"></div>
    <script>
      var map = L.map("map").setView([{lat}, {lon}], {zoom});
      L.tileLayer("{tiles}", {{ attribution: "{attribution}" }}).addTo(map);
      var overlays = {{}};
{overlays}      L.control.layers(null, overlays).addTo(map);
    </script>
  </body>
</html>
"#,
            version = LEAFLET_VERSION,
            lat = self.center.lat,
            lon = self.center.lon,
            zoom = self.zoom,
            tiles = TILE_URL,
            attribution = TILE_ATTRIBUTION,
            overlays = overlays,
        ))
    }

    pub fn write_html(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_html()?)?;
        log::info!(
            "wrote map with {} layers to {}",
            self.layers.len(),
            path.display()
        );
        Ok(())
    }
}

fn polygon_geometry(polygon: &Polygon) -> Geometry {
    let mut rings: Vec<Vec<Vec<f64>>> = Vec::with_capacity(1 + polygon.interiors().len());
    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
        let coords = close_ring(ring.coords().copied().collect());
        rings.push(coords.iter().map(|c| vec![c.x, c.y]).collect());
    }
    Geometry::new(Value::Polygon(rings))
}

fn mean_centroid<'a>(polygons: impl Iterator<Item = &'a Polygon>) -> Option<GeoCoord> {
    let (mut sum_x, mut sum_y, mut count) = (0.0, 0.0, 0usize);
    for centroid in polygons.filter_map(|p| p.centroid()) {
        sum_x += centroid.x();
        sum_y += centroid.y();
        count += 1;
    }
    (count > 0).then(|| GeoCoord::new(sum_y / count as f64, sum_x / count as f64))
}

// keep embedded JSON from closing the surrounding <script> element
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GeohashGrid, H3Grid};
    use geo::{Point, polygon};

    fn square(offset: f64) -> Polygon {
        polygon![
            (x: offset, y: offset),
            (x: offset + 1.0, y: offset),
            (x: offset + 1.0, y: offset + 1.0),
            (x: offset, y: offset + 1.0),
        ]
    }

    #[test]
    fn test_close_ring() {
        let closed = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 0.0, y: 0.0 },
        ];
        assert_eq!(close_ring(closed.clone()), closed);
        assert!(close_ring(Vec::new()).is_empty());
    }

    #[test]
    fn test_add_ring_closes_polygon() {
        let mut map = MapView::new(GeoCoord::new(0.0, 0.0), 3);
        map.add_ring(
            "triangle",
            &[
                GeoCoord::new(0.0, 0.0),
                GeoCoord::new(0.0, 1.0),
                GeoCoord::new(1.0, 1.0),
            ],
        );
        let ring = &map.layers()[0].polygon.exterior().0;
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
        // longitude goes to x
        assert_eq!(ring[1], Coord { x: 1.0, y: 0.0 });
    }

    #[test]
    fn test_centered_on_mean_centroid() {
        let map = MapView::centered_on(&[square(0.0), square(2.0)], 10).unwrap();
        assert!((map.center().lat - 1.5).abs() < 1e-9);
        assert!((map.center().lon - 1.5).abs() < 1e-9);
        assert!(MapView::centered_on(&[], 10).is_none());
    }

    #[test]
    fn test_recenter() {
        let mut map = MapView::new(GeoCoord::new(50.0, 50.0), 4);
        map.recenter();
        assert_eq!(map.center(), GeoCoord::new(50.0, 50.0));

        map.add_polygon("a", square(10.0)).recenter();
        assert!((map.center().lat - 10.5).abs() < 1e-9);
        assert!((map.center().lon - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_feature_collection_has_named_layers() {
        let grid = H3Grid::new(8).unwrap();
        let center = Point::new(-122.4194, 37.7749);
        let cell = grid.cell_for(&center).unwrap();

        let mut map = MapView::new(GeoCoord::from(center), 12);
        for neighbor in grid.disk(&cell, 1).unwrap() {
            map.add_cell(&grid, &neighbor).unwrap();
        }

        let collection = map.to_feature_collection();
        assert_eq!(collection.features.len(), 7);
        for feature in &collection.features {
            let name = feature.property("name").and_then(|v| v.as_str()).unwrap();
            assert!(grid.parse_cell(name).is_ok());
            match &feature.geometry.as_ref().unwrap().value {
                Value::Polygon(rings) => {
                    assert_eq!(rings[0].first(), rings[0].last());
                }
                other => panic!("unexpected geometry {other:?}"),
            }
        }
    }

    #[test]
    fn test_html_has_layer_control_and_center() {
        let grid = GeohashGrid::new(6).unwrap();
        let cell = grid.cell_for(&Point::new(-74.0060, 40.7128)).unwrap();

        let mut map = MapView::new(GeoCoord::new(40.7128, -74.0060), 13);
        map.add_cell(&grid, &cell).unwrap();
        let html = map.to_html().unwrap();

        assert!(html.contains("setView([40.7128, -74.006], 13)"));
        assert!(html.contains("L.control.layers"));
        assert!(html.contains(&format!("overlays[\"{}\"]", cell)));
    }

    #[test]
    fn test_html_escapes_script_close() {
        let mut map = MapView::new(GeoCoord::new(0.0, 0.0), 2);
        map.add_polygon("</script><b>", square(0.0));
        let html = map.to_html().unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn test_write_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");
        let mut map = MapView::new(GeoCoord::new(0.0, 0.0), 2);
        map.add_polygon("square", square(0.0));
        map.write_html(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}
