//! Tree indexes over planar points.
//!
//! Two off-the-shelf trees answer the same "points near a target" question on
//! a flat plane, next to a brute-force baseline:
//!
//! - [`RTreeIndex`]: an `rstar` R-tree, bulk loaded
//! - [`KdTreeIndex`]: a static `geo-index` KD-tree
//! - [`BruteForceIndex`]: checks every point
//!
//! Every index returns point indices sorted ascending, so results from
//! different indexes can be compared directly.
//!
//! ```rust
//! use spindex::planar::{KdTreeIndex, PlanarIndex, RTreeIndex};
//! use spindex_types::point::PlanarPoint;
//!
//! let points = vec![
//!     PlanarPoint::new(0.0, 0.0),
//!     PlanarPoint::new(1.0, 1.0),
//!     PlanarPoint::new(5.0, 5.0),
//! ];
//! let center = PlanarPoint::new(0.5, 0.5);
//!
//! let rtree = RTreeIndex::build(&points);
//! let kdtree = KdTreeIndex::build(&points)?;
//! assert_eq!(rtree.within_radius(&center, 1.0), vec![0, 1]);
//! assert_eq!(kdtree.within_radius(&center, 1.0), vec![0, 1]);
//! # Ok::<(), spindex::SpindexError>(())
//! ```

use crate::error::{Result, SpindexError};
use geo_index::kdtree::{KDTree, KDTreeBuilder, KDTreeIndex};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use spindex_types::point::PlanarPoint;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// A static index answering radius and box queries over planar points.
pub trait PlanarIndex {
    /// Short index name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices of points within `radius` of `center` (inclusive), ascending.
    fn within_radius(&self, center: &PlanarPoint, radius: f64) -> Vec<usize>;

    /// Indices of points inside the box spanned by `min` and `max`
    /// (inclusive), ascending. Corners given in the wrong order are swapped.
    fn within_box(&self, min: &PlanarPoint, max: &PlanarPoint) -> Vec<usize>;
}

/// R-tree over planar points, backed by `rstar`.
pub struct RTreeIndex {
    tree: RTree<IndexedPoint>,
}

impl RTreeIndex {
    /// Bulk load every point; the index of each point is its position in `points`.
    pub fn build(points: &[PlanarPoint]) -> Self {
        let items = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new(p.to_array(), i))
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    /// Index of the point closest to `center`, if any.
    pub fn nearest(&self, center: &PlanarPoint) -> Option<usize> {
        self.tree
            .nearest_neighbor(&center.to_array())
            .map(|item| item.data)
    }

    /// The `k` closest point indices, nearest first.
    pub fn nearest_k(&self, center: &PlanarPoint, k: usize) -> Vec<usize> {
        self.tree
            .nearest_neighbor_iter(&center.to_array())
            .take(k)
            .map(|item| item.data)
            .collect()
    }
}

impl PlanarIndex for RTreeIndex {
    fn name(&self) -> &'static str {
        "rtree"
    }

    fn len(&self) -> usize {
        self.tree.size()
    }

    fn within_radius(&self, center: &PlanarPoint, radius: f64) -> Vec<usize> {
        if !valid_radius(radius) {
            return Vec::new();
        }
        let mut hits: Vec<usize> = self
            .tree
            .locate_within_distance(center.to_array(), radius * radius)
            .map(|item| item.data)
            .collect();
        hits.sort_unstable();
        hits
    }

    fn within_box(&self, min: &PlanarPoint, max: &PlanarPoint) -> Vec<usize> {
        let Some((min, max)) = normalize_box(min, max) else {
            return Vec::new();
        };
        let envelope = AABB::from_corners(min.to_array(), max.to_array());
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|item| item.data)
            .collect();
        hits.sort_unstable();
        hits
    }
}

/// KD-tree over planar points, backed by `geo-index`.
pub struct KdTreeIndex {
    // geo-index cannot build a tree with zero items
    tree: Option<KDTree<f64>>,
    len: usize,
}

impl KdTreeIndex {
    /// Build the tree; the index of each point is its position in `points`.
    ///
    /// `geo-index` addresses items with `u32`, so more than `u32::MAX`
    /// points is an error.
    pub fn build(points: &[PlanarPoint]) -> Result<Self> {
        if points.is_empty() {
            return Ok(Self { tree: None, len: 0 });
        }

        let mut builder = KDTreeBuilder::<f64>::new(kdtree_capacity(points.len())?);
        for point in points {
            builder.add(point.x, point.y);
        }

        Ok(Self {
            tree: Some(builder.finish()),
            len: points.len(),
        })
    }
}

fn kdtree_capacity(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        SpindexError::InvalidInput(format!(
            "{} points exceed the KD-tree limit of {}",
            len,
            u32::MAX
        ))
    })
}

impl PlanarIndex for KdTreeIndex {
    fn name(&self) -> &'static str {
        "kdtree"
    }

    fn len(&self) -> usize {
        self.len
    }

    fn within_radius(&self, center: &PlanarPoint, radius: f64) -> Vec<usize> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        if !valid_radius(radius) {
            return Vec::new();
        }
        let mut hits: Vec<usize> = tree
            .within(center.x, center.y, radius)
            .into_iter()
            .map(|i| i as usize)
            .collect();
        hits.sort_unstable();
        hits
    }

    fn within_box(&self, min: &PlanarPoint, max: &PlanarPoint) -> Vec<usize> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        let Some((min, max)) = normalize_box(min, max) else {
            return Vec::new();
        };
        let mut hits: Vec<usize> = tree
            .range(min.x, min.y, max.x, max.y)
            .into_iter()
            .map(|i| i as usize)
            .collect();
        hits.sort_unstable();
        hits
    }
}

/// Linear scan baseline.
pub struct BruteForceIndex {
    points: Vec<PlanarPoint>,
}

impl BruteForceIndex {
    pub fn build(points: &[PlanarPoint]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl PlanarIndex for BruteForceIndex {
    fn name(&self) -> &'static str {
        "brute_force"
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn within_radius(&self, center: &PlanarPoint, radius: f64) -> Vec<usize> {
        brute_force_within(center, &self.points, radius)
    }

    fn within_box(&self, min: &PlanarPoint, max: &PlanarPoint) -> Vec<usize> {
        let Some((min, max)) = normalize_box(min, max) else {
            return Vec::new();
        };
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| (min.x..=max.x).contains(&p.x) && (min.y..=max.y).contains(&p.y))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Indices of points within `radius` of `center`, checking every point.
pub fn brute_force_within(
    center: &PlanarPoint,
    points: &[PlanarPoint],
    radius: f64,
) -> Vec<usize> {
    if !valid_radius(radius) {
        return Vec::new();
    }
    let max_squared = radius * radius;
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| center.distance_squared(p) <= max_squared)
        .map(|(i, _)| i)
        .collect()
}

fn valid_radius(radius: f64) -> bool {
    radius.is_finite() && radius >= 0.0
}

fn normalize_box(min: &PlanarPoint, max: &PlanarPoint) -> Option<(PlanarPoint, PlanarPoint)> {
    if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
        log::warn!("Rejecting bounding box query with non-finite coordinates");
        return None;
    }
    Some((
        PlanarPoint::new(min.x.min(max.x), min.y.min(max.y)),
        PlanarPoint::new(min.x.max(max.x), min.y.max(max.y)),
    ))
}
