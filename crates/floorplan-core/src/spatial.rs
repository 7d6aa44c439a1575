use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};

use crate::geometry::{BBox, Point};
use crate::model::PlacementId;

/// What a hit-test entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKey {
    Equipment(PlacementId),
    Rack(PlacementId),
}

/// An entry in the R-tree, referencing a marker by its placement id.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    pub key: MarkerKey,
    /// Canvas-space footprint of the marker.
    pub bbox: BBox,
    /// Paint order; higher values are drawn on top.
    pub z: usize,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

impl PointDistance for SpatialEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.envelope().contains_point(point)
    }
}

/// Spatial index for pointer hit tests over markers.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build the index from marker footprints.
    pub fn build(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn insert(&mut self, entry: SpatialEntry) {
        self.tree.insert(entry);
    }

    /// All entries whose footprint contains the point.
    pub fn query_point(&self, point: &Point) -> Vec<&SpatialEntry> {
        self.tree.locate_all_at_point(&[point.x, point.y]).collect()
    }

    /// The topmost marker under the point.
    pub fn topmost_at(&self, point: &Point) -> Option<MarkerKey> {
        self.tree
            .locate_all_at_point(&[point.x, point.y])
            .max_by_key(|e| e.z)
            .map(|e| e.key)
    }

    /// Entries intersecting a canvas-space region.
    pub fn query_region(&self, region: &BBox) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners(
            [region.min.x, region.min.y],
            [region.max.x, region.max.y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
