//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries for:
//! - Point hit testing against node boxes
//! - Rectangle intersection

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geometry::{Rect, Vec2};
use crate::graph::NodeId;

/// A node box in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRect {
    /// The node identifier.
    pub id: NodeId,
    /// Box in model space.
    pub rect: Rect,
}

impl NodeRect {
    pub fn new(id: NodeId, rect: Rect) -> Self {
        Self { id, rect }
    }
}

impl RTreeObject for NodeRect {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        let min = self.rect.min();
        let max = self.rect.max();
        AABB::from_corners([min.x, min.y], [max.x, max.y])
    }
}

impl PointDistance for NodeRect {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.envelope().distance_2(point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.rect.contains(Vec2::new(point[0], point[1]))
    }
}

/// Spatial index over node boxes.
///
/// Uses an R*-tree. Rebuilt in bulk after each full layout pass.
pub struct SpatialIndex {
    tree: RTree<NodeRect>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Topmost node whose box contains `point`.
    ///
    /// Layout never overlaps boxes; if a caller's boxes do overlap, the lowest
    /// id wins so the answer is deterministic.
    pub fn hit_test(&self, point: Vec2) -> Option<NodeId> {
        self.tree
            .locate_all_at_point(&[point.x, point.y])
            .map(|entry| entry.id)
            .min()
    }

    /// All nodes whose boxes intersect `rect`.
    pub fn in_rect(&self, rect: Rect) -> Vec<NodeId> {
        let min = rect.min();
        let max = rect.max();
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.id)
            .collect()
    }

    /// Rebuild the index from node boxes.
    ///
    /// This is more efficient than incremental inserts for bulk updates.
    pub fn rebuild(&mut self, rects: Vec<NodeRect>) {
        self.tree = RTree::bulk_load(rects);
    }

    /// Clear all nodes from the index.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
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

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild(vec![
            NodeRect::new(NodeId(0), Rect::new(-50.0, -20.0, 100.0, 40.0)),
            NodeRect::new(NodeId(1), Rect::new(90.0, -60.0, 60.0, 30.0)),
            NodeRect::new(NodeId(2), Rect::new(90.0, 30.0, 60.0, 30.0)),
        ]);
        index
    }

    #[test]
    fn test_hit_test_inside_and_outside() {
        let index = index();
        assert_eq!(index.hit_test(Vec2::new(0.0, 0.0)), Some(NodeId(0)));
        assert_eq!(index.hit_test(Vec2::new(100.0, 45.0)), Some(NodeId(2)));
        assert_eq!(index.hit_test(Vec2::new(70.0, 0.0)), None);
    }

    #[test]
    fn test_hit_test_edges_are_inclusive() {
        let index = index();
        assert_eq!(index.hit_test(Vec2::new(50.0, 20.0)), Some(NodeId(0)));
        assert_eq!(index.hit_test(Vec2::new(90.0, -60.0)), Some(NodeId(1)));
    }

    #[test]
    fn test_overlap_prefers_lowest_id() {
        let mut index = SpatialIndex::new();
        index.rebuild(vec![
            NodeRect::new(NodeId(4), Rect::new(0.0, 0.0, 10.0, 10.0)),
            NodeRect::new(NodeId(3), Rect::new(5.0, 5.0, 10.0, 10.0)),
        ]);
        assert_eq!(index.hit_test(Vec2::new(7.0, 7.0)), Some(NodeId(3)));
    }

    #[test]
    fn test_in_rect() {
        let index = index();
        let mut found = index.in_rect(Rect::new(80.0, -100.0, 100.0, 200.0));
        found.sort();
        assert_eq!(found, vec![NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_clear() {
        let mut index = index();
        assert_eq!(index.len(), 3);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.hit_test(Vec2::ZERO), None);
    }
}
