//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree over node boxes in model space, used to
//! resolve pointer positions to nodes.

mod rtree;

pub use rtree::{NodeRect, SpatialIndex};
