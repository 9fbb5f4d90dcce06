//! Layout algorithms for the map.
//!
//! Layout only assigns positions. Box sizes and subtree footprints are kept
//! current by [`MapTree`](crate::graph::MapTree) as edits happen, so a pass
//! never measures text.

pub mod stack_tree;

pub use stack_tree::{LayoutMode, LayoutSummary, StackTreeLayout};
