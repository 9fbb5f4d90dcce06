//! Tree data structures and operations.
//!
//! The map is a rooted tree stored in petgraph's StableGraph, so node indices
//! survive deletions. Each node caches its measured box and subtree footprint;
//! the layout pass only has to place them.

mod clipboard;
mod document;
mod node;
mod tree;

pub use clipboard::{Clipboard, Subtree};
pub use document::{DocumentNode, MapDocument};
pub use node::{MapNode, NodeId, NodeKind, NodeState};
pub use tree::MapTree;
