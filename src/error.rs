//! Error type for map operations.

use std::fmt;

use crate::graph::NodeId;

/// Failure of a map operation.
///
/// Every variant is raised before any mutation happens, so an `Err` always
/// means the tree, selection and dirty flags are exactly as they were.
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// Insert or paste under an id that is not in the index.
    ParentNotFound(NodeId),
    /// Update, annotate, move or copy of an id that is not in the index.
    NodeNotFound(NodeId),
    /// Move would make a node its own ancestor.
    InvalidReparent { node: NodeId, target: NodeId },
    /// The root cannot be moved.
    RootImmutable,
    /// The host drawing context could not be acquired.
    SurfaceUnavailable(String),
    /// A document could not be loaded.
    MalformedDocument(String),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParentNotFound(id) => write!(f, "parent node not found: {id}"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::InvalidReparent { node, target } => {
                write!(f, "cannot move {node} under its own subtree ({target})")
            }
            Self::RootImmutable => write!(f, "the root node cannot be moved"),
            Self::SurfaceUnavailable(msg) => write!(f, "drawing surface unavailable: {msg}"),
            Self::MalformedDocument(msg) => write!(f, "malformed document: {msg}"),
        }
    }
}

impl std::error::Error for MapError {}

/// Result alias for map operations.
pub type MapResult<T> = Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            MapError::ParentNotFound(NodeId(7)).to_string(),
            "parent node not found: Node(7)"
        );
        assert_eq!(
            MapError::InvalidReparent {
                node: NodeId(1),
                target: NodeId(4)
            }
            .to_string(),
            "cannot move Node(1) under its own subtree (Node(4))"
        );
    }
}
