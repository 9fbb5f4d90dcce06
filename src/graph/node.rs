//! Node type and related structures.
//!
//! Nodes are the boxes of the mind map. Each node has:
//! - A stable unique identifier (never reused while the node exists)
//! - A kind (root, primary, secondary) that picks its visual style
//! - Text and an optional annotation
//! - Cached box size and subtree footprint, maintained by the tree
//! - A canvas-space position, valid after a layout pass
//! - State flags (selected, dragging, drop target)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size, Vec2};

/// Stable node identifier.
///
/// Assigned from the owning tree's counter and kept for the node's lifetime,
/// including across moves. It wraps a u32 for efficient storage and
/// WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Visual/semantic tier of a node.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The single tree root.
    Root = 0,
    /// Direct child of the root.
    Primary = 1,
    /// Everything deeper.
    Secondary = 2,
}

impl NodeKind {
    /// Kind given to a new child of a node of this kind.
    #[inline]
    pub fn child_kind(self) -> Self {
        match self {
            Self::Root => Self::Primary,
            Self::Primary | Self::Secondary => Self::Secondary,
        }
    }
}

/// Node state flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const SELECTED: u8 = 0b0000_0001;
    const DRAGGING: u8 = 0b0000_0010;
    const DROP_TARGET: u8 = 0b0000_0100;

    /// Create a new default node state.
    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    #[inline]
    fn set(&mut self, mask: u8, on: bool) {
        if on {
            self.flags |= mask;
        } else {
            self.flags &= !mask;
        }
    }

    /// Check if the node is selected.
    #[inline]
    pub fn is_selected(self) -> bool {
        self.flags & Self::SELECTED != 0
    }

    /// Set the selected state.
    #[inline]
    pub fn set_selected(&mut self, selected: bool) {
        self.set(Self::SELECTED, selected);
    }

    /// Check if the node is being dragged.
    #[inline]
    pub fn is_dragging(self) -> bool {
        self.flags & Self::DRAGGING != 0
    }

    /// Set the dragging state.
    #[inline]
    pub fn set_dragging(&mut self, dragging: bool) {
        self.set(Self::DRAGGING, dragging);
    }

    /// Check if the node is the current drop target of a drag.
    #[inline]
    pub fn is_drop_target(self) -> bool {
        self.flags & Self::DROP_TARGET != 0
    }

    /// Set the drop-target state.
    #[inline]
    pub fn set_drop_target(&mut self, target: bool) {
        self.set(Self::DROP_TARGET, target);
    }
}

/// A mind-map node as stored in the tree arena.
///
/// `parent` and `children` hold ids, not references; the tree's index resolves
/// them. Size fields are maintained by [`MapTree`](super::MapTree) and must not
/// be edited directly by callers.
#[derive(Debug, Clone)]
pub struct MapNode {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) text: String,
    pub(crate) annotation: String,
    pub(crate) depth: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) box_size: Size,
    pub(crate) footprint: Size,
    pub(crate) position: Vec2,
    pub(crate) state: NodeState,
}

impl MapNode {
    pub(crate) fn new(
        id: NodeId,
        kind: NodeKind,
        depth: u32,
        parent: Option<NodeId>,
        text: String,
        box_size: Size,
    ) -> Self {
        Self {
            id,
            kind,
            text,
            annotation: String::new(),
            depth,
            parent,
            children: Vec::new(),
            box_size,
            footprint: box_size,
            position: Vec2::ZERO,
            state: NodeState::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Distance from the root (root = 0).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in display order (top to bottom).
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Measured size of this node's own box at scale 1.
    #[inline]
    pub fn box_size(&self) -> Size {
        self.box_size
    }

    /// Space reserved by this node's whole subtree.
    #[inline]
    pub fn footprint(&self) -> Size {
        self.footprint
    }

    /// Top-left canvas-space position. Stale until the next layout pass after
    /// a structural edit.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.state.is_selected()
    }

    /// The node's own box in canvas space.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.box_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.0, 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_child_kind() {
        assert_eq!(NodeKind::Root.child_kind(), NodeKind::Primary);
        assert_eq!(NodeKind::Primary.child_kind(), NodeKind::Secondary);
        assert_eq!(NodeKind::Secondary.child_kind(), NodeKind::Secondary);
    }

    #[test]
    fn test_node_state_default() {
        let state = NodeState::new();
        assert!(!state.is_selected());
        assert!(!state.is_dragging());
        assert!(!state.is_drop_target());
    }

    #[test]
    fn test_node_state_all_flags() {
        let mut state = NodeState::new();
        state.set_selected(true);
        state.set_dragging(true);
        state.set_drop_target(true);

        assert!(state.is_selected());
        assert!(state.is_dragging());
        assert!(state.is_drop_target());

        state.set_dragging(false);
        assert!(state.is_selected());
        assert!(!state.is_dragging());
        assert!(state.is_drop_target());
    }

    #[test]
    fn test_new_node_footprint_matches_box() {
        let node = MapNode::new(
            NodeId(3),
            NodeKind::Primary,
            1,
            Some(NodeId(0)),
            "x".to_string(),
            Size::new(30.0, 20.0),
        );
        assert_eq!(node.footprint(), node.box_size());
        assert_eq!(node.bounds(), Rect::new(0.0, 0.0, 30.0, 20.0));
    }
}
