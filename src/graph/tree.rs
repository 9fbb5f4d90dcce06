//! MapTree - the rooted node tree and its structural operations.
//!
//! Nodes live in a petgraph `StableGraph` arena with one parent→child edge per
//! link. A `HashMap<NodeId, NodeIndex>` is the id index. Display order of
//! children is kept on each node, since graph edges are unordered.
//!
//! Every operation validates before it mutates: an `Err` leaves the tree,
//! the index and the selection untouched.
//!
//! Subtree footprints are relaxed upward after every change (see
//! [`MapTree::refresh_footprint`]), so the full layout pass never has to
//! measure anything.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Directed;
use tracing::{debug, warn};

use super::clipboard::Subtree;
use super::node::{MapNode, NodeId, NodeKind};
use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use crate::geometry::{Size, Vec2};
use crate::style::{measure_box, resolve_style, TextMeasure};

/// The mind-map tree.
///
/// This struct manages:
/// - Node storage and parent→child links via petgraph
/// - The id index and the id counter
/// - Cached box sizes and subtree footprints
/// - The single selection
pub struct MapTree {
    /// Node arena. Edges point from parent to child.
    graph: StableGraph<MapNode, (), Directed>,

    /// Map from stable NodeId to petgraph NodeIndex
    index: HashMap<NodeId, NodeIndex>,

    root: NodeId,

    /// Next node ID to assign
    next_node_id: u32,

    selected: Option<NodeId>,

    h_gap: f64,
    v_gap: f64,
    placeholder_text: String,

    measure: Box<dyn TextMeasure>,
}

impl MapTree {
    /// Create a tree holding only a root node.
    pub fn new(measure: Box<dyn TextMeasure>, config: &MapConfig) -> Self {
        let mut tree = Self {
            graph: StableGraph::new(),
            index: HashMap::new(),
            root: NodeId(0),
            next_node_id: 0,
            selected: None,
            h_gap: config.h_gap,
            v_gap: config.v_gap,
            placeholder_text: config.placeholder_text.clone(),
            measure,
        };
        tree.reset(&config.root_text);
        tree
    }

    /// Drop every node and start over with a fresh root. Resets the id counter.
    pub fn reset(&mut self, root_text: &str) -> NodeId {
        self.graph.clear();
        self.index.clear();
        self.next_node_id = 0;
        self.selected = None;

        let id = self.allocate_id();
        let box_size = self.measure_text(root_text, NodeKind::Root);
        let node = MapNode::new(id, NodeKind::Root, 0, None, root_text.to_string(), box_size);
        let index = self.graph.add_node(node);
        self.index.insert(id, index);
        self.root = id;
        id
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn measure_text(&self, text: &str, kind: NodeKind) -> Size {
        measure_box(text, &resolve_style(kind, 1.0), self.measure.as_ref())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes (always at least 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// A tree always has its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&MapNode> {
        self.index
            .get(&id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut MapNode> {
        let index = *self.index.get(&id)?;
        self.graph.node_weight_mut(index)
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.node(id).map(MapNode::children)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    #[inline]
    pub fn h_gap(&self) -> f64 {
        self.h_gap
    }

    #[inline]
    pub fn v_gap(&self) -> f64 {
        self.v_gap
    }

    pub(crate) fn measurer(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    /// True if `node` lies strictly below `ancestor`.
    ///
    /// Walks the parent chain from `node` up to the root.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.node(node).and_then(MapNode::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(MapNode::parent);
        }
        false
    }

    /// Ids of the whole tree in pre-order (parent before children, children
    /// in display order).
    pub fn pre_order(&self) -> Vec<NodeId> {
        self.subtree_ids(self.root)
    }

    /// Ids of the subtree rooted at `id` in pre-order. Empty if `id` is unknown.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(node) = self.node(current) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Ids of the whole tree level by level.
    pub fn breadth_first(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut queue = VecDeque::from([self.root]);
        while let Some(current) = queue.pop_front() {
            out.push(current);
            if let Some(node) = self.node(current) {
                queue.extend(node.children.iter().copied());
            }
        }
        out
    }

    /// Parent→child links as stored in the graph. Order is unspecified.
    pub fn links(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (self.graph[edge.source()].id, self.graph[edge.target()].id))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a node, or clear the selection with `None`.
    ///
    /// Returns whether the selection changed.
    pub fn select(&mut self, id: Option<NodeId>) -> MapResult<bool> {
        if let Some(id) = id {
            if !self.contains(id) {
                return Err(MapError::NodeNotFound(id));
            }
        }
        if id == self.selected {
            return Ok(false);
        }
        if let Some(previous) = self.selected {
            if let Some(node) = self.node_mut(previous) {
                node.state.set_selected(false);
            }
        }
        if let Some(next) = id {
            if let Some(node) = self.node_mut(next) {
                node.state.set_selected(true);
            }
        }
        self.selected = id;
        Ok(true)
    }

    // =========================================================================
    // Structural Operations
    // =========================================================================

    /// Insert a new node under `parent`.
    ///
    /// The child is appended unless `at` lies in `0..=children.len()`, in which
    /// case it is spliced there. Its kind follows from the parent's kind.
    pub fn insert(&mut self, parent: NodeId, text: Option<&str>, at: Option<usize>) -> MapResult<NodeId> {
        let (parent_kind, parent_depth, child_count) = match self.node(parent) {
            Some(node) => (node.kind, node.depth, node.children.len()),
            None => return Err(MapError::ParentNotFound(parent)),
        };
        let parent_index = self.index[&parent];

        let kind = parent_kind.child_kind();
        let text = text.unwrap_or(self.placeholder_text.as_str()).to_string();
        let box_size = self.measure_text(&text, kind);
        let id = self.allocate_id();

        let node = MapNode::new(id, kind, parent_depth + 1, Some(parent), text, box_size);
        let index = self.graph.add_node(node);
        self.index.insert(id, index);
        self.graph.add_edge(parent_index, index, ());

        let position = at.filter(|&i| i <= child_count).unwrap_or(child_count);
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.insert(position, id);
        }

        self.refresh_footprint(parent);
        debug!(node = id.raw(), parent = parent.raw(), position, "inserted node");
        Ok(id)
    }

    /// Delete a node and its whole subtree.
    ///
    /// Returns the parent id, or `None` when `id` is the root or unknown. A
    /// selection inside the deleted subtree moves to the sibling now at the
    /// same position, else the previous sibling, else the parent.
    pub fn delete(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id)?.parent?;
        let position = self
            .node(parent)?
            .children
            .iter()
            .position(|&child| child == id)?;

        let doomed = self.subtree_ids(id);
        let selection_lost = self
            .selected
            .is_some_and(|selected| doomed.contains(&selected));

        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.remove(position);
        }
        for doomed_id in &doomed {
            if let Some(index) = self.index.remove(doomed_id) {
                self.graph.remove_node(index);
            }
        }

        if selection_lost {
            self.selected = None;
            let siblings = self.children(parent).unwrap_or_default();
            let next = if siblings.is_empty() {
                parent
            } else {
                siblings[position.min(siblings.len() - 1)]
            };
            // `next` is live: it is the parent or one of its children.
            let _ = self.select(Some(next));
        }

        self.refresh_footprint(parent);
        debug!(node = id.raw(), parent = parent.raw(), removed = doomed.len(), "deleted subtree");
        Some(parent)
    }

    /// Change a node's text.
    ///
    /// Returns `Ok(false)` without touching anything when the text is
    /// unchanged.
    pub fn rename(&mut self, id: NodeId, text: &str) -> MapResult<bool> {
        let kind = match self.node(id) {
            Some(node) if node.text == text => return Ok(false),
            Some(node) => node.kind,
            None => return Err(MapError::NodeNotFound(id)),
        };
        let box_size = self.measure_text(text, kind);
        if let Some(node) = self.node_mut(id) {
            node.text = text.to_string();
            node.box_size = box_size;
        }
        self.refresh_footprint(id);
        debug!(node = id.raw(), "renamed node");
        Ok(true)
    }

    /// Change a node's annotation. Returns whether it changed.
    pub fn annotate(&mut self, id: NodeId, annotation: &str) -> MapResult<bool> {
        let node = self.node_mut(id).ok_or(MapError::NodeNotFound(id))?;
        if node.annotation == annotation {
            return Ok(false);
        }
        node.annotation = annotation.to_string();
        Ok(true)
    }

    /// Deep-copy the subtree rooted at `id`. Ids are kept in the copy.
    pub fn clone_subtree(&self, id: NodeId) -> MapResult<Subtree> {
        let node = self.node(id).ok_or(MapError::NodeNotFound(id))?;
        Ok(self.copy_node(node))
    }

    fn copy_node(&self, node: &MapNode) -> Subtree {
        Subtree {
            id: node.id,
            kind: node.kind,
            text: node.text.clone(),
            annotation: node.annotation.clone(),
            children: node
                .children
                .iter()
                .filter_map(|&child| self.node(child))
                .map(|child| self.copy_node(child))
                .collect(),
        }
    }

    /// Re-create a copied subtree under `parent` with fresh ids.
    ///
    /// Nodes are inserted breadth-first, root of the copy first, carrying only
    /// their text. Returns the id of the new copy's root.
    pub fn paste(&mut self, subtree: &Subtree, parent: NodeId) -> MapResult<NodeId> {
        if !self.contains(parent) {
            return Err(MapError::ParentNotFound(parent));
        }
        let mut queue = VecDeque::from([(subtree, parent)]);
        let mut pasted_root = None;
        while let Some((source, target_parent)) = queue.pop_front() {
            let id = self.insert(target_parent, Some(source.text.as_str()), None)?;
            pasted_root.get_or_insert(id);
            queue.extend(source.children.iter().map(|child| (child, id)));
        }
        // The queue starts non-empty, so at least one insert ran.
        pasted_root.ok_or(MapError::ParentNotFound(parent))
    }

    /// Move `id` (with its subtree) under `new_parent`, keeping its id.
    ///
    /// `at` indexes the new parent's children after `id` has been detached and
    /// is clamped to the end. Depth and kind are re-derived for the moved
    /// subtree.
    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId, at: Option<usize>) -> MapResult<()> {
        let old_parent = match self.node(id) {
            Some(node) => node.parent.ok_or(MapError::RootImmutable)?,
            None => return Err(MapError::NodeNotFound(id)),
        };
        if !self.contains(new_parent) {
            return Err(MapError::ParentNotFound(new_parent));
        }
        if new_parent == id || self.is_descendant_of(new_parent, id) {
            warn!(node = id.raw(), target = new_parent.raw(), "rejected cycle-forming move");
            return Err(MapError::InvalidReparent {
                node: id,
                target: new_parent,
            });
        }

        let node_index = self.index[&id];
        let old_parent_index = self.index[&old_parent];
        let new_parent_index = self.index[&new_parent];

        // Detach.
        if let Some(edge) = self.graph.find_edge(old_parent_index, node_index) {
            self.graph.remove_edge(edge);
        }
        if let Some(parent_node) = self.node_mut(old_parent) {
            parent_node.children.retain(|&child| child != id);
        }

        // Attach.
        self.graph.add_edge(new_parent_index, node_index, ());
        if let Some(parent_node) = self.node_mut(new_parent) {
            let count = parent_node.children.len();
            let position = at.map_or(count, |i| i.min(count));
            parent_node.children.insert(position, id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = Some(new_parent);
        }

        self.rederive_subtree(id);
        self.refresh_footprint(old_parent);
        self.refresh_footprint(new_parent);
        debug!(
            node = id.raw(),
            from = old_parent.raw(),
            to = new_parent.raw(),
            "moved subtree"
        );
        Ok(())
    }

    /// Recompute depth, kind, box and footprint for a subtree whose parent
    /// changed.
    fn rederive_subtree(&mut self, id: NodeId) {
        let order = self.subtree_ids(id);
        for &current in &order {
            let Some(parent) = self.node(current).and_then(MapNode::parent) else {
                continue;
            };
            let Some((parent_kind, parent_depth)) = self.node(parent).map(|p| (p.kind, p.depth)) else {
                continue;
            };
            let kind = parent_kind.child_kind();
            let remeasured = match self.node(current) {
                Some(node) if node.kind != kind => Some(self.measure_text(&node.text, kind)),
                _ => None,
            };
            if let Some(node) = self.node_mut(current) {
                node.depth = parent_depth + 1;
                node.kind = kind;
                if let Some(box_size) = remeasured {
                    node.box_size = box_size;
                }
            }
        }
        // Bottom-up so every node sees final child footprints.
        for &current in order.iter().rev() {
            if let Some(required) = self.required_footprint(current) {
                if let Some(node) = self.node_mut(current) {
                    node.footprint = required;
                }
            }
        }
    }

    // =========================================================================
    // Footprints
    // =========================================================================

    /// Footprint `id` needs given its own box and its children's footprints.
    pub fn required_footprint(&self, id: NodeId) -> Option<Size> {
        let node = self.node(id)?;
        if node.children.is_empty() {
            return Some(node.box_size);
        }
        let mut widest = 0.0_f64;
        let mut total_height = 0.0_f64;
        for child in node.children.iter().filter_map(|&child| self.node(child)) {
            widest = widest.max(child.footprint.w);
            total_height += child.footprint.h;
        }
        total_height += (node.children.len() - 1) as f64 * self.v_gap;
        Some(Size::new(
            node.box_size.w + self.h_gap + widest,
            total_height.max(node.box_size.h),
        ))
    }

    /// Re-establish the footprint of `id` and relax upward.
    ///
    /// Stops at the first ancestor whose footprint is unchanged. Relies on
    /// every footprint outside the chain having been correct before the edit.
    pub fn refresh_footprint(&mut self, mut id: NodeId) {
        loop {
            let Some(required) = self.required_footprint(id) else {
                return;
            };
            let Some(node) = self.node_mut(id) else {
                return;
            };
            if node.footprint == required {
                return;
            }
            node.footprint = required;
            match node.parent {
                Some(parent) => id = parent,
                None => return,
            }
        }
    }

    // =========================================================================
    // Per-node visual state
    // =========================================================================

    pub(crate) fn set_position(&mut self, id: NodeId, position: Vec2) {
        if let Some(node) = self.node_mut(id) {
            node.position = position;
        }
    }

    pub(crate) fn set_dragging(&mut self, id: NodeId, dragging: bool) {
        if let Some(node) = self.node_mut(id) {
            node.state.set_dragging(dragging);
        }
    }

    pub(crate) fn set_drop_target(&mut self, id: NodeId, target: bool) {
        if let Some(node) = self.node_mut(id) {
            node.state.set_drop_target(target);
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check index consistency, link symmetry, depth, kinds and footprints.
    ///
    /// Returns a description of the first violation found.
    pub fn check_consistency(&self) -> Result<(), String> {
        let reachable = self.pre_order();
        let unique: HashSet<_> = reachable.iter().copied().collect();
        if unique.len() != reachable.len() {
            return Err("a node is reachable twice".to_string());
        }
        if reachable.len() != self.index.len() || self.graph.node_count() != self.index.len() {
            return Err(format!(
                "index holds {} ids, graph {} nodes, {} reachable",
                self.index.len(),
                self.graph.node_count(),
                reachable.len()
            ));
        }
        if self.graph.edge_count() + 1 != self.index.len() {
            return Err(format!("{} links for {} nodes", self.graph.edge_count(), self.index.len()));
        }
        for &id in &reachable {
            let node = self.node(id).ok_or_else(|| format!("{id} missing from index"))?;
            if node.id != id {
                return Err(format!("index maps {id} to {}", node.id));
            }
            match node.parent {
                None if id != self.root => return Err(format!("{id} has no parent")),
                None => {
                    if node.depth != 0 || node.kind != NodeKind::Root {
                        return Err("root has wrong depth or kind".to_string());
                    }
                }
                Some(parent) => {
                    let parent_node = self.node(parent).ok_or_else(|| format!("parent of {id} missing"))?;
                    if !parent_node.children.contains(&id) {
                        return Err(format!("{parent} does not list {id} as a child"));
                    }
                    if node.depth != parent_node.depth + 1 {
                        return Err(format!("{id} has depth {}", node.depth));
                    }
                    if node.kind != parent_node.kind.child_kind() {
                        return Err(format!("{id} has kind {:?}", node.kind));
                    }
                }
            }
            if let Some(required) = self.required_footprint(id) {
                if node.footprint != required {
                    return Err(format!(
                        "{id} footprint {:?} differs from required {:?}",
                        node.footprint, required
                    ));
                }
            }
        }
        if let Some(selected) = self.selected {
            if !self.contains(selected) {
                return Err(format!("selection {selected} is not live"));
            }
        }
        let flagged = reachable
            .iter()
            .filter(|&&id| self.node(id).is_some_and(MapNode::is_selected))
            .count();
        if flagged != usize::from(self.selected.is_some()) {
            return Err(format!("{flagged} nodes carry the selected flag"));
        }
        Ok(())
    }
}
