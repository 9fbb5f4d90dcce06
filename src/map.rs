//! MindMap - the editable, rendered map.
//!
//! Ties the tree, layout, viewport, hit-test index, clipboard, interaction
//! state and frame scheduler together behind one single-threaded API. Every
//! public operation is synchronous and only sets dirty flags; drawing happens
//! in [`MindMap::tick`], which the host calls once per animation frame.

use tracing::{debug, trace, warn};

use crate::config::MapConfig;
use crate::error::MapResult;
use crate::geometry::{Size, Vec2};
use crate::graph::{Clipboard, MapDocument, MapTree, NodeId};
use crate::interaction::{
    action_for_key, action_for_wheel, EditRequest, EventResponse, InteractionState, Key, KeyAction,
    Modifiers, PointerButton, PointerInput, WheelAction, WheelInput,
};
use crate::layout::{LayoutMode, StackTreeLayout};
use crate::render::{paint, DragOverlay, FrameKind, RenderScheduler, Surface};
use crate::spatial::{NodeRect, SpatialIndex};
use crate::style::{resolve_style, TextMeasure};
use crate::viewport::Viewport;

/// Result of a host tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing was dirty; nothing was drawn.
    Idle,
    Painted(FrameKind),
    /// The map was disposed; the host should stop ticking.
    Disposed,
}

pub struct MindMap<S: Surface> {
    surface: S,
    config: MapConfig,
    tree: MapTree,
    viewport: Viewport,
    layout: StackTreeLayout,
    spatial: SpatialIndex,
    scheduler: RenderScheduler,
    clipboard: Clipboard,
    state: InteractionState,
    editing: Option<NodeId>,
    disposed: bool,
}

impl<S: Surface> MindMap<S> {
    pub fn new(surface: S, measure: Box<dyn TextMeasure>, config: MapConfig) -> Self {
        let viewport = Viewport::new(surface.size(), &config);
        let tree = MapTree::new(measure, &config);
        debug!(width = viewport.size().w, height = viewport.size().h, "created mind map");
        Self {
            surface,
            config,
            tree,
            viewport,
            layout: StackTreeLayout::new(),
            spatial: SpatialIndex::new(),
            scheduler: RenderScheduler::new(),
            clipboard: Clipboard::new(),
            state: InteractionState::Idle,
            editing: None,
            disposed: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn root_id(&self) -> NodeId {
        self.tree.root_id()
    }

    pub fn tree(&self) -> &MapTree {
        &self.tree
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.state
    }

    /// Node whose inline editor is open, if any.
    pub fn editing(&self) -> Option<NodeId> {
        self.editing
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // =========================================================================
    // Tree operations
    // =========================================================================

    pub fn add_node(&mut self, parent: NodeId, text: Option<&str>, at: Option<usize>) -> MapResult<NodeId> {
        let id = self.tree.insert(parent, text, at)?;
        self.scheduler.mark_relayout();
        Ok(id)
    }

    /// Delete a node and its subtree. Returns the parent, or `None` for the
    /// root or an unknown id.
    pub fn delete_node(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.tree.delete(id)?;
        self.forget_removed_nodes();
        self.scheduler.mark_relayout();
        Some(parent)
    }

    /// Change a node's text. Returns whether it changed.
    pub fn update_node(&mut self, id: NodeId, text: &str) -> MapResult<bool> {
        let changed = self.tree.rename(id, text)?;
        if changed {
            self.scheduler.mark_relayout();
        }
        Ok(changed)
    }

    pub fn annotate_node(&mut self, id: NodeId, annotation: &str) -> MapResult<bool> {
        let changed = self.tree.annotate(id, annotation)?;
        if changed {
            self.scheduler.mark_repaint();
        }
        Ok(changed)
    }

    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId, at: Option<usize>) -> MapResult<()> {
        self.tree.move_node(id, new_parent, at)?;
        self.scheduler.mark_relayout();
        Ok(())
    }

    /// Copy a subtree into the clipboard, replacing what was there.
    pub fn copy_node(&mut self, id: NodeId) -> MapResult<()> {
        let subtree = self.tree.clone_subtree(id)?;
        debug!(node = id.raw(), nodes = subtree.len(), "copied subtree");
        self.clipboard.store(subtree);
        Ok(())
    }

    /// Copy then delete. The root is copied but stays in place.
    pub fn cut_node(&mut self, id: NodeId) -> MapResult<Option<NodeId>> {
        self.copy_node(id)?;
        Ok(self.delete_node(id))
    }

    /// Paste the clipboard under `parent`. Returns the pasted root, or `None`
    /// if the clipboard is empty. The clipboard keeps its contents.
    pub fn paste_node(&mut self, parent: NodeId) -> MapResult<Option<NodeId>> {
        let Some(subtree) = self.clipboard.contents() else {
            return Ok(None);
        };
        let id = self.tree.paste(subtree, parent)?;
        self.scheduler.mark_relayout();
        Ok(Some(id))
    }

    // =========================================================================
    // Viewport and selection
    // =========================================================================

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    /// Set the scale (clamped). Returns whether it changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        let changed = self.viewport.set_scale(scale);
        if changed {
            self.scheduler.mark_repaint();
        }
        changed
    }

    pub fn translate(&self) -> Vec2 {
        self.viewport.translate()
    }

    pub fn set_translate(&mut self, translate: Vec2) -> bool {
        let changed = self.viewport.set_translate(translate);
        if changed {
            self.scheduler.mark_repaint();
        }
        changed
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.tree.selected()
    }

    pub fn select_node(&mut self, id: Option<NodeId>) -> MapResult<bool> {
        let changed = self.tree.select(id)?;
        if changed {
            self.scheduler.mark_repaint();
        }
        Ok(changed)
    }

    /// Track a new surface size.
    pub fn resize(&mut self, size: Size) -> bool {
        let changed = self.viewport.resize(size);
        if changed {
            self.scheduler.mark_repaint();
        }
        changed
    }

    // =========================================================================
    // Documents
    // =========================================================================

    pub fn to_document(&self) -> MapDocument {
        MapDocument::from_tree(&self.tree)
    }

    /// Replace the map with a document. Ids are reassigned; the clipboard,
    /// viewport and config are kept.
    pub fn load_document(&mut self, document: &MapDocument) -> MapResult<NodeId> {
        let root = document.load_into(&mut self.tree)?;
        self.state = InteractionState::Idle;
        self.editing = None;
        self.spatial.clear();
        self.scheduler.mark_relayout();
        Ok(root)
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Stop rendering. Later ticks return [`FrameOutcome::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.state = InteractionState::Idle;
        self.editing = None;
        self.spatial.clear();
        debug!("disposed mind map");
    }

    /// Run one frame if anything is dirty.
    pub fn tick(&mut self) -> FrameOutcome {
        if self.disposed {
            return FrameOutcome::Disposed;
        }
        let Some(kind) = self.scheduler.begin_frame() else {
            return FrameOutcome::Idle;
        };
        if kind == FrameKind::Relayout {
            self.relayout();
        }
        let overlay = self.drag_overlay();
        let stats = paint(&mut self.surface, &self.tree, &self.viewport, overlay);
        self.scheduler.finish_frame();
        trace!(?kind, nodes = stats.nodes, links = stats.links, "painted frame");
        FrameOutcome::Painted(kind)
    }

    fn relayout(&mut self) {
        let summary = self.layout.apply(&mut self.tree, LayoutMode::Full);
        let rects = self
            .tree
            .pre_order()
            .into_iter()
            .filter_map(|id| self.tree.node(id))
            .map(|node| NodeRect::new(node.id(), node.bounds()))
            .collect();
        self.spatial.rebuild(rects);
        self.scheduler.layout_done();
        trace!(nodes = summary.nodes, "relayout");
    }

    /// Run a pending relayout now so positions are valid for hit testing.
    pub fn ensure_layout(&mut self) {
        if self.scheduler.needs_relayout() {
            self.relayout();
        }
    }

    /// Node under a surface-pixel position.
    pub fn node_at(&mut self, screen: Vec2) -> Option<NodeId> {
        self.ensure_layout();
        self.spatial.hit_test(self.viewport.to_model(screen))
    }

    fn drag_overlay(&self) -> Option<DragOverlay> {
        match self.state {
            InteractionState::NodeDragging {
                node,
                pointer,
                drop_target,
            } if self.tree.node(node).is_some_and(|n| n.state().is_dragging()) => Some(DragOverlay {
                node,
                pointer,
                drop_target,
            }),
            _ => None,
        }
    }

    /// Drop interaction state that refers to nodes no longer in the tree.
    fn forget_removed_nodes(&mut self) {
        if let InteractionState::NodeDragging { node, drop_target, .. } = self.state {
            if !self.tree.contains(node) {
                // A surviving target still carries its flag.
                if let Some(target) = drop_target {
                    self.tree.set_drop_target(target, false);
                }
                self.state = InteractionState::Idle;
            } else if drop_target.is_some_and(|target| !self.tree.contains(target)) {
                self.set_drop_target(None);
            }
        }
        if self.editing.is_some_and(|id| !self.tree.contains(id)) {
            self.editing = None;
        }
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn pointer_down(&mut self, input: PointerInput) -> EventResponse {
        if self.disposed || self.state.is_dragging() {
            return EventResponse::IGNORED;
        }
        match input.button {
            PointerButton::Primary => {
                let pointer = self.viewport.to_model(input.position);
                match self.node_at(input.position) {
                    Some(node) => {
                        self.state = InteractionState::NodeDragging {
                            node,
                            pointer,
                            drop_target: None,
                        };
                        // Hit-tested ids are live.
                        let _ = self.select_node(Some(node));
                    }
                    None => {
                        self.state = InteractionState::PanDragging;
                        let _ = self.select_node(None);
                    }
                }
                EventResponse::HANDLED
            }
            PointerButton::Secondary => {
                self.state = InteractionState::AltDragging;
                EventResponse::HANDLED
            }
            PointerButton::Auxiliary => EventResponse::IGNORED,
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> EventResponse {
        match self.state {
            InteractionState::PanDragging => {
                self.set_translate(self.viewport.translate() + input.movement);
                EventResponse::HANDLED
            }
            InteractionState::NodeDragging { node, .. } => {
                let pointer = self.viewport.to_model(input.position);
                self.tree.set_dragging(node, true);
                let target = self
                    .node_at(input.position)
                    .filter(|&target| self.accepts_drop(node, target));
                if let InteractionState::NodeDragging { pointer: p, .. } = &mut self.state {
                    *p = pointer;
                }
                self.set_drop_target(target);
                self.scheduler.mark_repaint();
                EventResponse::HANDLED
            }
            InteractionState::AltDragging | InteractionState::Idle => EventResponse::IGNORED,
        }
    }

    pub fn pointer_up(&mut self, input: PointerInput) -> EventResponse {
        match std::mem::take(&mut self.state) {
            InteractionState::NodeDragging { node, drop_target, .. } => {
                self.tree.set_dragging(node, false);
                if let Some(target) = drop_target {
                    self.tree.set_drop_target(target, false);
                }
                self.scheduler.mark_repaint();

                let target = self
                    .node_at(input.position)
                    .filter(|&target| self.accepts_drop(node, target));
                if let Some(target) = target {
                    self.drop_onto(node, target);
                }
                if self.tree.contains(node) {
                    let _ = self.select_node(Some(node));
                }
                EventResponse::HANDLED
            }
            InteractionState::PanDragging | InteractionState::AltDragging => EventResponse::HANDLED,
            InteractionState::Idle => EventResponse::IGNORED,
        }
    }

    /// Pointer left the surface: abort any drag without mutating the tree.
    pub fn pointer_leave(&mut self) -> EventResponse {
        if let InteractionState::NodeDragging { node, drop_target, .. } = std::mem::take(&mut self.state) {
            self.tree.set_dragging(node, false);
            if let Some(target) = drop_target {
                self.tree.set_drop_target(target, false);
            }
            self.scheduler.mark_repaint();
        }
        EventResponse::IGNORED
    }

    /// A drop on `target` moves `node` into `target`'s parent, just above
    /// `target`. Self, ancestors, descendants and the root are refused.
    fn accepts_drop(&self, node: NodeId, target: NodeId) -> bool {
        target != node
            && self.tree.node(target).is_some_and(|t| t.parent().is_some())
            && !self.tree.is_descendant_of(node, target)
            && !self.tree.is_descendant_of(target, node)
    }

    fn drop_onto(&mut self, node: NodeId, target: NodeId) {
        let Some(parent) = self.tree.node(target).and_then(|t| t.parent()) else {
            return;
        };
        let index = self.tree.children(parent).and_then(|siblings| {
            siblings
                .iter()
                .filter(|&&sibling| sibling != node)
                .position(|&sibling| sibling == target)
        });
        match self.move_node(node, parent, index) {
            Ok(()) => debug!(node = node.raw(), target = target.raw(), "dropped node"),
            Err(err) => warn!(%err, "drop rejected"),
        }
    }

    fn set_drop_target(&mut self, target: Option<NodeId>) {
        let InteractionState::NodeDragging { drop_target, .. } = &mut self.state else {
            return;
        };
        let previous = std::mem::replace(drop_target, target);
        if previous == target {
            return;
        }
        if let Some(previous) = previous {
            self.tree.set_drop_target(previous, false);
        }
        if let Some(target) = target {
            self.tree.set_drop_target(target, true);
        }
    }

    pub fn wheel(&mut self, input: WheelInput) -> EventResponse {
        if self.disposed {
            return EventResponse::HANDLED;
        }
        match action_for_wheel(input, &self.config) {
            WheelAction::Zoom(step) => {
                if self.viewport.zoom_by(step) {
                    self.scheduler.mark_repaint();
                }
            }
            WheelAction::Scroll(dy) => {
                self.set_translate(self.viewport.translate() + Vec2::new(0.0, dy));
            }
        }
        EventResponse::HANDLED
    }

    pub fn context_menu(&mut self) -> EventResponse {
        EventResponse::HANDLED
    }

    // =========================================================================
    // Inline editing
    // =========================================================================

    /// Open the inline editor on the node under `position`, if any.
    pub fn double_click(&mut self, position: Vec2) -> EventResponse {
        if self.disposed {
            return EventResponse::IGNORED;
        }
        let Some(id) = self.node_at(position) else {
            return EventResponse::IGNORED;
        };
        let Some(node) = self.tree.node(id) else {
            return EventResponse::IGNORED;
        };
        let request = EditRequest {
            node: id,
            text: node.text().to_string(),
            rect: self.viewport.rect_to_screen(node.bounds()),
            font: resolve_style(node.kind(), self.viewport.scale()).font(),
        };
        self.editing = Some(id);
        EventResponse::edit(request)
    }

    /// Apply the editor's text. Returns whether the text changed.
    pub fn commit_edit(&mut self, text: &str) -> MapResult<bool> {
        match self.editing.take() {
            Some(id) => self.update_node(id, text),
            None => Ok(false),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    // =========================================================================
    // Keyboard input
    // =========================================================================

    pub fn key_up(&mut self, key: Key, modifiers: Modifiers) -> EventResponse {
        if self.disposed || self.editing.is_some() {
            return EventResponse::IGNORED;
        }
        let Some(selected) = self.tree.selected() else {
            return EventResponse::IGNORED;
        };
        let action = action_for_key(key, modifiers);
        let result = match action {
            KeyAction::Noop => return EventResponse::IGNORED,
            KeyAction::InsertSibling => self.insert_sibling(selected).map(drop),
            KeyAction::InsertChild => self.insert_and_select(selected, None).map(drop),
            KeyAction::DeleteSelected => {
                self.delete_node(selected);
                Ok(())
            }
            KeyAction::ClearSelection => self.select_node(None).map(drop),
            KeyAction::Copy => self.copy_node(selected),
            KeyAction::Cut => self.cut_node(selected).map(drop),
            KeyAction::Paste => self.paste_node(selected).map(drop),
        };
        if let Err(err) = result {
            warn!(?action, %err, "key action failed");
        }
        EventResponse::HANDLED
    }

    /// New node just below `node` among its siblings; under it if it is the
    /// root.
    fn insert_sibling(&mut self, node: NodeId) -> MapResult<NodeId> {
        let Some(parent) = self.tree.node(node).and_then(|n| n.parent()) else {
            return self.insert_and_select(node, None);
        };
        let index = self
            .tree
            .children(parent)
            .and_then(|siblings| siblings.iter().position(|&s| s == node))
            .map(|i| i + 1);
        self.insert_and_select(parent, index)
    }

    fn insert_and_select(&mut self, parent: NodeId, at: Option<usize>) -> MapResult<NodeId> {
        let id = self.add_node(parent, None, at)?;
        self.select_node(Some(id))?;
        Ok(id)
    }
}
