//! Mind Graph - WASM Module
//!
//! This module provides the mind-map tree, its layout engine and its canvas
//! renderer. It is compiled to WebAssembly and exposes a JavaScript-friendly
//! API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: the node tree using petgraph's StableGraph, clipboard, documents
//! - `layout`: left-to-right stacked tree layout
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `viewport`: scale/translate and screen/model transforms
//! - `interaction`: pointer, wheel and keyboard input vocabulary
//! - `render`: dirty-flag frame scheduling and painting
//! - `map`: [`MindMap`], which ties the above together

use js_sys::{Float64Array, Uint32Array};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod map;
pub mod render;
pub mod spatial;
pub mod style;
pub mod viewport;

pub use config::MapConfig;
pub use error::{MapError, MapResult};
pub use graph::{MapDocument, NodeId};
pub use map::{FrameOutcome, MindMap};

use geometry::{Size, Vec2};
use interaction::{EventResponse, Key, Modifiers, PointerButton, PointerInput, WheelInput};
use render::CanvasSurface;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

impl From<MapError> for JsValue {
    fn from(err: MapError) -> Self {
        JsError::new(&err.to_string()).into()
    }
}

fn modifiers_of(ev: &MouseEvent) -> Modifiers {
    Modifiers::from_flags(ev.shift_key(), ev.ctrl_key(), ev.alt_key(), ev.meta_key())
}

fn pointer_of(ev: &MouseEvent) -> Option<PointerInput> {
    let button = PointerButton::from_dom(ev.button())?;
    let position = Vec2::new(f64::from(ev.offset_x()), f64::from(ev.offset_y()));
    let movement = Vec2::new(f64::from(ev.movement_x()), f64::from(ev.movement_y()));
    Some(
        PointerInput::new(button, position)
            .with_movement(movement)
            .with_modifiers(modifiers_of(ev)),
    )
}

/// Main entry point for the mind map.
///
/// This struct wraps [`MindMap`] over a canvas and provides the public API
/// exposed to JavaScript. The host forwards DOM events to the `on*` methods
/// and calls `tick` from `requestAnimationFrame`.
#[wasm_bindgen]
pub struct MindGraphWasm {
    map: MindMap<CanvasSurface>,
}

#[wasm_bindgen]
impl MindGraphWasm {
    /// Create a map drawing into `canvas`.
    ///
    /// `options` is an optional partial [`MapConfig`] object.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, options: JsValue) -> Result<MindGraphWasm, JsValue> {
        let config = if options.is_undefined() || options.is_null() {
            MapConfig::default()
        } else {
            match serde_wasm_bindgen::from_value(options) {
                Ok(config) => config,
                Err(err) => {
                    web_sys::console::warn_1(&format!("ignoring invalid map options: {err}").into());
                    MapConfig::default()
                }
            }
        };
        let surface = CanvasSurface::new(canvas)?;
        let measure = Box::new(surface.measure());
        Ok(Self {
            map: MindMap::new(surface, measure, config),
        })
    }

    // =========================================================================
    // Tree Operations
    // =========================================================================

    #[wasm_bindgen(getter, js_name = rootId)]
    pub fn root_id(&self) -> u32 {
        self.map.root_id().raw()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.map.tree().len() as u32
    }

    /// Add a node under `parent_id`. Returns the new node's ID.
    ///
    /// The node is appended unless `position` is a valid child index.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, parent_id: u32, text: Option<String>, position: Option<u32>) -> Result<u32, JsValue> {
        let id = self
            .map
            .add_node(NodeId(parent_id), text.as_deref(), position.map(|p| p as usize))?;
        Ok(id.raw())
    }

    /// Delete a node and its subtree.
    ///
    /// Returns the parent's ID, or undefined for the root or an unknown ID.
    #[wasm_bindgen(js_name = deleteNode)]
    pub fn delete_node(&mut self, node_id: u32) -> Option<u32> {
        self.map.delete_node(NodeId(node_id)).map(NodeId::raw)
    }

    #[wasm_bindgen(js_name = updateNode)]
    pub fn update_node(&mut self, node_id: u32, text: &str) -> Result<bool, JsValue> {
        Ok(self.map.update_node(NodeId(node_id), text)?)
    }

    #[wasm_bindgen(js_name = annotateNode)]
    pub fn annotate_node(&mut self, node_id: u32, annotation: &str) -> Result<bool, JsValue> {
        Ok(self.map.annotate_node(NodeId(node_id), annotation)?)
    }

    #[wasm_bindgen(js_name = moveNode)]
    pub fn move_node(&mut self, node_id: u32, parent_id: u32, position: Option<u32>) -> Result<(), JsValue> {
        self.map
            .move_node(NodeId(node_id), NodeId(parent_id), position.map(|p| p as usize))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = nodeText)]
    pub fn node_text(&self, node_id: u32) -> Option<String> {
        self.map.tree().node(NodeId(node_id)).map(|n| n.text().to_string())
    }

    #[wasm_bindgen(js_name = nodeAnnotation)]
    pub fn node_annotation(&self, node_id: u32) -> Option<String> {
        self.map
            .tree()
            .node(NodeId(node_id))
            .map(|n| n.annotation().to_string())
    }

    /// Ordered child IDs of `node_id` as a Uint32Array (empty if unknown).
    #[wasm_bindgen(js_name = childrenOf)]
    pub fn children_of(&self, node_id: u32) -> Uint32Array {
        let ids: Vec<u32> = self
            .map
            .tree()
            .children(NodeId(node_id))
            .map(|children| children.iter().map(|c| c.raw()).collect())
            .unwrap_or_default();
        Uint32Array::from(&ids[..])
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    #[wasm_bindgen(js_name = copyNode)]
    pub fn copy_node(&mut self, node_id: u32) -> Result<(), JsValue> {
        Ok(self.map.copy_node(NodeId(node_id))?)
    }

    #[wasm_bindgen(js_name = cutNode)]
    pub fn cut_node(&mut self, node_id: u32) -> Result<Option<u32>, JsValue> {
        Ok(self.map.cut_node(NodeId(node_id))?.map(NodeId::raw))
    }

    /// Paste the clipboard under `parent_id`. Returns the pasted root's ID.
    #[wasm_bindgen(js_name = pasteNode)]
    pub fn paste_node(&mut self, parent_id: u32) -> Result<Option<u32>, JsValue> {
        Ok(self.map.paste_node(NodeId(parent_id))?.map(NodeId::raw))
    }

    // =========================================================================
    // Viewport and Selection
    // =========================================================================

    /// Get the scale, setting it first when `value` is given.
    pub fn scale(&mut self, value: Option<f64>) -> f64 {
        if let Some(value) = value {
            self.map.set_scale(value);
        }
        self.map.scale()
    }

    /// Get the translation as a Float64Array `[x, y]`, setting it first when
    /// both are given.
    pub fn translate(&mut self, x: Option<f64>, y: Option<f64>) -> Float64Array {
        if let (Some(x), Some(y)) = (x, y) {
            self.map.set_translate(Vec2::new(x, y));
        }
        let t = self.map.translate();
        Float64Array::from(&[t.x, t.y][..])
    }

    /// Get the selected node's ID, selecting `node_id` first when given.
    #[wasm_bindgen(js_name = selectedNode)]
    pub fn selected_node(&mut self, node_id: Option<u32>) -> Result<Option<u32>, JsValue> {
        if let Some(id) = node_id {
            self.map.select_node(Some(NodeId(id)))?;
        }
        Ok(self.map.selected_node().map(NodeId::raw))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        // Clearing cannot fail.
        let _ = self.map.select_node(None);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        let size = Size::new(width, height);
        self.map.surface().set_size(size);
        self.map.resize(size);
    }

    /// Node under a canvas-relative pixel position.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&mut self, x: f64, y: f64) -> Option<u32> {
        self.map.node_at(Vec2::new(x, y)).map(NodeId::raw)
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Serialize the map to its JSON document string.
    #[wasm_bindgen(js_name = toDocument)]
    pub fn to_document(&self) -> Result<String, JsValue> {
        Ok(self.map.to_document().to_json()?)
    }

    /// Replace the map with a JSON document string. Returns the new root ID.
    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, json: &str) -> Result<u32, JsValue> {
        let document = MapDocument::from_json(json)?;
        Ok(self.map.load_document(&document)?.raw())
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Draw a frame if anything changed. Returns false once disposed.
    pub fn tick(&mut self) -> bool {
        self.map.tick() != FrameOutcome::Disposed
    }

    pub fn dispose(&mut self) {
        self.map.dispose();
    }

    // =========================================================================
    // DOM Events
    // =========================================================================

    #[wasm_bindgen(js_name = onPointerDown)]
    pub fn on_pointer_down(&mut self, ev: &MouseEvent) {
        if let Some(input) = pointer_of(ev) {
            apply(ev, self.map.pointer_down(input));
        }
    }

    #[wasm_bindgen(js_name = onPointerMove)]
    pub fn on_pointer_move(&mut self, ev: &MouseEvent) {
        if let Some(input) = pointer_of(ev) {
            apply(ev, self.map.pointer_move(input));
        }
    }

    #[wasm_bindgen(js_name = onPointerUp)]
    pub fn on_pointer_up(&mut self, ev: &MouseEvent) {
        if let Some(input) = pointer_of(ev) {
            apply(ev, self.map.pointer_up(input));
        }
    }

    #[wasm_bindgen(js_name = onPointerLeave)]
    pub fn on_pointer_leave(&mut self) {
        self.map.pointer_leave();
    }

    #[wasm_bindgen(js_name = onWheel)]
    pub fn on_wheel(&mut self, ev: &WheelEvent) {
        let input = WheelInput {
            delta_y: ev.delta_y(),
            modifiers: modifiers_of(ev),
        };
        apply(ev, self.map.wheel(input));
    }

    #[wasm_bindgen(js_name = onContextMenu)]
    pub fn on_context_menu(&mut self, ev: &MouseEvent) {
        apply(ev, self.map.context_menu());
    }

    /// Returns an edit request `{ node, text, rect, font }` for the host's
    /// text overlay, or undefined when no node was hit.
    #[wasm_bindgen(js_name = onDoubleClick)]
    pub fn on_double_click(&mut self, ev: &MouseEvent) -> Result<JsValue, JsValue> {
        let position = Vec2::new(f64::from(ev.offset_x()), f64::from(ev.offset_y()));
        match self.map.double_click(position).edit {
            Some(request) => Ok(serde_wasm_bindgen::to_value(&request)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = onKeyUp)]
    pub fn on_key_up(&mut self, ev: &KeyboardEvent) {
        let modifiers = Modifiers::from_flags(ev.shift_key(), ev.ctrl_key(), ev.alt_key(), ev.meta_key());
        let response = self.map.key_up(Key::from_dom(&ev.key()), modifiers);
        apply(ev, response);
    }

    #[wasm_bindgen(js_name = commitEdit)]
    pub fn commit_edit(&mut self, text: &str) -> Result<bool, JsValue> {
        Ok(self.map.commit_edit(text)?)
    }

    #[wasm_bindgen(js_name = cancelEdit)]
    pub fn cancel_edit(&mut self) {
        self.map.cancel_edit();
    }
}

fn apply(ev: &web_sys::Event, response: EventResponse) {
    if response.prevent_default {
        ev.prevent_default();
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::graph::NodeKind;
    use crate::interaction::InteractionState;
    use crate::render::{FrameKind, RecordingSurface};
    use crate::style::MonospaceMeasure;

    fn headless() -> MindMap<RecordingSurface> {
        MindMap::new(
            RecordingSurface::new(Size::new(1280.0, 720.0)),
            Box::new(MonospaceMeasure::default()),
            MapConfig::default(),
        )
    }

    /// Build a map through the public operations, paint it, then drive it
    /// with input the way a browser host would.
    #[test]
    fn test_edit_render_interact_pipeline() {
        let mut map = headless();
        let r = map.root_id();
        let c1 = map.add_node(r, Some("Child1"), None).unwrap();
        let c2 = map.add_node(r, Some("Child2"), None).unwrap();
        let g1 = map.add_node(c1, Some("G1"), None).unwrap();

        assert_eq!(map.tick(), FrameOutcome::Painted(FrameKind::Relayout));
        assert_eq!(
            map.surface().texts(),
            vec!["Main Theme", "Child1", "G1", "Child2"]
        );

        // Copy C1 and paste it under C2.
        map.copy_node(c1).unwrap();
        let pasted = map.paste_node(c2).unwrap().unwrap();
        let pasted_child = map.tree().children(pasted).unwrap()[0];
        assert_ne!(pasted_child, g1);
        assert_eq!(map.tree().node(pasted_child).unwrap().text(), "G1");
        assert_eq!(map.tree().node(pasted).unwrap().kind(), NodeKind::Secondary);

        // Select C1 and delete it from the keyboard.
        map.select_node(Some(c1)).unwrap();
        map.key_up(Key::Delete, Modifiers::empty());
        assert_eq!(map.selected_node(), Some(c2));
        assert!(!map.tree().contains(g1));

        map.tick();
        assert_eq!(map.tick(), FrameOutcome::Idle);
        assert!(map.tree().check_consistency().is_ok());
    }

    #[test]
    fn test_document_survives_json_and_reload() {
        let mut map = headless();
        let r = map.root_id();
        let a = map.add_node(r, Some("alpha"), None).unwrap();
        map.add_node(a, Some("beta"), None).unwrap();
        map.annotate_node(a, "first branch").unwrap();

        let json = map.to_document().to_json().unwrap();
        let mut reloaded = headless();
        let document = MapDocument::from_json(&json).unwrap();
        reloaded.load_document(&document).unwrap();

        assert_eq!(reloaded.to_document(), map.to_document());
        assert_eq!(reloaded.tick(), FrameOutcome::Painted(FrameKind::Relayout));
    }

    #[test]
    fn test_drag_after_zoom_and_pan() {
        let mut map = headless();
        let r = map.root_id();
        let a = map.add_node(r, Some("a"), None).unwrap();
        let b = map.add_node(r, Some("b"), None).unwrap();
        map.set_scale(1.75);
        map.set_translate(Vec2::new(120.0, -35.0));
        map.tick();

        let screen_center = |map: &MindMap<RecordingSurface>, id: NodeId| {
            let rect = map.tree().node(id).unwrap().bounds();
            map.viewport()
                .to_screen(Vec2::new(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0))
        };
        let from = screen_center(&map, b);
        let to = screen_center(&map, a);

        map.pointer_down(PointerInput::new(PointerButton::Primary, from));
        map.pointer_move(PointerInput::new(PointerButton::Primary, to));
        assert!(matches!(
            map.interaction_state(),
            InteractionState::NodeDragging { drop_target: Some(t), .. } if t == a
        ));
        map.pointer_up(PointerInput::new(PointerButton::Primary, to));

        assert_eq!(map.tree().children(r).unwrap(), &[b, a]);
        assert_eq!(map.selected_node(), Some(b));
    }

    #[test]
    fn test_map_error_converts_to_js_message() {
        let err = MapError::NodeNotFound(NodeId(3));
        assert_eq!(err.to_string(), "node not found: Node(3)");
    }
}
