//! Browser smoke tests for the JavaScript surface.
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use mind_graph_wasm::MindGraphWasm;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;

wasm_bindgen_test_configure!(run_in_browser);

fn canvas() -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<HtmlCanvasElement>()
        .unwrap();
    canvas.set_width(640);
    canvas.set_height(480);
    canvas
}

#[wasm_bindgen_test]
fn builds_edits_and_paints() {
    let mut map = MindGraphWasm::new(canvas(), JsValue::UNDEFINED).unwrap();
    assert!(map.tick());

    let root = map.root_id();
    let child = map.add_node(root, Some("Child".into()), None).unwrap();
    assert_eq!(map.node_count(), 2);
    assert_eq!(map.children_of(root).to_vec(), vec![child]);
    assert!(map.tick());
}

#[wasm_bindgen_test]
fn document_round_trips_through_json() {
    let mut map = MindGraphWasm::new(canvas(), JsValue::UNDEFINED).unwrap();
    let root = map.root_id();
    map.add_node(root, Some("a".into()), None).unwrap();
    let json = map.to_document().unwrap();

    let mut other = MindGraphWasm::new(canvas(), JsValue::UNDEFINED).unwrap();
    other.load_document(&json).unwrap();
    assert_eq!(other.node_count(), 2);
}

#[wasm_bindgen_test]
fn invalid_move_surfaces_error() {
    let mut map = MindGraphWasm::new(canvas(), JsValue::UNDEFINED).unwrap();
    let root = map.root_id();
    assert!(map.move_node(root, root, None).is_err());
    map.dispose();
    assert!(!map.tick());
}
