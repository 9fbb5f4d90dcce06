//! Runtime configuration for a mind map.

use serde::{Deserialize, Serialize};

/// Configuration for layout spacing, zoom bounds and input sensitivity.
///
/// Deserializes from a partial JS options object; missing fields fall back to
/// [`MapConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    /// Horizontal gap between a node's box and its children's column.
    pub h_gap: f64,
    /// Vertical gap between sibling subtrees.
    pub v_gap: f64,
    /// Lower zoom bound.
    pub min_scale: f64,
    /// Upper zoom bound.
    pub max_scale: f64,
    /// Scale change per modified wheel notch.
    pub zoom_step: f64,
    /// Multiplier applied to wheel `delta_y` when scrolling.
    pub scroll_sensitivity: f64,
    /// Text of the root node of a new document.
    pub root_text: String,
    /// Text given to nodes inserted without text.
    pub placeholder_text: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            h_gap: 40.0,
            v_gap: 20.0,
            min_scale: 0.2,
            max_scale: 4.0,
            zoom_step: 0.05,
            scroll_sensitivity: 5.0,
            root_text: "Main Theme".to_string(),
            placeholder_text: "New".to_string(),
        }
    }
}
