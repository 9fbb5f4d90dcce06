//! Node, link and selection styles, and box measurement.
//!
//! Styles are resolved from the node kind and the current zoom scale. Box
//! sizes are always measured at scale 1 (canvas space) through a
//! [`TextMeasure`] implementation; the renderer measures text through the same
//! trait so that layout and paint agree.

use crate::geometry::Size;
use crate::graph::NodeKind;

/// Line height as a multiple of the font size. Single-line text only.
pub const LINE_HEIGHT: f64 = 1.4;

/// Resolved visual style of a node box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub font_size: f64,
    pub font_family: &'static str,
    pub font_weight: &'static str,
    pub font_style: &'static str,
    pub color: &'static str,
    pub background: &'static str,
    pub border_width: f64,
    pub border_color: &'static str,
    pub border_radius: f64,
    pub padding: f64,
    pub dragging_color: &'static str,
    pub dragging_background: &'static str,
    pub dragging_border_color: &'static str,
}

impl NodeStyle {
    /// CSS font shorthand understood by the canvas `font` property.
    pub fn font(&self) -> String {
        format!(
            "{} normal {} {}px {}",
            self.font_style, self.font_weight, self.font_size, self.font_family
        )
    }

    fn scaled(&self, scale: f64) -> Self {
        Self {
            font_size: self.font_size * scale,
            border_width: self.border_width * scale,
            border_radius: self.border_radius * scale,
            padding: self.padding * scale,
            ..*self
        }
    }
}

const ROOT_STYLE: NodeStyle = NodeStyle {
    font_size: 28.0,
    font_family: "Arial",
    font_weight: "300",
    font_style: "normal",
    color: "#fff",
    background: "#666666",
    border_width: 4.0,
    border_color: "#000",
    border_radius: 6.0,
    padding: 12.0,
    dragging_color: "#fff",
    dragging_background: "#999999",
    dragging_border_color: "#666666",
};

const PRIMARY_STYLE: NodeStyle = NodeStyle {
    font_size: 18.0,
    font_family: "Arial",
    font_weight: "normal",
    font_style: "normal",
    color: "#000",
    background: "#fff",
    border_width: 2.0,
    border_color: "#000",
    border_radius: 4.0,
    padding: 8.0,
    dragging_color: "#666666",
    dragging_background: "#f0f0f0",
    dragging_border_color: "#999999",
};

const SECONDARY_STYLE: NodeStyle = NodeStyle {
    font_size: 14.0,
    font_family: "Arial",
    font_weight: "normal",
    font_style: "normal",
    color: "#000",
    background: "transparent",
    border_width: 0.0,
    border_color: "#000",
    border_radius: 0.0,
    padding: 4.0,
    dragging_color: "#999999",
    dragging_background: "transparent",
    dragging_border_color: "#999999",
};

/// Style of the curve drawn from a parent to each child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkStyle {
    pub line_width: f64,
    pub line_color: &'static str,
    pub cp1_ratio: f64,
    pub cp2_ratio: f64,
}

impl LinkStyle {
    pub const BASE: Self = Self {
        line_width: 1.0,
        line_color: "#000",
        cp1_ratio: 0.2,
        cp2_ratio: 0.2,
    };

    pub fn scaled(scale: f64) -> Self {
        Self {
            line_width: Self::BASE.line_width * scale,
            ..Self::BASE
        }
    }
}

/// Outline drawn around the selected node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStyle {
    pub padding: f64,
    pub outline_width: f64,
    pub outline_color: &'static str,
}

impl SelectionStyle {
    pub const BASE: Self = Self {
        padding: 3.0,
        outline_width: 2.0,
        outline_color: "#3f8cff",
    };

    pub fn scaled(scale: f64) -> Self {
        Self {
            padding: Self::BASE.padding * scale,
            outline_width: Self::BASE.outline_width * scale,
            ..Self::BASE
        }
    }
}

/// Bar marking where a dragged node would land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertMarkStyle {
    pub width: f64,
    pub color: &'static str,
}

impl InsertMarkStyle {
    pub const BASE: Self = Self {
        width: 4.0,
        color: "#3f8cff",
    };

    pub fn scaled(scale: f64) -> Self {
        Self {
            width: Self::BASE.width * scale,
            ..Self::BASE
        }
    }
}

/// Resolve the style of a node kind at a zoom scale.
///
/// Font size, border width, border radius and padding scale linearly.
pub fn resolve_style(kind: NodeKind, scale: f64) -> NodeStyle {
    let base = match kind {
        NodeKind::Root => &ROOT_STYLE,
        NodeKind::Primary => &PRIMARY_STYLE,
        NodeKind::Secondary => &SECONDARY_STYLE,
    };
    base.scaled(scale)
}

/// Text measurement primitive shared by layout and paint.
pub trait TextMeasure {
    /// Advance width of `text` rendered with the CSS `font` shorthand.
    fn text_width(&self, text: &str, font: &str, font_size: f64) -> f64;
}

/// Deterministic measurer: every character advances by a fixed fraction of
/// the font size.
///
/// Used by headless hosts and tests, where no canvas is available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub advance_ratio: f64,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextMeasure for MonospaceMeasure {
    fn text_width(&self, text: &str, _font: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * self.advance_ratio
    }
}

/// Size of a node box: text plus padding and border on both sides.
pub fn measure_box(text: &str, style: &NodeStyle, measure: &dyn TextMeasure) -> Size {
    let pad = style.padding * 2.0 + style.border_width * 2.0;
    let text_width = measure.text_width(text, &style.font(), style.font_size);
    Size::new(text_width + pad, style.font_size * LINE_HEIGHT + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_style_scales_metrics() {
        let style = resolve_style(NodeKind::Primary, 2.0);
        assert_eq!(style.font_size, 36.0);
        assert_eq!(style.border_width, 4.0);
        assert_eq!(style.border_radius, 8.0);
        assert_eq!(style.padding, 16.0);
        assert_eq!(style.color, "#000");
    }

    #[test]
    fn test_font_shorthand() {
        let style = resolve_style(NodeKind::Root, 1.0);
        assert_eq!(style.font(), "normal normal 300 28px Arial");
    }

    #[test]
    fn test_measure_box_formula() {
        let measure = MonospaceMeasure::default();
        let style = resolve_style(NodeKind::Primary, 1.0);
        let size = measure_box("abcd", &style, &measure);
        // 4 chars * 18 * 0.6 + 2*8 + 2*2
        assert!((size.w - (43.2 + 20.0)).abs() < 1e-9);
        // 18 * 1.4 + 2*8 + 2*2
        assert!((size.h - (25.2 + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_still_has_padding() {
        let measure = MonospaceMeasure::default();
        let style = resolve_style(NodeKind::Secondary, 1.0);
        let size = measure_box("", &style, &measure);
        assert_eq!(size.w, 8.0);
        assert!(size.h > 0.0);
    }

    #[test]
    fn test_scaled_aux_styles() {
        assert_eq!(LinkStyle::scaled(3.0).line_width, 3.0);
        assert_eq!(SelectionStyle::scaled(2.0).padding, 6.0);
        assert_eq!(InsertMarkStyle::scaled(0.5).width, 2.0);
    }
}
