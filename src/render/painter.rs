//! Paints a laid-out tree onto a [`Surface`].
//!
//! Drawing happens with the surface translated to the model origin's screen
//! position; model coordinates are multiplied by the scale and styles are
//! resolved at that scale. Order: nodes and their outgoing links in
//! pre-order, then the drag overlay, then the selection outline on top.

use super::surface::Surface;
use crate::geometry::{Rect, Vec2};
use crate::graph::{MapNode, MapTree, NodeId};
use crate::style::{resolve_style, InsertMarkStyle, LinkStyle, SelectionStyle};
use crate::viewport::Viewport;

/// Drag preview state passed in by the interaction layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOverlay {
    pub node: NodeId,
    /// Pointer position in model space.
    pub pointer: Vec2,
    pub drop_target: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub nodes: usize,
    pub links: usize,
}

pub fn paint<S: Surface + ?Sized>(
    surface: &mut S,
    tree: &MapTree,
    viewport: &Viewport,
    drag: Option<DragOverlay>,
) -> PaintStats {
    let scale = viewport.scale();
    surface.reset_transform();
    surface.clear();
    surface.translate(viewport.origin());

    let mut stats = PaintStats::default();
    let link_style = LinkStyle::scaled(scale);
    for id in tree.pre_order() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        paint_node(surface, node, node.position(), scale);
        stats.nodes += 1;
        for child in node.children().iter().filter_map(|&c| tree.node(c)) {
            paint_link(surface, node, child, scale, &link_style);
            stats.links += 1;
        }
    }

    if let Some(drag) = drag {
        paint_drag(surface, tree, drag, scale);
    }

    if let Some(selected) = tree.selected().and_then(|id| tree.node(id)) {
        let style = SelectionStyle::scaled(scale);
        let outline = scaled_box(selected.bounds(), scale).inflate(style.padding + style.outline_width / 2.0);
        surface.stroke_rect(outline, style.outline_color, style.outline_width);
    }

    stats
}

fn scaled_box(rect: Rect, scale: f64) -> Rect {
    Rect::new(rect.x * scale, rect.y * scale, rect.w * scale, rect.h * scale)
}

fn paint_node<S: Surface + ?Sized>(surface: &mut S, node: &MapNode, at: Vec2, scale: f64) {
    let style = resolve_style(node.kind(), scale);
    let dragging = node.state().is_dragging();
    let (color, background, border_color) = if dragging {
        (style.dragging_color, style.dragging_background, style.dragging_border_color)
    } else {
        (style.color, style.background, style.border_color)
    };

    let outer = scaled_box(Rect::from_origin_size(at, node.box_size()), scale);
    let border = style.border_width;
    surface.fill_rect(outer.inflate(-border), background);
    if border > 0.0 {
        surface.stroke_rect(outer.inflate(-border / 2.0), border_color, border);
    }

    surface.set_font(&style.font());
    let baseline = Vec2::new(
        outer.x + style.padding + border,
        outer.y + style.padding + border + style.font_size,
    );
    surface.fill_text(node.text(), baseline, color);
}

/// Curve from the parent's right edge to the child's left edge, both at
/// mid-height.
fn paint_link<S: Surface + ?Sized>(
    surface: &mut S,
    parent: &MapNode,
    child: &MapNode,
    scale: f64,
    style: &LinkStyle,
) {
    let p = parent.bounds();
    let c = child.bounds();
    let from = Vec2::new(p.x + p.w, p.y + p.h / 2.0) * scale;
    let to = Vec2::new(c.x, c.y + c.h / 2.0) * scale;
    let control = Vec2::new(from.x + style.cp2_ratio * (to.x - from.x), to.y);
    surface.quadratic_curve(from, control, to, style.line_color, style.line_width);
}

/// Ghost of the dragged node at the pointer and a bar above the drop target.
fn paint_drag<S: Surface + ?Sized>(surface: &mut S, tree: &MapTree, drag: DragOverlay, scale: f64) {
    if let Some(target) = drag.drop_target.and_then(|id| tree.node(id)) {
        let mark = InsertMarkStyle::scaled(scale);
        let rect = scaled_box(target.bounds(), scale);
        surface.fill_rect(Rect::new(rect.x, rect.y - mark.width * 1.5, rect.w, mark.width), mark.color);
    }
    if let Some(node) = tree.node(drag.node) {
        let size = node.box_size();
        let at = drag.pointer - Vec2::new(size.w / 2.0, size.h / 2.0);
        paint_node(surface, node, at, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::geometry::Size;
    use crate::layout::{LayoutMode, StackTreeLayout};
    use crate::render::surface::{DrawCommand, RecordingSurface};
    use crate::style::MonospaceMeasure;

    fn laid_out() -> (MapTree, NodeId, NodeId) {
        let config = MapConfig::default();
        let mut tree = MapTree::new(Box::new(MonospaceMeasure::default()), &config);
        let r = tree.root_id();
        let a = tree.insert(r, Some("A"), None).unwrap();
        let b = tree.insert(r, Some("B"), None).unwrap();
        StackTreeLayout::new().apply(&mut tree, LayoutMode::Full);
        (tree, a, b)
    }

    #[test]
    fn test_paint_order_and_counts() {
        let (mut tree, a, _) = laid_out();
        tree.select(Some(a)).unwrap();
        let viewport = Viewport::new(Size::new(400.0, 300.0), &MapConfig::default());
        let mut surface = RecordingSurface::new(Size::new(400.0, 300.0));

        let stats = paint(&mut surface, &tree, &viewport, None);
        assert_eq!(stats, PaintStats { nodes: 3, links: 2 });
        assert_eq!(surface.texts(), vec!["Main Theme", "A", "B"]);

        let commands = surface.commands();
        assert_eq!(commands[0], DrawCommand::ResetTransform);
        assert_eq!(commands[1], DrawCommand::Clear);
        assert_eq!(commands[2], DrawCommand::Translate(Vec2::new(200.0, 150.0)));
        assert!(matches!(
            commands.last(),
            Some(DrawCommand::StrokeRect { color, .. }) if color == "#3f8cff"
        ));
    }

    #[test]
    fn test_link_endpoints_follow_scale() {
        let (tree, a, _) = laid_out();
        let mut viewport = Viewport::new(Size::new(400.0, 300.0), &MapConfig::default());
        viewport.set_scale(2.0);
        let mut surface = RecordingSurface::new(Size::new(400.0, 300.0));
        paint(&mut surface, &tree, &viewport, None);

        let root = tree.node(tree.root_id()).unwrap().bounds();
        let child = tree.node(a).unwrap().bounds();
        let first_curve = surface
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::Curve { from, to, line_width, .. } => Some((*from, *to, *line_width)),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_curve.0, Vec2::new((root.x + root.w) * 2.0, (root.y + root.h / 2.0) * 2.0));
        assert_eq!(first_curve.1, Vec2::new(child.x * 2.0, (child.y + child.h / 2.0) * 2.0));
        assert_eq!(first_curve.2, 2.0);
    }

    #[test]
    fn test_drag_overlay_draws_ghost_and_mark() {
        let (tree, a, b) = laid_out();
        let viewport = Viewport::new(Size::new(400.0, 300.0), &MapConfig::default());
        let mut surface = RecordingSurface::new(Size::new(400.0, 300.0));
        let overlay = DragOverlay {
            node: a,
            pointer: Vec2::new(10.0, 10.0),
            drop_target: Some(b),
        };
        paint(&mut surface, &tree, &viewport, Some(overlay));

        assert_eq!(surface.texts(), vec!["Main Theme", "A", "B", "A"]);
        let marks = surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { color, .. } if color == InsertMarkStyle::BASE.color))
            .count();
        assert_eq!(marks, 1);
    }
}
