//! Left-to-right stacked tree layout.
//!
//! The root box is centered on the model origin. Every node's children form a
//! column to its right, `H_GAP` past its box. Each child reserves exactly its
//! subtree footprint height in that column, consecutive reservations are
//! `V_GAP` apart, and the column starts at the top of the parent's own
//! footprint band (the footprint height centered on the parent box). When the
//! parent box is taller than its children's stack, the column therefore hangs
//! from the top of that box. Each child box is centered within its own
//! reservation.
//!
//! Because reservations come straight from the cached footprints, one
//! pre-order pass places the whole tree in O(n).

use crate::geometry::{Rect, Vec2};
use crate::graph::{MapTree, NodeId};

/// What a layout pass should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Recompute every position.
    Full,
    /// Keep cached positions; only report bounds.
    RepaintOnly,
}

/// Result of a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSummary {
    /// Number of nodes visited.
    pub nodes: usize,
    /// Union of all node boxes, in model space.
    pub bounds: Rect,
}

/// The stacked tree layout engine. Spacing comes from the tree itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackTreeLayout;

impl StackTreeLayout {
    pub fn new() -> Self {
        Self
    }

    /// Run a layout pass over `tree`.
    pub fn apply(&self, tree: &mut MapTree, mode: LayoutMode) -> LayoutSummary {
        if mode == LayoutMode::Full {
            self.place(tree);
        }
        Self::summarize(tree)
    }

    fn place(&self, tree: &mut MapTree) {
        let h_gap = tree.h_gap();
        let v_gap = tree.v_gap();
        let root = tree.root_id();
        let Some(root_box) = tree.node(root).map(|n| n.box_size()) else {
            return;
        };
        tree.set_position(root, Vec2::new(-root_box.w / 2.0, -root_box.h / 2.0));

        let mut stack: Vec<NodeId> = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = tree.node(id) else {
                continue;
            };
            if node.children().is_empty() {
                continue;
            }
            let origin = node.position();
            let box_size = node.box_size();
            let band = node.footprint().h;
            let children = node.children().to_vec();

            let column: Vec<_> = children
                .iter()
                .filter_map(|&child| tree.node(child).map(|c| (child, c.box_size(), c.footprint())))
                .collect();

            let x = origin.x + box_size.w + h_gap;
            let mut cursor = origin.y + box_size.h / 2.0 - band / 2.0;
            for (child, child_box, footprint) in column {
                let y = cursor + footprint.h / 2.0 - child_box.h / 2.0;
                tree.set_position(child, Vec2::new(x, y));
                cursor += footprint.h + v_gap;
            }

            stack.extend(children.iter().rev().copied());
        }
    }

    fn summarize(tree: &MapTree) -> LayoutSummary {
        let mut nodes = 0;
        let mut bounds: Option<Rect> = None;
        for id in tree.pre_order() {
            let Some(node) = tree.node(id) else {
                continue;
            };
            nodes += 1;
            let rect = node.bounds();
            bounds = Some(match bounds {
                Some(acc) => acc.union(&rect),
                None => rect,
            });
        }
        LayoutSummary {
            nodes,
            bounds: bounds.unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0)),
        }
    }
}
