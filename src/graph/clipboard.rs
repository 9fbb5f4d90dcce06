//! Detached subtree copies used by copy/cut/paste.

use super::node::{NodeId, NodeKind};

/// Deep copy of a subtree, detached from any tree.
///
/// The copy owns its children directly, so there are no parent links to
/// sever. Ids are the ones the nodes had when copied; pasting always assigns
/// fresh ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtree {
    pub id: NodeId,
    pub kind: NodeKind,
    pub text: String,
    pub annotation: String,
    pub children: Vec<Subtree>,
}

impl Subtree {
    /// Number of nodes in the copy, including its root.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Subtree::len).sum::<usize>()
    }

    /// A subtree always contains at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Texts in breadth-first order, root first.
    pub fn texts_breadth_first(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.len());
        let mut queue = std::collections::VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            out.push(node.text.as_str());
            queue.extend(node.children.iter());
        }
        out
    }
}

/// Single-slot copy buffer. Last write wins; reading does not clear it.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<Subtree>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Replace the buffer contents.
    pub fn store(&mut self, subtree: Subtree) {
        self.slot = Some(subtree);
    }

    pub fn contents(&self) -> Option<&Subtree> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: u32, text: &str) -> Subtree {
        Subtree {
            id: NodeId(id),
            kind: NodeKind::Secondary,
            text: text.to_string(),
            annotation: String::new(),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_len_and_breadth_first_order() {
        let mut a = leaf(1, "a");
        let mut b = leaf(2, "b");
        b.children.push(leaf(4, "d"));
        a.children.push(b);
        a.children.push(leaf(3, "c"));

        assert_eq!(a.len(), 4);
        assert_eq!(a.texts_breadth_first(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_clipboard_last_write_wins() {
        let mut clipboard = Clipboard::new();
        assert!(clipboard.is_empty());

        clipboard.store(leaf(1, "first"));
        clipboard.store(leaf(2, "second"));
        assert_eq!(clipboard.contents().map(|s| s.text.as_str()), Some("second"));

        // Reading leaves the slot intact.
        assert!(clipboard.contents().is_some());
        clipboard.clear();
        assert!(clipboard.is_empty());
    }
}
