//! Tab focus trap for the viewer overlay.

use crate::dom::{Document, NodeId};

/// Class marking a control the viewer has hidden for the current state.
pub const HIDDEN_CLASS: &str = "obsidium-hidden";

fn tab_index(doc: &Document, node: NodeId) -> i64 {
    doc.attribute(node, "tabindex")
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn is_focusable(doc: &Document, node: NodeId) -> bool {
    if doc.has_class(node, HIDDEN_CLASS) || doc.has_attribute(node, "inert") {
        return false;
    }
    let candidate = doc.tag(node) == Some("button")
        || doc.has_attribute(node, "href")
        || doc
            .attribute(node, "tabindex")
            .is_some_and(|v| v.trim() != "-1");
    candidate && doc.is_rendered(node)
}

/// Visible focusable controls under `root`, ordered by tab index.
pub fn focusable_controls(doc: &Document, root: NodeId) -> Vec<NodeId> {
    let mut controls: Vec<NodeId> = doc
        .descendants(root)
        .into_iter()
        .filter(|node| is_focusable(doc, *node))
        .collect();
    controls.sort_by_key(|node| tab_index(doc, *node));
    controls
}

/// Element that should receive focus after a Tab press, wrapping at both
/// ends. Focus outside the list goes to the first control.
pub fn next_focus(controls: &[NodeId], active: Option<NodeId>, backward: bool) -> Option<NodeId> {
    let first = *controls.first()?;
    let Some(pos) = active.and_then(|a| controls.iter().position(|c| *c == a)) else {
        return Some(first);
    };
    let len = controls.len();
    let next = if backward {
        (pos + len - 1) % len
    } else {
        (pos + 1) % len
    };
    controls.get(next).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(doc: &mut Document, parent: NodeId, tabindex: &str) -> NodeId {
        let b = doc.create_element("button");
        doc.set_attribute(b, "tabindex", tabindex);
        doc.append_child(parent, b);
        b
    }

    #[test]
    fn test_controls_sorted_and_filtered() {
        let mut doc = Document::new(1024.0);
        let root = doc.create_element("div");
        doc.append_child(doc.body(), root);
        let close = button(&mut doc, root, "1");
        let prev = button(&mut doc, root, "5");
        let next = button(&mut doc, root, "2");
        let hidden = button(&mut doc, root, "3");
        doc.add_class(hidden, HIDDEN_CLASS);
        let undisplayed = button(&mut doc, root, "4");
        doc.set_style(undisplayed, "display", "none");
        let skipped = doc.create_element("div");
        doc.set_attribute(skipped, "tabindex", "-1");
        doc.append_child(root, skipped);

        assert_eq!(focusable_controls(&doc, root), vec![close, next, prev]);
    }

    #[test]
    fn test_next_focus_wraps() {
        let mut doc = Document::new(1024.0);
        let a = doc.create_element("button");
        let b = doc.create_element("button");
        let c = doc.create_element("button");
        let list = [a, b, c];

        assert_eq!(next_focus(&list, None, false), Some(a));
        assert_eq!(next_focus(&list, Some(c), false), Some(a));
        assert_eq!(next_focus(&list, Some(a), true), Some(c));
        assert_eq!(next_focus(&list, Some(a), false), Some(b));
        assert_eq!(next_focus(&[], Some(a), false), None);
    }
}
