//! Arena-backed element tree used as the rendering surface.
//!
//! Nodes are addressed by [`NodeId`] keys. A removed node's key becomes stale;
//! mutators ignore stale keys and getters return `None`, so components never
//! panic on a node that a host already tore down.

use std::collections::BTreeMap;

use slotmap::{new_key_type, SlotMap};
use tracing::trace;

new_key_type! {
    /// Handle to an element in a [`Document`].
    pub struct NodeId;
}

/// Inner content of a leaf element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Plain text, escaped on serialization.
    Text(String),
    /// Trusted markup, emitted verbatim.
    Markup(String),
}

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    content: Option<Content>,
    client_width: Option<f64>,
    scroll_left: f64,
    smooth_scroll: bool,
    paused: bool,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }
}

/// A headless document: one `body` root, a viewport width and a focus cursor.
#[derive(Debug)]
pub struct Document {
    nodes: SlotMap<NodeId, Element>,
    body: NodeId,
    viewport_width: f64,
    active: Option<NodeId>,
}

impl Document {
    pub fn new(viewport_width: f64) -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(Element::new("body"));
        Self {
            nodes,
            body,
            viewport_width,
            active: None,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Window inner width as seen by components observing the viewport.
    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    // --- Tree structure ---

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.insert(Element::new(tag))
    }

    /// Appends `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.nodes.contains_key(parent) || !self.nodes.contains_key(child)
        {
            return;
        }
        self.detach(child);
        if let Some(el) = self.nodes.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.nodes.get_mut(parent) {
            el.children.push(child);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get(node).and_then(|el| el.parent);
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(parent) {
                p.children.retain(|c| *c != node);
            }
        }
        if let Some(el) = self.nodes.get_mut(node) {
            el.parent = None;
        }
    }

    /// Removes `node` and its whole subtree from the document.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(el) = self.nodes.remove(id) {
                stack.extend(el.children);
            }
            if self.active == Some(id) {
                self.active = None;
            }
        }
    }

    /// Removes every child subtree of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        let children = self
            .nodes
            .get(node)
            .map(|el| el.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove(child);
        }
    }

    pub fn exists(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|el| el.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|el| el.children.as_slice())
            .unwrap_or(&[])
    }

    /// True if `node` is reachable from `body`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == self.body {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// True if `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Depth-first, document-order list of the descendants of `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn descendants_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.tag(*id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    pub fn descendants_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    /// Finds an attached element by its `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    /// Nearest inclusive ancestor of `node` with the given tag.
    pub fn closest(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag)) {
                return Some(id);
            }
            cursor = self.parent(id);
        }
        None
    }

    /// Copies `node` and its subtree into new detached nodes.
    pub fn deep_clone(&mut self, node: NodeId) -> Option<NodeId> {
        let mut el = self.nodes.get(node)?.clone();
        let children = std::mem::take(&mut el.children);
        el.parent = None;
        let copy = self.nodes.insert(el);
        for child in children {
            if let Some(child_copy) = self.deep_clone(child) {
                self.append_child(copy, child_copy);
            }
        }
        Some(copy)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|el| el.tag.as_str())
    }

    // --- Attributes ---

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.attributes.remove(name);
        }
    }

    /// Reads a `data-*` attribute.
    pub fn data(&self, node: NodeId, key: &str) -> Option<&str> {
        self.attribute(node, &format!("data-{key}"))
    }

    pub fn set_data(&mut self, node: NodeId, key: &str, value: impl Into<String>) {
        self.set_attribute(node, &format!("data-{key}"), value);
    }

    // --- Classes ---

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    /// Toggles `class`, returning whether it is now present.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            self.has_class(node, class)
        }
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.nodes
            .get(node)
            .map(|el| el.classes.as_slice())
            .unwrap_or(&[])
    }

    // --- Inline style ---

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|el| el.style.get(property))
            .map(String::as_str)
    }

    /// Sets an inline style property; an empty value removes it.
    pub fn set_style(&mut self, node: NodeId, property: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(el) = self.nodes.get_mut(node) {
            if value.is_empty() {
                el.style.remove(property);
            } else {
                el.style.insert(property.to_string(), value);
            }
        }
    }

    // --- Content ---

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.content = Some(Content::Text(text.into()));
        }
    }

    pub fn set_markup(&mut self, node: NodeId, markup: impl Into<String>) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.content = Some(Content::Markup(markup.into()));
        }
    }

    pub fn clear_content(&mut self, node: NodeId) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.content = None;
        }
    }

    pub fn content(&self, node: NodeId) -> Option<&Content> {
        self.nodes.get(node).and_then(|el| el.content.as_ref())
    }

    /// Text or markup of `node`, or an empty string.
    pub fn text(&self, node: NodeId) -> &str {
        match self.content(node) {
            Some(Content::Text(t)) | Some(Content::Markup(t)) => t.as_str(),
            None => "",
        }
    }

    // --- Geometry, scrolling, focus, playback ---

    /// Layout width of `node`: the host-provided width, else the parent's,
    /// falling back to the viewport for the root.
    pub fn client_width(&self, node: NodeId) -> f64 {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if let Some(width) = self.nodes.get(id).and_then(|el| el.client_width) {
                return width;
            }
            cursor = self.parent(id);
        }
        self.viewport_width
    }

    pub fn set_client_width(&mut self, node: NodeId, width: f64) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.client_width = Some(width);
        }
    }

    pub fn scroll_left(&self, node: NodeId) -> f64 {
        self.nodes.get(node).map_or(0.0, |el| el.scroll_left)
    }

    /// Whether the last scroll of `node` requested smooth behavior.
    pub fn is_smooth_scrolling(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|el| el.smooth_scroll)
    }

    pub fn scroll_to(&mut self, node: NodeId, left: f64, smooth: bool) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.scroll_left = left.max(0.0);
            el.smooth_scroll = smooth;
        }
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active.filter(|id| self.nodes.contains_key(*id))
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.nodes.contains_key(node) {
            trace!(?node, "focus");
            self.active = Some(node);
        }
    }

    pub fn blur(&mut self, node: NodeId) {
        if self.active == Some(node) {
            self.active = None;
        }
    }

    pub fn pause(&mut self, node: NodeId) {
        if let Some(el) = self.nodes.get_mut(node) {
            el.paused = true;
        }
    }

    pub fn is_paused(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|el| el.paused)
    }

    /// Mirrors "has an offset parent": attached, and neither the node nor
    /// an ancestor is `display: none`.
    pub fn is_rendered(&self, node: NodeId) -> bool {
        if !self.is_attached(node) {
            return false;
        }
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if self.style(id, "display") == Some("none") {
                return false;
            }
            cursor = self.parent(id);
        }
        true
    }

    // Serialization helpers for the html module.

    pub(super) fn parts(
        &self,
        node: NodeId,
    ) -> Option<(
        &str,
        &BTreeMap<String, String>,
        &[String],
        &BTreeMap<String, String>,
        Option<&Content>,
    )> {
        self.nodes.get(node).map(|el| {
            (
                el.tag.as_str(),
                &el.attributes,
                el.classes.as_slice(),
                &el.style,
                el.content.as_ref(),
            )
        })
    }
}
