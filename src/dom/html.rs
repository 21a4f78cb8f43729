//! HTML serialization of a [`Document`] subtree.

use std::fmt::Write;

use super::document::{Content, Document, NodeId};

const VOID_ELEMENTS: [&str; 7] = ["img", "br", "input", "meta", "link", "hr", "source"];

pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serializes `node` and its subtree.
pub fn to_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

/// Serializes only the children of `node`.
pub fn inner_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_inner(doc, node, &mut out);
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    let Some((tag, attributes, classes, style, _)) = doc.parts(node) else {
        return;
    };

    out.push('<');
    out.push_str(tag);

    // `class` and `style` live outside the attribute map; merge them in name order.
    let mut attrs: Vec<(&str, String)> = attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.clone()))
        .collect();
    if !classes.is_empty() {
        attrs.push(("class", classes.join(" ")));
    }
    if !style.is_empty() {
        let css = style
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        attrs.push(("style", css));
    }
    attrs.sort_by(|a, b| a.0.cmp(b.0));

    for (name, value) in attrs {
        if value.is_empty() {
            let _ = write!(out, " {name}");
        } else {
            let _ = write!(out, " {name}=\"{}\"", escape_attr(&value));
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&tag) {
        return;
    }
    write_inner(doc, node, out);
    let _ = write!(out, "</{tag}>");
}

fn write_inner(doc: &Document, node: NodeId, out: &mut String) {
    match doc.content(node) {
        Some(Content::Text(text)) => out.push_str(&escape_text(text)),
        Some(Content::Markup(markup)) => out.push_str(markup),
        None => {}
    }
    for child in doc.children(node) {
        write_node(doc, *child, out);
    }
}
