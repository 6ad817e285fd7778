//! Markup serialization

use std::fmt::Write;

use crate::document::{Document, NodeId, NodeKind};

/// Escape text content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}

impl Document {
    /// Serialize a node and its subtree
    pub fn to_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id);
        out
    }

    /// Serialize the children of a node
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(&mut out, child);
        }
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        match self.kind(id) {
            Ok(NodeKind::Document) => {
                for &child in self.children(id) {
                    self.write_node(out, child);
                }
            }
            Ok(NodeKind::Text(text)) => out.push_str(&escape_text(text)),
            Ok(NodeKind::Markup(markup)) => out.push_str(markup),
            Ok(NodeKind::Element(el)) => {
                let _ = write!(out, "<{}", el.tag_name());
                for (name, value) in el.attributes() {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{}\"", escape_attribute(&value));
                    }
                }
                out.push('>');
                if el.is_void() {
                    return;
                }
                if el.tag_name() == "textarea" {
                    out.push_str(&escape_text(&el.value));
                } else {
                    for &child in self.children(id) {
                        self.write_node(out, child);
                    }
                }
                let _ = write!(out, "</{}>", el.tag_name());
            }
            Err(_) => {}
        }
    }
}
