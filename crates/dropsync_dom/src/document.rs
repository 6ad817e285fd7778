//! Document tree
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Nodes are never
//! freed; removing a node only detaches it, so an id handed out by a
//! document stays valid for that document's lifetime.

use std::fmt;

use crate::element::Element;
use crate::error::{DomError, Result};

/// Handle to a node in a [`Document`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Convert to a raw value for event targets
    pub fn to_raw(self) -> u64 {
        self.0 as u64
    }

    /// Reconstruct from a raw event target
    pub fn from_raw(raw: u64) -> Self {
        NodeId(raw as usize)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node holds
#[derive(Clone, Debug)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    /// Opaque markup fragment, e.g. a server response inserted as-is
    Markup(String),
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

/// An in-memory HTML document
#[derive(Clone, Debug)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    active_element: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            body: NodeId(0),
            active_element: None,
        };
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.attach(doc.root, html, None);
        doc.attach(html, head, None);
        doc.attach(html, body, None);
        doc.body = body;
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Node creation
    // =========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag_name)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Create a detached markup node
    pub fn create_markup(&mut self, markup: &str) -> NodeId {
        self.push(NodeKind::Markup(markup.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    // =========================================================================
    // Node access
    // =========================================================================

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Result<&Element> {
        match &self.node(id)?.kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Ok(el),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    /// Lowercase tag name, `None` for non-elements
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(Element::tag_name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Next sibling that is an element
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    /// Whether `node` is `ancestor` or lies below it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Whether the node is attached to the document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Descendants of `scope` in document (pre-)order, excluding `scope`
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // =========================================================================
    // Tree mutation
    // =========================================================================

    /// Append `child` to `parent`, detaching it from its old parent first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.attach(parent, child, None);
        Ok(())
    }

    /// Insert `child` into `parent` before `reference` (or at the end)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        self.check_insert(parent, child)?;
        if let Some(reference) = reference {
            if reference == child {
                return Ok(());
            }
            if self.parent(reference) != Some(parent) {
                return Err(DomError::HierarchyRequest(format!(
                    "{reference} is not a child of {parent}"
                )));
            }
        }
        self.detach(child);
        self.attach(parent, child, reference);
        Ok(())
    }

    /// Detach a node from its parent
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        if self.active_element.is_some_and(|active| self.contains(id, active)) {
            self.active_element = None;
        }
        self.detach(id);
        Ok(())
    }

    /// Append a new text node to `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        let text = self.create_text(text);
        self.append_child(parent, text)?;
        Ok(text)
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        self.node(child)?;
        match parent_node.kind {
            NodeKind::Document => {}
            NodeKind::Element(ref el) if !el.is_void() => {}
            _ => {
                return Err(DomError::HierarchyRequest(format!(
                    "{parent} cannot have children"
                )))
            }
        }
        if matches!(self.node(child)?.kind, NodeKind::Document) {
            return Err(DomError::HierarchyRequest(
                "the document node cannot be inserted".to_string(),
            ));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest(format!(
                "{child} is an ancestor of {parent}"
            )));
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        let children = &mut self.nodes[parent.0].children;
        let pos = before
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        children.insert(pos, child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn clear_children(&mut self, id: NodeId) {
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        if self.active_element.is_some_and(|active| !self.is_connected(active)) {
            self.active_element = None;
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        self.element(id).ok().and_then(|el| el.attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_ok_and(|el| el.has_attribute(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut(id)?.set_attribute(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<()> {
        self.element_mut(id)?.remove_attribute(name);
        Ok(())
    }

    /// `data-*` attribute, addressed by the part after `data-`
    pub fn data_attribute(&self, id: NodeId, key: &str) -> Option<String> {
        self.attribute(id, &format!("data-{key}"))
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.root).into_iter().find(|&n| {
            self.attribute(n, "id").as_deref() == Some(element_id)
        })
    }

    // =========================================================================
    // Classes and inline style
    // =========================================================================

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_ok_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        self.element_mut(id)?.add_class(class);
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<()> {
        self.element_mut(id)?.remove_class(class);
        Ok(())
    }

    /// Toggle a class, returning whether it is now present
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> Result<bool> {
        let el = self.element_mut(id)?;
        if el.has_class(class) {
            el.remove_class(class);
            Ok(false)
        } else {
            el.add_class(class);
            Ok(true)
        }
    }

    /// Add or remove a class depending on `on`
    pub fn set_class(&mut self, id: NodeId, class: &str, on: bool) -> Result<()> {
        let el = self.element_mut(id)?;
        if on {
            el.add_class(class);
        } else {
            el.remove_class(class);
        }
        Ok(())
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        self.element(id)
            .ok()
            .and_then(|el| el.style(property))
            .map(str::to_string)
    }

    /// Set an inline style property; an empty value removes it
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) -> Result<()> {
        self.element_mut(id)?.set_style(property, value);
        Ok(())
    }

    // =========================================================================
    // Text and markup content
    // =========================================================================

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        match self.nodes.get(id.0).map(|n| &n.kind) {
            Some(NodeKind::Text(text)) => text.clone(),
            Some(NodeKind::Markup(_)) | None => String::new(),
            Some(NodeKind::Document | NodeKind::Element(_)) => self
                .children(id)
                .iter()
                .map(|&c| self.text_content(c))
                .collect(),
        }
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<()> {
        self.element(id)?;
        self.clear_children(id);
        if !text.is_empty() {
            let text = self.create_text(text);
            self.attach(id, text, None);
        }
        Ok(())
    }

    /// Replace all children with an opaque markup fragment
    pub fn set_inner_markup(&mut self, id: NodeId, markup: &str) -> Result<()> {
        self.element(id)?;
        tracing::trace!("document: replacing children of {} with {} bytes of markup", id, markup.len());
        self.clear_children(id);
        if !markup.is_empty() {
            let fragment = self.create_markup(markup);
            self.attach(id, fragment, None);
        }
        Ok(())
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Move focus; `None` blurs. Detached nodes cannot take focus.
    pub fn focus(&mut self, id: Option<NodeId>) -> Result<()> {
        if let Some(id) = id {
            self.element(id)?;
            if !self.is_connected(id) {
                return Err(DomError::HierarchyRequest(format!(
                    "{id} is not connected and cannot be focused"
                )));
            }
        }
        self.active_element = id;
        Ok(())
    }
}
