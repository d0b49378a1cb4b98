//! Arena-based page document.
//!
//! Nodes are stored in a flat `Vec` arena and linked by index. Removing a
//! node only unlinks it from its parent; the slot stays in the arena so
//! outstanding [`NodeId`]s never dangle. Every tree walk starts at the root,
//! so unlinked nodes are invisible to queries.

/// Index into the [`Document`]'s node arena.
pub type NodeId = usize;

// ------------------------------------------------------------------
// Node types
// ------------------------------------------------------------------

/// The page document.
#[derive(Debug, Clone)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub root: NodeId,
}

/// A single node in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// The kind of node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

/// Data associated with an Element node.
#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: TagName,
    pub attributes: Vec<Attribute>,
}

/// An element attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

// ------------------------------------------------------------------
// TagName
// ------------------------------------------------------------------

/// Tag names the switcher cares about. Everything else is `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagName {
    Html,
    Head,
    Body,
    Title,
    Meta,
    Link,
    Style,
    Script,
    Div,
    Unknown(String),
}

impl TagName {
    /// Parse a lowercase tag name string into a `TagName` variant.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s {
            "html" => Self::Html,
            "head" => Self::Head,
            "body" => Self::Body,
            "title" => Self::Title,
            "meta" => Self::Meta,
            "link" => Self::Link,
            "style" => Self::Style,
            "script" => Self::Script,
            "div" => Self::Div,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Get the string representation of this tag name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Html => "html",
            Self::Head => "head",
            Self::Body => "body",
            Self::Title => "title",
            Self::Meta => "meta",
            Self::Link => "link",
            Self::Style => "style",
            Self::Script => "script",
            Self::Div => "div",
            Self::Unknown(s) => s.as_str(),
        }
    }

    /// Returns `true` if this is a void element (no content, no end tag).
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Link | Self::Meta)
    }
}

// ------------------------------------------------------------------
// ElementData
// ------------------------------------------------------------------

impl ElementData {
    /// Create a new `ElementData` with the given tag and no attributes.
    pub fn new(tag: TagName) -> Self {
        Self {
            tag,
            attributes: Vec::new(),
        }
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Remove an attribute. Returns the old value if it was present.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(idx).value)
    }

    /// Iterate over the whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.get_attribute("class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    /// Check if this element has a given CSS class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class token if it is not already present.
    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }
        let mut tokens: Vec<&str> = self.classes().collect();
        tokens.push(class);
        let joined = tokens.join(" ");
        self.set_attribute("class", &joined);
    }

    /// Remove every class token matching `pred`. Returns how many were removed.
    pub fn remove_classes_where(&mut self, pred: impl Fn(&str) -> bool) -> usize {
        let before: Vec<&str> = self.classes().collect();
        let kept: Vec<&str> = before.iter().copied().filter(|c| !pred(c)).collect();
        let removed = before.len() - kept.len();
        if removed > 0 {
            let joined = kept.join(" ");
            self.set_attribute("class", &joined);
        }
        removed
    }

    /// Get the `id` attribute if present.
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Get the `href` attribute if present.
    pub fn href(&self) -> Option<&str> {
        self.get_attribute("href")
    }

    /// Returns `true` for `<link rel="stylesheet" href=...>`.
    pub fn is_stylesheet_link(&self) -> bool {
        self.tag == TagName::Link
            && self.href().is_some()
            && self
                .get_attribute("rel")
                .map(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("stylesheet"))
                })
                .unwrap_or(false)
    }
}

// ------------------------------------------------------------------
// Document
// ------------------------------------------------------------------

impl Document {
    /// Create an empty document with a synthetic `Document` root node.
    pub fn new() -> Self {
        let root_node = Node {
            kind: NodeKind::Document,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root_node],
            root: 0,
        }
    }

    /// Create a skeleton page: `<html><head></head><body></body></html>`.
    pub fn page() -> Self {
        let mut doc = Self::new();
        let html = doc.create_element(TagName::Html, &[]);
        let head = doc.create_element(TagName::Head, &[]);
        let body = doc.create_element(TagName::Body, &[]);
        doc.append_child(doc.root, html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc
    }

    /// Add a new node to the arena and return its [`NodeId`].
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Add a detached element with the given attributes.
    pub fn create_element(&mut self, tag: TagName, attrs: &[(&str, &str)]) -> NodeId {
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            data.set_attribute(name, value);
        }
        self.add_node(NodeKind::Element(data))
    }

    /// Append `child_id` as the last child of `parent_id`.
    ///
    /// A child that is already linked somewhere is moved.
    pub fn append_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        self.detach(child_id);
        self.nodes[parent_id].children.push(child_id);
        self.nodes[child_id].parent = Some(parent_id);
    }

    /// Insert `new_id` as the next sibling of `reference`.
    ///
    /// Returns `false` (and does nothing) when `reference` has no parent.
    pub fn insert_after(&mut self, reference: NodeId, new_id: NodeId) -> bool {
        let Some(parent) = self.nodes[reference].parent else {
            return false;
        };
        self.detach(new_id);
        let siblings = &mut self.nodes[parent].children;
        let pos = siblings
            .iter()
            .position(|&c| c == reference)
            .map(|p| p + 1)
            .unwrap_or(siblings.len());
        siblings.insert(pos, new_id);
        self.nodes[new_id].parent = Some(parent);
        true
    }

    /// Unlink a node from its parent. The node keeps its own subtree.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|&c| c != id);
        }
    }

    /// Returns `true` if the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.nodes[cur].parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Get a reference to a node by ID.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Get the [`ElementData`] for a node, if it is an `Element`.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable access to the [`ElementData`] for a node.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id].kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Find the first element whose `id` attribute matches `target`.
    pub fn get_element_by_id(&self, target: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.element(id).and_then(|e| e.id()) == Some(target))
    }

    /// The `<html>` element.
    pub fn html(&self) -> Option<NodeId> {
        self.find_first_element(&TagName::Html)
    }

    /// The `<head>` element.
    pub fn head(&self) -> Option<NodeId> {
        self.find_first_element(&TagName::Head)
    }

    /// The `<body>` element.
    pub fn body(&self) -> Option<NodeId> {
        self.find_first_element(&TagName::Body)
    }

    /// All elements with the given tag, in document order.
    pub fn elements_by_tag(&self, tag: &TagName) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.tag == *tag))
            .collect()
    }

    /// All `<link rel="stylesheet">` elements, in document order.
    pub fn stylesheet_links(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.is_stylesheet_link()))
            .collect()
    }

    /// Append a `<link rel="stylesheet">` to `<head>` (creating neither
    /// `<head>` nor `<html>`; falls back to the root).
    pub fn append_stylesheet(&mut self, href: &str) -> NodeId {
        let link = self.create_element(
            TagName::Link,
            &[("rel", "stylesheet"), ("type", "text/css"), ("href", href)],
        );
        let parent = self.head().unwrap_or(self.root);
        self.append_child(parent, link);
        link
    }

    /// Append a `<div id=...>` to `<body>`.
    pub fn append_div(&mut self, id: &str) -> NodeId {
        let div = self.create_element(TagName::Div, &[("id", id)]);
        let parent = self.body().unwrap_or(self.root);
        self.append_child(parent, div);
        div
    }

    /// Pre-order walk of the subtree under `start` (excluding `start`).
    fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[start].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        out
    }

    fn find_first_element(&self, tag: &TagName) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| self.element(id).is_some_and(|e| e.tag == *tag))
    }

    /// Serialize the document as indented HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for &child in &self.nodes[self.root].children {
            self.write_node(child, 0, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match &self.nodes[id].kind {
            NodeKind::Document => {},
            NodeKind::Text(s) => {
                out.push_str(&indent);
                out.push_str(&escape(s));
                out.push('\n');
            },
            NodeKind::Element(data) => {
                out.push_str(&indent);
                out.push('<');
                out.push_str(data.tag.as_str());
                for attr in &data.attributes {
                    out.push_str(&format!(" {}=\"{}\"", attr.name, escape(&attr.value)));
                }
                if data.tag.is_void() {
                    out.push_str(" />\n");
                    return;
                }
                out.push_str(">\n");
                for &child in &self.nodes[id].children {
                    self.write_node(child, depth + 1, out);
                }
                out.push_str(&indent);
                out.push_str(&format!("</{}>\n", data.tag.as_str()));
            },
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------
