//! Computed element tree for the tessera translators.
//!
//! DOM parsing and the CSS cascade happen elsewhere. What arrives here is the
//! result: every element with its attributes, its computed style, the style
//! values the author declared, and its measured border box. Text runs carry
//! their own measured box and line count.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. The
//! translators never mutate this tree; they build their own shadow tree from it.

pub mod snapshot;
pub mod style;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use snapshot::{Snapshot, SnapshotError, SnapshotNode, Viewport};
pub use style::StyleMap;

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// A measured rectangle in CSS pixels (the `getBoundingClientRect` equivalent).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DomRect {
    /// Left edge.
    #[serde(default)]
    pub x: f32,
    /// Top edge.
    #[serde(default)]
    pub y: f32,
    /// Border box width.
    #[serde(default)]
    pub width: f32,
    /// Border box height.
    #[serde(default)]
    pub height: f32,
}

impl DomRect {
    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Intrinsic size of a replaced element or background image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    /// Natural width in pixels.
    pub width: f32,
    /// Natural height in pixels.
    pub height: f32,
}

/// A node of the element tree with its structural links.
#[derive(Debug, Clone)]
pub struct Node {
    /// What this node is.
    pub node_type: NodeType,
    /// Parent node, `None` for the document.
    pub parent: Option<NodeId>,
    /// Ordered children.
    pub children: Vec<NodeId>,
}

/// The node kinds a snapshot can contain.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The document itself, always at [`NodeId::ROOT`].
    Document,
    /// An element with computed style and geometry.
    Element(ElementData),
    /// A text run.
    Text(TextData),
    /// A comment, kept only so indices match the source document.
    Comment(String),
}

/// Element-specific data.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Lowercase local name.
    pub tag_name: String,
    /// Attribute list.
    pub attrs: AttributesMap,
    /// Computed style (`getComputedStyle`).
    pub style: StyleMap,
    /// Author-declared values that computed style loses (`auto`, percentages).
    pub declared: StyleMap,
    /// Measured border box.
    pub bounds: DomRect,
    /// Natural size for images, or the first background image.
    pub image: Option<ImageSize>,
}

impl ElementData {
    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Text-specific data.
#[derive(Debug, Clone, Default)]
pub struct TextData {
    /// The raw text content.
    pub content: String,
    /// Union of the text's client rects.
    pub bounds: DomRect,
    /// Number of rendered lines reported by the measuring engine.
    pub lines: u32,
}

/// Arena-based element tree. Built once from a [`Snapshot`] and read-only
/// afterwards.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree with just the Document node.
    pub fn new() -> Self {
        DomTree {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Get a node by its ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Get the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get element data if this node is an element.
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text data if this node is a text node.
    pub fn as_text(&self, id: NodeId) -> Option<&TextData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(data) => Some(data),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes, in tree order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(text) = self.as_text(current) {
                out.push_str(&text.content);
            }
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// The first element child of the document (normally `<html>`).
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// The `<body>` element, or the document element when the snapshot was
    /// taken from a fragment without one.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        if self.as_element(html).is_some_and(|e| e.tag_name != "html") {
            return Some(html);
        }
        self.children(html)
            .iter()
            .find(|&&id| {
                self.as_element(id)
                    .is_some_and(|e| e.tag_name.eq_ignore_ascii_case("body"))
            })
            .copied()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
