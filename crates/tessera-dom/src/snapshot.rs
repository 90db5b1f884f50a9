//! Serialised element snapshots.
//!
//! A snapshot is what a headless browser hands over after parsing, cascading
//! and measuring a page: one JSON object per node carrying the computed style
//! and bounding box. [`Snapshot::into_tree`] turns it into a [`DomTree`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AttributesMap, DomRect, DomTree, ElementData, ImageSize, NodeId, NodeType, StyleMap, TextData};

/// Errors raised while loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The input is not valid snapshot JSON.
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// The root node is not an element.
    #[error("snapshot root must be an element")]
    EmptyRoot,
}

/// Size of the viewport the snapshot was measured in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels.
    pub width: f32,
    /// Height in CSS pixels.
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 900.0,
        }
    }
}

/// A measured document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Address the document was loaded from, used to resolve relative URLs.
    #[serde(default)]
    pub url: Option<String>,
    /// Viewport size at measurement time.
    #[serde(default)]
    pub viewport: Viewport,
    /// The document element.
    pub root: SnapshotNode,
}

/// One node of a snapshot.
///
/// A node with `text` and no `tag` is a text run; `"#comment"` as the tag
/// marks a comment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotNode {
    /// Element name.
    pub tag: Option<String>,
    /// Text content for text and comment nodes.
    pub text: Option<String>,
    /// Attributes.
    pub attrs: AttributesMap,
    /// Computed style.
    pub style: StyleMap,
    /// Author-declared style.
    pub declared: StyleMap,
    /// Border box.
    pub bounds: DomRect,
    /// Rendered line count of a text run.
    pub lines: Option<u32>,
    /// Natural image size.
    pub image: Option<ImageSize>,
    /// Child nodes in document order.
    pub children: Vec<SnapshotNode>,
}

impl Snapshot {
    /// Parses snapshot JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the element tree. The root snapshot node becomes the only child
    /// of the document node.
    pub fn into_tree(self) -> Result<DomTree, SnapshotError> {
        match self.root.tag.as_deref() {
            Some(tag) if tag != "#comment" => {}
            _ => return Err(SnapshotError::EmptyRoot),
        }
        let mut tree = DomTree::new();
        let mut pending = vec![(NodeId::ROOT, self.root)];
        while let Some((parent, node)) = pending.pop() {
            let SnapshotNode {
                tag,
                text,
                attrs,
                style,
                declared,
                bounds,
                lines,
                image,
                children,
            } = node;
            let node_type = match tag {
                Some(tag) if tag == "#comment" => NodeType::Comment(text.unwrap_or_default()),
                Some(tag) => NodeType::Element(ElementData {
                    tag_name: tag.to_ascii_lowercase(),
                    attrs,
                    style,
                    declared,
                    bounds,
                    image,
                }),
                None => NodeType::Text(TextData {
                    content: text.unwrap_or_default(),
                    bounds,
                    lines: lines.unwrap_or(1),
                }),
            };
            let id = tree.alloc(node_type);
            tree.append_child(parent, id);
            // Reversed so the stack pops children in document order.
            pending.extend(children.into_iter().rev().map(|child| (id, child)));
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_node_defaults_to_one_line() {
        let snapshot = Snapshot::from_json(
            r#"{"root": {"tag": "P", "children": [{"text": "hi"}]}}"#,
        )
        .unwrap();
        let tree = snapshot.into_tree().unwrap();
        let p = tree.document_element().unwrap();
        assert_eq!(tree.as_element(p).unwrap().tag_name, "p");
        let text = tree.first_child(p).unwrap();
        assert_eq!(tree.as_text(text).unwrap().lines, 1);
    }

    #[test]
    fn test_text_root_rejected() {
        let snapshot = Snapshot::from_json(r#"{"root": {"text": "loose"}}"#).unwrap();
        assert!(matches!(snapshot.into_tree(), Err(SnapshotError::EmptyRoot)));
    }
}
