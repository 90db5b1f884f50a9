//! HTML serialisation of the element tree.
//!
//! Attributes are written in name order so output is stable across runs.
//! Computed style is not serialised; the author's `style` attribute is.

use std::fmt::Write;

use tessera_dom::{DomTree, NodeId, NodeType};

/// Elements without an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text is written unescaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Escapes text content.
#[must_use]
pub fn escape_text(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Escapes a double-quoted attribute value.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Serialises the document. `rewrite` receives `(tag, attribute, value)` for
/// every attribute and returns the value to write.
#[must_use]
pub fn serialize(tree: &DomTree, rewrite: &dyn Fn(&str, &str, &str) -> String) -> String {
    let mut out = String::new();
    if tree
        .document_element()
        .and_then(|id| tree.as_element(id))
        .is_some_and(|element| element.tag_name == "html")
    {
        out.push_str("<!DOCTYPE html>\n");
    }
    for &child in tree.children(NodeId::ROOT) {
        write_node(&mut out, tree, child, rewrite, false);
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn write_node(out: &mut String, tree: &DomTree, id: NodeId, rewrite: &dyn Fn(&str, &str, &str) -> String, raw: bool) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => {
            for &child in tree.children(id) {
                write_node(out, tree, child, rewrite, raw);
            }
        }
        NodeType::Element(element) => {
            let tag = element.tag_name.as_str();
            let _ = write!(out, "<{tag}");
            let mut names: Vec<&String> = element.attrs.keys().collect();
            names.sort();
            for name in names {
                let value = rewrite(tag, name, &element.attrs[name]);
                if value.is_empty() {
                    let _ = write!(out, " {name}");
                } else {
                    let _ = write!(out, " {name}=\"{}\"", escape_attribute(&value));
                }
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&tag);
            for &child in tree.children(id) {
                write_node(out, tree, child, rewrite, raw);
            }
            let _ = write!(out, "</{tag}>");
        }
        NodeType::Text(text) => {
            if raw {
                out.push_str(&text.content);
            } else {
                out.push_str(&escape_text(&text.content));
            }
        }
        NodeType::Comment(comment) => {
            let _ = write!(out, "<!--{comment}-->");
        }
    }
}

#[cfg(test)]
mod tests {
    use tessera_dom::Snapshot;

    use super::*;

    #[test]
    fn test_void_and_raw_text_elements() {
        let tree = Snapshot::from_json(
            r#"{"root": {"tag": "body", "children": [
                {"tag": "img", "attrs": {"src": "a.png", "alt": "1 < 2"}},
                {"tag": "script", "children": [{"text": "if (a < b) {}"}]},
                {"tag": "p", "children": [{"text": "a & b"}]}
            ]}}"#,
        )
        .and_then(Snapshot::into_tree)
        .unwrap();
        let html = serialize(&tree, &|_, _, value| value.to_string());
        assert_eq!(
            html,
            "<body><img alt=\"1 < 2\" src=\"a.png\"><script>if (a < b) {}</script><p>a &amp; b</p></body>\n"
        );
    }
}
