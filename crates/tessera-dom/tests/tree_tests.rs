//! Tests for the element tree and snapshot loading.

use tessera_dom::{DomTree, ElementData, NodeId, NodeType, Snapshot, TextData};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData {
        tag_name: tag.to_string(),
        ..Default::default()
    }))
}

fn alloc_text(tree: &mut DomTree, content: &str) -> NodeId {
    tree.alloc(NodeType::Text(TextData {
        content: content.to_string(),
        ..Default::default()
    }))
}

// ========== structure ==========

#[test]
fn test_append_child_links_parent() {
    let mut tree = DomTree::new();
    let list = alloc_element(&mut tree, "ul");
    tree.append_child(NodeId::ROOT, list);
    let first = alloc_element(&mut tree, "li");
    let second = alloc_element(&mut tree, "li");
    tree.append_child(list, first);
    tree.append_child(list, second);

    assert_eq!(tree.children(list), &[first, second]);
    assert_eq!(tree.parent(second), Some(list));
    assert_eq!(tree.first_child(list), Some(first));
    assert_eq!(tree.len(), 4);
}

#[test]
fn test_body_of_full_document_and_fragment() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, head);
    tree.append_child(html, body);
    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.body(), Some(body));

    let mut fragment = DomTree::new();
    let section = alloc_element(&mut fragment, "section");
    fragment.append_child(NodeId::ROOT, section);
    assert_eq!(fragment.body(), Some(section));
    assert_eq!(DomTree::new().body(), None);
}

#[test]
fn test_text_content_in_document_order() {
    let mut tree = DomTree::new();
    let p = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, p);
    let hello = alloc_text(&mut tree, "Hello ");
    let em = alloc_element(&mut tree, "em");
    let world = alloc_text(&mut tree, "world");
    tree.append_child(p, hello);
    tree.append_child(p, em);
    tree.append_child(em, world);

    assert_eq!(tree.text_content(p), "Hello world");
}

// ========== snapshots ==========

#[test]
fn test_snapshot_builds_tree_with_style_and_bounds() {
    let json = r##"{
        "url": "https://example.com/index.html",
        "viewport": {"width": 400, "height": 800},
        "root": {
            "tag": "html",
            "children": [{
                "tag": "body",
                "style": {"display": "block", "margin-top": "8px"},
                "bounds": {"x": 0, "y": 0, "width": 400, "height": 120},
                "children": [
                    {"tag": "img", "attrs": {"src": "a.png"}, "image": {"width": 64, "height": 32}},
                    {"tag": "#comment", "text": "note"},
                    {"text": "caption", "lines": 2}
                ]
            }]
        }
    }"##;
    let snapshot = Snapshot::from_json(json).unwrap();
    assert_eq!(snapshot.viewport.width, 400.0);
    let tree = snapshot.into_tree().unwrap();

    let body = tree.body().unwrap();
    let data = tree.as_element(body).unwrap();
    assert_eq!(data.style.get("marginTop"), Some("8px"));
    assert_eq!(data.bounds.height, 120.0);

    let children = tree.children(body);
    assert_eq!(children.len(), 3);
    let img = tree.as_element(children[0]).unwrap();
    assert_eq!(img.attr("src"), Some("a.png"));
    assert_eq!(img.image.unwrap().width, 64.0);
    assert!(matches!(
        tree.get(children[1]).unwrap().node_type,
        NodeType::Comment(_)
    ));
    assert_eq!(tree.as_text(children[2]).unwrap().lines, 2);
}

#[test]
fn test_snapshot_invalid_json() {
    assert!(Snapshot::from_json("{not json").is_err());
}
