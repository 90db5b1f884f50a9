//! Tests for the shadow tree: import, box adjustments, synthesis and traversal.

use quickcheck_macros::quickcheck;
use serde_json::json;
use tessera_dom::{Snapshot, Viewport};
use tessera_layout::{
    BoxRegion, Direction, Link, NodeId, NodeTree, PositionType, SetBox, SyntheticKind, TraverseOptions,
};

fn tree(root: serde_json::Value) -> NodeTree {
    let dom = Snapshot::from_json(&json!({ "root": root }).to_string())
        .and_then(Snapshot::into_tree)
        .expect("valid snapshot");
    NodeTree::from_dom(&dom, Viewport::default()).expect("document has a body")
}

/// body > section#outer > [div#a, div#b (absolute), div#c]
fn nested() -> NodeTree {
    tree(json!({
        "tag": "body",
        "bounds": { "x": 0.0, "y": 0.0, "width": 500.0, "height": 400.0 },
        "children": [{
            "tag": "section",
            "attrs": { "id": "outer" },
            "style": { "display": "grid", "padding-left": "10px", "margin-top": "8px" },
            "bounds": { "x": 0.0, "y": 8.0, "width": 500.0, "height": 300.0 },
            "children": [
                { "tag": "div", "attrs": { "id": "a" }, "style": { "margin-left": "10%" },
                  "bounds": { "x": 59.0, "y": 8.0, "width": 100.0, "height": 50.0 } },
                { "tag": "div", "attrs": { "id": "b" }, "style": { "position": "absolute" },
                  "bounds": { "x": 200.0, "y": 8.0, "width": 100.0, "height": 50.0 } },
                { "tag": "div", "attrs": { "id": "c" },
                  "bounds": { "x": 10.0, "y": 58.0, "width": 100.0, "height": 50.0 },
                  "children": [{ "text": "hi", "bounds": { "x": 10.0, "y": 58.0, "width": 16.0, "height": 19.0 } }] }
            ]
        }]
    }))
}

fn by_id(tree: &NodeTree, id: &str) -> NodeId {
    tree.ids()
        .find(|&node| tree[node].attr("id") == Some(id))
        .expect("node with id attribute")
}

// ========== import ==========

#[test]
fn test_import_resolves_box_model() {
    let tree = nested();
    let outer = by_id(&tree, "outer");
    let a = by_id(&tree, "a");
    assert_eq!(tree.parent(outer), Some(tree.root()));
    assert_eq!(tree.parent(tree.root()), Some(tree.document()));
    assert_eq!(tree[outer].box_model().padding.left, 10.0);
    // 10% of the 490px content box of the parent.
    assert_eq!(tree[a].box_model().margin.left, 49.0);
    assert_eq!(tree[a].linear().x, 10.0);
    assert_eq!(tree[by_id(&tree, "b")].position(), PositionType::Absolute);
    assert!(!tree[by_id(&tree, "b")].flags.page_flow);
    assert_eq!(tree.text_content(outer), "hi");
}

#[test]
fn test_text_inherits_parent_style() {
    let tree = tree(json!({
        "tag": "body",
        "style": { "color": "red" },
        "children": [{ "text": "x" }, { "text": "   " }]
    }));
    let children = tree.children(tree.root()).to_vec();
    assert_eq!(children.len(), 2);
    assert_eq!(tree[children[0]].css("color"), "red");
    assert!(tree[children[1]].flags.excluded);
    assert_eq!(tree.visible_children(tree.root()), vec![children[0]]);
}

// ========== box adjustments ==========

#[test]
fn test_modify_box_clamps_at_zero() {
    let mut tree = nested();
    let outer = by_id(&tree, "outer");
    tree.modify_box(outer, BoxRegion::PaddingLeft, -25.0, false);
    assert_eq!(tree.box_value(outer, BoxRegion::PaddingLeft), 0.0);
    assert_eq!(tree.get_box(outer, BoxRegion::PaddingLeft), (false, -10.0));

    tree.modify_box(outer, BoxRegion::MarginTop, -20.0, true);
    assert_eq!(tree.box_value(outer, BoxRegion::MarginTop), -12.0);
}

#[test]
fn test_modify_box_zero_is_noop() {
    let mut tree = nested();
    let outer = by_id(&tree, "outer");
    tree.set_box(outer, BoxRegion::PaddingLeft, SetBox::reset());
    tree.modify_box(outer, BoxRegion::PaddingLeft, 0.0, false);
    assert_eq!(tree.get_box(outer, BoxRegion::PaddingLeft), (true, 0.0));
}

#[test]
fn test_register_box_forwards_writes() {
    let mut tree = nested();
    let outer = by_id(&tree, "outer");
    let a = by_id(&tree, "a");
    tree.register_box(a, BoxRegion::MarginTop, outer);
    tree.modify_box(a, BoxRegion::MarginTop, 5.0, false);
    assert_eq!(tree.box_value(outer, BoxRegion::MarginTop), 13.0);
    assert_eq!(tree.box_value(a, BoxRegion::MarginTop), 0.0);
    assert_eq!(tree.get_box(a, BoxRegion::MarginTop), (false, 5.0));
}

#[quickcheck]
fn prop_reset_is_idempotent(adjustment: i16, repeats: u8) -> bool {
    let mut tree = nested();
    let outer = by_id(&tree, "outer");
    tree.set_box(outer, BoxRegion::PaddingLeft, SetBox::adjustment(f32::from(adjustment)));
    tree.set_box(outer, BoxRegion::PaddingLeft, SetBox::reset());
    let once = tree.box_value(outer, BoxRegion::PaddingLeft);
    for _ in 0..repeats % 8 {
        tree.set_box(outer, BoxRegion::PaddingLeft, SetBox::reset());
    }
    once == f32::from(adjustment) && tree.box_value(outer, BoxRegion::PaddingLeft) == once
}

#[quickcheck]
fn prop_clamped_value_never_negative(steps: Vec<i16>) -> bool {
    let mut tree = nested();
    let outer = by_id(&tree, "outer");
    steps.iter().all(|&step| {
        tree.modify_box(outer, BoxRegion::PaddingLeft, f32::from(step), false);
        tree.box_value(outer, BoxRegion::PaddingLeft) >= 0.0
    })
}

// ========== synthesis ==========

#[test]
fn test_wrapper_takes_place_and_margins() {
    let mut tree = nested();
    let outer = by_id(&tree, "outer");
    let b = by_id(&tree, "b");
    let wrapper = tree.create_wrapper(b);

    assert_eq!(tree.children(outer)[1], wrapper);
    assert_eq!(tree.children(wrapper), &[b]);
    assert_eq!(tree.outer_wrapper(b), Some(wrapper));
    assert_eq!(tree.inner_wrapped(wrapper), Some(b));
    assert_eq!(tree.outermost(b), wrapper);
    assert_eq!(tree.innermost(wrapper), b);
    assert_eq!(tree[wrapper].position(), PositionType::Absolute);
    assert_eq!(tree[b].position(), PositionType::Static);
    assert!(tree[b].flags.page_flow);
    assert_eq!(tree[wrapper].replaces(), &[b]);
    assert_eq!(tree[b].depth(), tree[wrapper].depth() + 1);
    assert!(tree[wrapper].is_synthetic());
}

#[test]
fn test_group_inserted_at_first_member() {
    let mut tree = nested();
    let outer = by_id(&tree, "outer");
    let (a, c) = (by_id(&tree, "a"), by_id(&tree, "c"));
    let group = tree.create_group(outer, &[a, c]);
    let b = by_id(&tree, "b");

    assert_eq!(tree.children(outer), &[group, b]);
    assert_eq!(tree.children(group), &[a, c]);
    assert_eq!(tree[group].bounds().y, 8.0);
    assert_eq!(tree[group].bounds().bottom(), 108.0);
    assert_eq!(tree[group].tag, format!("#{}", SyntheticKind::Group));
}

#[test]
fn test_document_ids_are_unique() {
    let mut tree = nested();
    let a = by_id(&tree, "a");
    let b = by_id(&tree, "b");
    let c = by_id(&tree, "c");
    let _ = tree[b].attrs.insert("id".to_string(), "a".to_string());
    assert_eq!(tree.assign_document_id(a, "TextView"), "a");
    assert_eq!(tree.assign_document_id(b, "TextView"), "a_1");
    tree[c].attrs.clear();
    assert_eq!(tree.assign_document_id(c, "android.widget.TextView"), "text_view_1");
    assert_eq!(tree.assign_document_id(c, "Other"), "text_view_1");
    assert_eq!(tree.find_document_id("a_1"), Some(b));
}

// ========== traversal ==========

#[test]
fn test_ascend_never_reaches_document() {
    let tree = nested();
    let a = by_id(&tree, "a");
    let outer = by_id(&tree, "outer");
    assert_eq!(tree.ascend(a, &TraverseOptions::new()), vec![outer, tree.root()]);
    assert_eq!(
        tree.ascend(a, &TraverseOptions::new().excluding(tree.root())),
        vec![outer]
    );
}

#[test]
fn test_ascend_condition_and_error() {
    let tree = nested();
    let a = by_id(&tree, "a");
    let outer = by_id(&tree, "outer");
    let grids = tree.ascend(a, &TraverseOptions::new().condition(|n| n.css("display") == "grid"));
    assert_eq!(grids, vec![outer]);

    let stopped = tree.ascend(
        a,
        &TraverseOptions::new()
            .condition(|n| n.tag == "body")
            .error(|n| n.css("display") == "grid"),
    );
    assert!(stopped.is_empty());
}

#[test]
fn test_descend_every_and_excluded() {
    let tree = nested();
    let outer = by_id(&tree, "outer");
    let elements = tree.descend(outer, &TraverseOptions::new().condition(|n| n.is_element()));
    assert_eq!(elements.len(), 3);
    let all_divs = tree.descend(
        outer,
        &TraverseOptions::new()
            .condition(|n| n.is_element())
            .every(|n| n.tag == "div"),
    );
    assert_eq!(all_divs, elements);
    let all_absolute = tree.descend(
        outer,
        &TraverseOptions::new()
            .condition(|n| n.is_element())
            .every(|n| n.position() == PositionType::Absolute),
    );
    assert!(all_absolute.is_empty());
}

#[test]
fn test_siblings_nearest_first() {
    let tree = nested();
    let (a, b, c) = (by_id(&tree, "a"), by_id(&tree, "b"), by_id(&tree, "c"));
    assert_eq!(tree.siblings(c, Direction::Previous, &TraverseOptions::new()), vec![b, a]);
    assert_eq!(
        tree.siblings(a, Direction::Next, &TraverseOptions::new().condition(|n| n.flags.page_flow)),
        vec![c]
    );
    assert_eq!(tree.previous_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
}

#[test]
fn test_wrapper_chain_walk() {
    let mut tree = nested();
    let b = by_id(&tree, "b");
    let inner = tree.create_wrapper(b);
    let outer = tree.create_wrapper(inner);
    let chain = tree.ascend(b, &TraverseOptions::new().via(Link::OuterWrapper));
    assert_eq!(chain, vec![inner, outer]);
    let down = tree.descend(outer, &TraverseOptions::new().via(Link::OuterWrapper));
    assert_eq!(down, vec![inner, b]);
}
