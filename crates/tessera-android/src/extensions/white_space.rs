//! Line breaks and vertical margins between block children.
//!
//! `<br>` elements render as nothing; their effect is recorded as line-break
//! flags on the neighbouring boxes. After constraints have folded collapsed
//! margins into the offsets, each gap in a vertical stack is moved onto the
//! top margin of the lower box so one view owns it.

use tessera_layout::{Alignment, BoxRegion, ContainerType, Extension, ExtensionResult, NodeId, NodeTree, SetBox};

use super::Context;
use crate::controller::{AndroidController, has_explicit_spacing};

fn is_break(tree: &NodeTree, node: NodeId) -> bool {
    tree[node].is_element() && tree[node].tag == "br"
}

/// Sets line-break flags around every `<br>` among `children`.
fn mark_breaks(tree: &mut NodeTree, children: &[NodeId]) {
    for (index, &child) in children.iter().enumerate() {
        if !is_break(tree, child) {
            continue;
        }
        if let Some(&before) = children[..index].iter().rev().find(|&&c| !is_break(tree, c)) {
            tree[before].line_break_trailing = true;
        }
        if let Some(&after) = children[index + 1..].iter().find(|&&c| !is_break(tree, c)) {
            tree[after].line_break_leading = true;
        }
    }
}

/// Handles `<br>` and vertical margin merging in block containers.
#[derive(Debug, Default)]
pub struct WhiteSpace;

impl Extension<AndroidController> for WhiteSpace {
    fn name(&self) -> &'static str {
        "white_space"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        let current = &tree[node];
        current.is_element() && current.flags.block && !tree.visible_children(node).is_empty()
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> Option<ExtensionResult> {
        let children = ctx.tree.visible_children(node);
        mark_breaks(ctx.tree, &children);
        Some(ExtensionResult::next().subscribed())
    }

    fn post_box_spacing(&mut self, ctx: &mut Context<'_>, node: NodeId) {
        let current = &ctx.tree[node];
        if current.container_type != ContainerType::Linear
            || !current.alignment.contains(Alignment::VERTICAL)
            || has_explicit_spacing(ctx.tree, node)
        {
            return;
        }
        let children: Vec<NodeId> = ctx
            .tree
            .render_children(node)
            .iter()
            .copied()
            .filter(|&c| ctx.tree[c].flags.page_flow && !ctx.tree[c].flags.excluded)
            .collect();
        for pair in children.windows(2) {
            let (above, below) = (pair[0], pair[1]);
            if ctx.tree.outer_wrapper(above).is_some() || ctx.tree.outer_wrapper(below).is_some() {
                continue;
            }
            let gap = ctx.tree.box_value(above, BoxRegion::MarginBottom);
            if gap <= 0.0 {
                continue;
            }
            ctx.tree
                .set_box(above, BoxRegion::MarginBottom, SetBox { reset: Some(true), adjustment: Some(0.0) });
            ctx.tree.modify_box(below, BoxRegion::MarginTop, gap, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaks_flag_neighbours() {
        let dom = tessera_dom::Snapshot::from_json(
            r#"{"root": {"tag": "body", "bounds": {"x": 0, "y": 0, "width": 100, "height": 60}, "children": [
                {"tag": "span", "bounds": {"x": 0, "y": 0, "width": 40, "height": 20}, "children": [{"text": "one"}]},
                {"tag": "br", "bounds": {"x": 40, "y": 0, "width": 0, "height": 20}},
                {"tag": "br", "bounds": {"x": 0, "y": 20, "width": 0, "height": 20}},
                {"tag": "span", "bounds": {"x": 0, "y": 40, "width": 40, "height": 20}, "children": [{"text": "two"}]}
            ]}}"#,
        )
        .and_then(tessera_dom::Snapshot::into_tree)
        .unwrap();
        let viewport = tessera_dom::Viewport { width: 100.0, height: 60.0 };
        let mut tree = NodeTree::from_dom(&dom, viewport).unwrap();
        let children = tree.visible_children(tree.root());
        assert_eq!(children.len(), 4);
        mark_breaks(&mut tree, &children);
        assert!(tree[children[0]].line_break_trailing);
        assert!(!tree[children[0]].line_break_leading);
        assert!(tree[children[3]].line_break_leading);
    }
}
