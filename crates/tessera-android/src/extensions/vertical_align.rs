//! `vertical-align` on a single row of inline boxes.

use tessera_layout::{Alignment, ContainerType, Extension, ExtensionResult, LayoutUnit, NodeId, NodeTree};

use super::{Context, EPSILON};
use crate::constants::ANDROID;
use crate::controller::AndroidController;

fn gravity(value: &str) -> Option<&'static str> {
    match value {
        "middle" => Some("center_vertical"),
        "top" | "text-top" => Some("top"),
        "bottom" | "text-bottom" => Some("bottom"),
        _ => None,
    }
}

fn row_items(tree: &NodeTree, node: NodeId) -> Vec<NodeId> {
    tree.visible_children(node)
        .into_iter()
        .filter(|&c| !tree[c].flags.render_exclude)
        .collect()
}

/// Whether `items` are inline boxes laid out left to right on one line.
fn is_single_row(tree: &NodeTree, items: &[NodeId]) -> bool {
    items.len() > 1
        && items.iter().all(|&c| tree[c].flags.inline && tree[c].flags.page_flow)
        && items.windows(2).all(|pair| {
            let (a, b) = (tree[pair[0]].linear(), tree[pair[1]].linear());
            b.x >= a.right() - EPSILON && a.overlaps_vertically(&b)
        })
}

/// Aligns a row of inline boxes on the cross axis.
#[derive(Debug, Default)]
pub struct VerticalAlign;

impl Extension<AndroidController> for VerticalAlign {
    fn name(&self) -> &'static str {
        "vertical_align"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].is_element() && tree.visible_children(node).len() > 1
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        let items = row_items(ctx.tree, node);
        is_single_row(ctx.tree, &items)
            && items
                .iter()
                .any(|&c| ctx.tree[c].is_element() && gravity(ctx.tree[c].css("vertical-align")).is_some())
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let items = row_items(ctx.tree, node);
        for &item in &items {
            if !ctx.tree[item].is_element() {
                continue;
            }
            if let Some(gravity) = gravity(ctx.tree[item].css("vertical-align")) {
                ctx.tree[item].attributes.set(ANDROID, "layout_gravity", gravity);
            }
        }
        let unit = LayoutUnit::new(parent, node, items).with_container(ContainerType::Linear, Alignment::HORIZONTAL);
        Some(ExtensionResult::output(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_has_no_gravity() {
        assert_eq!(gravity("baseline"), None);
        assert_eq!(gravity("middle"), Some("center_vertical"));
        assert_eq!(gravity("text-bottom"), Some("bottom"));
    }
}
