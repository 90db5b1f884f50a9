//! `position: relative` offsets.
//!
//! A relatively positioned box takes up its normal-flow space and is then
//! drawn shifted. The layout keeps the flow position and the shift becomes a
//! translation.

use tessera_layout::{DataKey, Extension, ExtensionResult, NodeId, NodeTree, PositionType, Rect};

use super::{Context, EPSILON};
use crate::controller::{AndroidController, add_translation};

const OFFSET: DataKey<(f32, f32)> = DataKey::new("relative", "offset");

/// Visual shift of a relatively positioned node.
#[must_use]
pub fn relative_offset(tree: &NodeTree, id: NodeId) -> (f32, f32) {
    let node = &tree[id];
    if !node.is_element() || node.position() != PositionType::Relative {
        return (0.0, 0.0);
    }
    let basis = tree.parent(id).map_or(node.bounds(), |p| tree[p].content_box());
    let resolve = |side: &str, size: f32| {
        if node.has_offset(side) {
            node.css_length_or_percent(side, size)
        } else {
            None
        }
    };
    let dx = resolve("left", basis.width)
        .or_else(|| resolve("right", basis.width).map(|v| -v))
        .unwrap_or(0.0);
    let dy = resolve("top", basis.height)
        .or_else(|| resolve("bottom", basis.height).map(|v| -v))
        .unwrap_or(0.0);
    (dx, dy)
}

/// Margin box of `id` where normal flow put it, before any relative shift.
#[must_use]
pub fn flow_rect(tree: &NodeTree, id: NodeId) -> Rect {
    let (dx, dy) = relative_offset(tree, id);
    let linear = tree[id].linear();
    Rect::new(linear.x - dx, linear.y - dy, linear.width, linear.height)
}

/// Translates relatively positioned nodes.
#[derive(Debug, Default)]
pub struct Relative;

impl Extension<AndroidController> for Relative {
    fn name(&self) -> &'static str {
        "relative"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].is_element() && tree[node].position() == PositionType::Relative
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        let (dx, dy) = relative_offset(ctx.tree, node);
        if dx.abs() < EPSILON && dy.abs() < EPSILON {
            return false;
        }
        ctx.tree[node].data.set(OFFSET, (dx, dy));
        true
    }

    fn process_node(&mut self, _ctx: &mut Context<'_>, _node: NodeId, _parent: NodeId) -> Option<ExtensionResult> {
        Some(ExtensionResult::next().subscribed())
    }

    fn post_base_layout(&mut self, ctx: &mut Context<'_>, node: NodeId) {
        if let Some(&(dx, dy)) = ctx.tree[node].data.get(OFFSET) {
            add_translation(ctx.tree, node, dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_nodes_have_no_offset() {
        let dom = tessera_dom::Snapshot::from_json(
            r#"{"root": {"tag": "body", "bounds": {"x": 0, "y": 0, "width": 100, "height": 100}}}"#,
        )
        .and_then(tessera_dom::Snapshot::into_tree)
        .unwrap();
        let viewport = tessera_dom::Viewport { width: 100.0, height: 100.0 };
        let tree = NodeTree::from_dom(&dom, viewport).unwrap();
        assert_eq!(relative_offset(&tree, tree.root()), (0.0, 0.0));
        assert_eq!(flow_rect(&tree, tree.root()), tree[tree.root()].linear());
    }
}
