//! Absolutely positioned children that sit inside their container's padding.
//!
//! CSS offsets are measured from the padding box while `ConstraintLayout`
//! anchors to the content box. A child whose offset lands within the padding
//! is anchored to the matching parent edge with its margin dropped, and the
//! remaining distance becomes a translation.

use tessera_layout::{
    BoxRegion, ContainerType, DataKey, Edge, Extension, ExtensionResult, NodeId, NodeTree, PositionType, SetBox,
};

use super::{Context, side_offset};
use crate::constants::{APP, PARENT};
use crate::controller::{AndroidController, add_translation};
use crate::settings::API_RTL;

/// Edges to re-anchor.
const EDGES: DataKey<Vec<Edge>> = DataKey::new("positive_x", "edges");

/// Whether `offset` lands inside a padding of `padding`.
pub(crate) fn within_padding(offset: f32, padding: f32) -> bool {
    padding > 0.0 && offset >= -padding && offset < padding
}

/// The governing horizontal and vertical edge of a positioned child: `left`
/// wins over `right` and `top` over `bottom`.
fn anchored_edges(tree: &NodeTree, node: NodeId) -> Vec<(Edge, f32)> {
    let pick = |first: Edge, second: Edge| {
        side_offset(tree, node, first)
            .map(|v| (first, v))
            .or_else(|| side_offset(tree, node, second).map(|v| (second, v)))
    };
    [pick(Edge::Left, Edge::Right), pick(Edge::Top, Edge::Bottom)]
        .into_iter()
        .flatten()
        .collect()
}

fn anchor_names(edge: Edge) -> (&'static str, Option<&'static str>) {
    match edge {
        Edge::Left => ("layout_constraintStart_toStartOf", Some("layout_constraintLeft_toLeftOf")),
        Edge::Right => ("layout_constraintEnd_toEndOf", Some("layout_constraintRight_toRightOf")),
        Edge::Top => ("layout_constraintTop_toTopOf", None),
        Edge::Bottom => ("layout_constraintBottom_toBottomOf", None),
    }
}

/// Anchors children that encroach on the parent's padding.
#[derive(Debug, Default)]
pub struct PositiveX;

impl Extension<AndroidController> for PositiveX {
    fn name(&self) -> &'static str {
        "positive_x"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].is_element() && tree[node].position() == PositionType::Absolute
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> bool {
        let padding = ctx.tree[parent].box_model().padding;
        let edges: Vec<Edge> = anchored_edges(ctx.tree, node)
            .into_iter()
            .filter(|&(edge, offset)| within_padding(offset, padding.get(edge)))
            .map(|(edge, _)| edge)
            .collect();
        if edges.is_empty() {
            return false;
        }
        ctx.tree[node].data.set(EDGES, edges);
        true
    }

    fn process_node(&mut self, _ctx: &mut Context<'_>, _node: NodeId, _parent: NodeId) -> Option<ExtensionResult> {
        Some(ExtensionResult::next().subscribed())
    }

    fn post_constraints(&mut self, ctx: &mut Context<'_>, node: NodeId) {
        let Some(edges) = ctx.tree[node].data.get(EDGES).cloned() else {
            return;
        };
        let view = ctx.tree.outermost(node);
        let Some(parent) = ctx.tree.render_parent(view) else {
            return;
        };
        if ctx.tree[parent].container_type != ContainerType::Constraint {
            return;
        }
        let legacy = !ctx.controller.settings().supports(API_RTL);
        let content = ctx.tree[parent].content_box();
        let bounds = ctx.tree[node].bounds();
        for edge in edges {
            let (modern, fallback) = anchor_names(edge);
            let attributes = &mut ctx.tree[view].attributes;
            attributes.set(APP, modern, PARENT);
            if let Some(fallback) = fallback.filter(|_| legacy) {
                attributes.set(APP, fallback, PARENT);
            }
            let reset = SetBox { reset: Some(true), adjustment: Some(0.0) };
            ctx.tree.set_box(view, BoxRegion::margin(edge), reset);
            let (dx, dy) = match edge {
                Edge::Left => (bounds.x - content.x, 0.0),
                Edge::Right => (bounds.right() - content.right(), 0.0),
                Edge::Top => (0.0, bounds.y - content.y),
                Edge::Bottom => (0.0, bounds.bottom() - content.bottom()),
            };
            add_translation(ctx.tree, view, dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_boundary() {
        assert!(within_padding(0.0, 10.0));
        assert!(within_padding(-10.0, 10.0));
        assert!(within_padding(9.0, 10.0));
        assert!(!within_padding(10.0, 10.0));
        assert!(!within_padding(-11.0, 10.0));
        assert!(!within_padding(0.0, 0.0));
    }
}
