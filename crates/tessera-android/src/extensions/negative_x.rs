//! Absolutely positioned children that stick out of their container.
//!
//! A child whose negative offset reaches past the container's padding would
//! be clipped, and `ConstraintLayout` ignores negative margins. The container
//! is wrapped in an unclipped `ConstraintLayout`, the offending children are
//! moved next to it, and each one is anchored to the container's top-left
//! corner and translated into place once ids exist.

use log::debug;
use tessera_layout::{
    Alignment, BoxRegion, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeTree,
    PositionType, SetBox,
};

use super::{Context, EDGES, side_offset};
use crate::constants::{ANDROID, APP};
use crate::controller::{AndroidController, add_translation};
use crate::settings::API_RTL;

/// Children moved out of the container.
const MEMBERS: DataKey<Vec<NodeId>> = DataKey::new("negative_x", "members");

/// Whether an offset of `offset` on a side with `padding` leaves the
/// container's padding box.
pub(crate) fn overflows_padding(offset: f32, padding: f32) -> bool {
    offset < 0.0 && -offset > padding
}

fn overflowing_children(tree: &NodeTree, node: NodeId) -> Vec<NodeId> {
    let padding = tree[node].box_model().padding;
    tree.visible_children(node)
        .into_iter()
        .filter(|&child| {
            tree[child].is_element()
                && tree[child].position() == PositionType::Absolute
                && EDGES.iter().any(|&edge| {
                    side_offset(tree, child, edge).is_some_and(|v| overflows_padding(v, padding.get(edge)))
                })
        })
        .collect()
}

/// Unclips absolutely positioned children with negative offsets.
#[derive(Debug, Default)]
pub struct NegativeX;

impl Extension<AndroidController> for NegativeX {
    fn name(&self) -> &'static str {
        "negative_x"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].is_element() && !tree.visible_children(node).is_empty()
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> bool {
        if parent == ctx.tree.document() {
            return false;
        }
        let members = overflowing_children(ctx.tree, node);
        if members.is_empty() {
            return false;
        }
        ctx.tree[node].data.set(MEMBERS, members);
        true
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let members = ctx.tree[node].data.get(MEMBERS).cloned()?;
        let wrapper = ctx.tree.create_wrapper(node);
        for &member in &members {
            ctx.tree.append_child(wrapper, member);
        }
        {
            let attributes = &mut ctx.tree[wrapper].attributes;
            attributes.set(ANDROID, "clipChildren", "false");
            attributes.set(ANDROID, "clipToPadding", "false");
        }
        if parent != ctx.tree.document() {
            ctx.tree[parent].attributes.set(ANDROID, "clipChildren", "false");
        }
        debug!("{node:?} wrapped to unclip {} children", members.len());

        let mut children = Vec::with_capacity(members.len() + 1);
        children.push(node);
        children.extend(members);
        let unit = LayoutUnit::new(parent, wrapper, children)
            .with_container(ContainerType::Constraint, Alignment::AUTO_LAYOUT | Alignment::WRAPPER);
        Some(ExtensionResult::render_as(wrapper, Some(unit)).subscribed())
    }

    fn post_base_layout(&mut self, ctx: &mut Context<'_>, node: NodeId) {
        let Some(members) = ctx.tree[node].data.get(MEMBERS).cloned() else {
            return;
        };
        let Some(target) = ctx.tree[node].document_id().map(|id| format!("@id/{id}")) else {
            return;
        };
        let legacy = !ctx.controller.settings().supports(API_RTL);
        let origin = ctx.tree[node].bounds();
        for member in members {
            if ctx.tree[member].flags.excluded {
                continue;
            }
            let view = ctx.tree.outermost(member);
            let bounds = ctx.tree[member].bounds();
            {
                let attributes = &mut ctx.tree[view].attributes;
                attributes.set(APP, "layout_constraintStart_toStartOf", target.as_str());
                attributes.set(APP, "layout_constraintTop_toTopOf", target.as_str());
                if legacy {
                    attributes.set(APP, "layout_constraintLeft_toLeftOf", target.as_str());
                }
            }
            for region in BoxRegion::MARGIN {
                ctx.tree.set_box(view, region, SetBox { reset: Some(true), adjustment: Some(0.0) });
            }
            add_translation(ctx.tree, view, bounds.x - origin.x, bounds.y - origin.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_past_padding_overflows() {
        assert!(overflows_padding(-20.0, 10.0));
        assert!(!overflows_padding(-5.0, 10.0));
        assert!(!overflows_padding(-10.0, 10.0));
        assert!(!overflows_padding(0.0, 0.0));
        assert!(!overflows_padding(15.0, 10.0));
    }
}
