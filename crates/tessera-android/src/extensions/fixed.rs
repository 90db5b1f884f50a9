//! Children positioned against the outer box of their container.
//!
//! `position: fixed` children (against the viewport) and absolutely
//! positioned children anchored to the right or bottom of a bordered or
//! padded container are measured from an edge that `ConstraintLayout` does
//! not anchor to. They are moved into a synthetic group that covers the
//! container's border box, so their anchors resolve against the right edges.
//! A child declaring `100%` width or height stretches across the group.

use log::debug;
use tessera_layout::{
    Alignment, BoxRegion, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeTree,
    PositionType, Rect, SyntheticKind,
};

use super::Context;
use crate::constants::{ANDROID, APP, MATCH_CONSTRAINT, PARENT};
use crate::controller::{AndroidController, set_explicit_spacing};
use crate::settings::API_RTL;

/// The group hosting the moved children.
const GROUP: DataKey<NodeId> = DataKey::new("fixed", "group");

fn outer_members(tree: &NodeTree, node: NodeId) -> Vec<NodeId> {
    let model = tree[node].box_model();
    let framed = model.border.horizontal() + model.border.vertical() + model.padding.horizontal() + model.padding.vertical()
        > 0.0;
    tree.visible_children(node)
        .into_iter()
        .filter(|&child| {
            let current = &tree[child];
            if !current.is_element() {
                return false;
            }
            match current.position() {
                PositionType::Fixed => true,
                PositionType::Absolute => {
                    framed
                        && ((current.has_offset("right") && !current.has_offset("left"))
                            || (current.has_offset("bottom") && !current.has_offset("top")))
                }
                _ => false,
            }
        })
        .collect()
}

/// Re-hosts fixed and edge-anchored children over the container's outer box.
#[derive(Debug, Default)]
pub struct Fixed;

impl Extension<AndroidController> for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].is_element() && !tree.visible_children(node).is_empty()
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        !outer_members(ctx.tree, node).is_empty()
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let members = outer_members(ctx.tree, node);
        let mut frame = ctx.tree[node].bounds();
        if node == ctx.tree.root() {
            let viewport = ctx.tree.viewport();
            frame = frame.union(&Rect::new(0.0, 0.0, viewport.width, viewport.height));
        }
        let group = ctx.tree.create_synthetic(SyntheticKind::Group, frame, None);
        ctx.tree[group].flags.page_flow = false;
        for &member in &members {
            ctx.tree.append_child(group, member);
            let current = &ctx.tree[member];
            let full_width = current.percent_width().is_some_and(|p| p >= 1.0);
            let full_height = current.percent_height().is_some_and(|p| p >= 1.0);
            let attributes = &mut ctx.tree[member].attributes;
            if full_width {
                attributes.set(ANDROID, "layout_width", MATCH_CONSTRAINT);
                attributes.set(APP, "layout_constraintStart_toStartOf", PARENT);
                attributes.set(APP, "layout_constraintEnd_toEndOf", PARENT);
            }
            if full_height {
                attributes.set(ANDROID, "layout_height", MATCH_CONSTRAINT);
                attributes.set(APP, "layout_constraintTop_toTopOf", PARENT);
                attributes.set(APP, "layout_constraintBottom_toBottomOf", PARENT);
            }
        }
        ctx.tree.append_child(node, group);
        ctx.tree[node].data.set(GROUP, group);
        debug!("{} children of {node:?} re-hosted on its outer box", members.len());

        let children = ctx.tree.visible_children(node);
        let unit = LayoutUnit::new(parent, node, children).with_container(ContainerType::Constraint, Alignment::AUTO_LAYOUT);
        Some(ExtensionResult::output(unit).subscribed())
    }

    fn post_base_layout(&mut self, ctx: &mut Context<'_>, node: NodeId) {
        let Some(group) = ctx.tree[node].data.get(GROUP).copied() else {
            return;
        };
        let settings = ctx.controller.settings().clone();
        let frame = ctx.tree[group].bounds();
        let content = ctx.tree[node].content_box();
        {
            let attributes = &mut ctx.tree[group].attributes;
            attributes.set(ANDROID, "layout_width", settings.dp(frame.width));
            attributes.set(ANDROID, "layout_height", settings.dp(frame.height));
            attributes.set(APP, "layout_constraintStart_toStartOf", PARENT);
            attributes.set(APP, "layout_constraintTop_toTopOf", PARENT);
            if !settings.supports(API_RTL) {
                attributes.set(APP, "layout_constraintLeft_toLeftOf", PARENT);
            }
        }
        // Negative, so the spacing pass turns them into a translation.
        ctx.tree.modify_box(group, BoxRegion::MarginLeft, frame.x - content.x, true);
        ctx.tree.modify_box(group, BoxRegion::MarginTop, frame.y - content.y, true);
        set_explicit_spacing(ctx.tree, group);
        let members: Vec<NodeId> = ctx.tree.render_children(group).to_vec();
        for member in members {
            anchor_member(ctx, group, member);
        }
    }
}

/// Anchors a moved child to the group edges its offsets name.
fn anchor_member(ctx: &mut Context<'_>, group: NodeId, member: NodeId) {
    let inner = ctx.tree.innermost(member);
    let frame = ctx.tree[group].bounds();
    let bounds = ctx.tree[inner].bounds();
    let current = &ctx.tree[inner];
    let from_right = current.has_offset("right") && !current.has_offset("left");
    let from_bottom = current.has_offset("bottom") && !current.has_offset("top");
    let legacy = !ctx.controller.settings().supports(API_RTL);
    let attributes = &mut ctx.tree[member].attributes;
    let horizontal = if attributes.contains(APP, "layout_constraintEnd_toEndOf") {
        None
    } else if from_right {
        attributes.set(APP, "layout_constraintEnd_toEndOf", PARENT);
        if legacy {
            attributes.set(APP, "layout_constraintRight_toRightOf", PARENT);
        }
        Some((BoxRegion::MarginRight, frame.right() - bounds.right()))
    } else {
        attributes.set(APP, "layout_constraintStart_toStartOf", PARENT);
        if legacy {
            attributes.set(APP, "layout_constraintLeft_toLeftOf", PARENT);
        }
        Some((BoxRegion::MarginLeft, bounds.x - frame.x))
    };
    let vertical = if attributes.contains(APP, "layout_constraintBottom_toBottomOf") {
        None
    } else if from_bottom {
        attributes.set(APP, "layout_constraintBottom_toBottomOf", PARENT);
        Some((BoxRegion::MarginBottom, frame.bottom() - bounds.bottom()))
    } else {
        attributes.set(APP, "layout_constraintTop_toTopOf", PARENT);
        Some((BoxRegion::MarginTop, bounds.y - frame.y))
    };
    for (region, distance) in [horizontal, vertical].into_iter().flatten() {
        let emitted = ctx.tree.box_value(member, region);
        ctx.tree.modify_box(member, region, distance - emitted, true);
    }
}
