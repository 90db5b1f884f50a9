//! Mutually exclusive radio buttons.
//!
//! A run of sibling radio inputs sharing a `name` (optionally interleaved
//! with their labels) is grouped into a `RadioGroup` so checking one button
//! unchecks the others.

use log::debug;
use tessera_layout::{
    Alignment, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeTree, TraverseOptions,
};

use super::{Context, EPSILON};
use crate::constants::ANDROID;
use crate::controller::AndroidController;

/// Shared `name` of the radios, set on the group.
const GROUP_NAME: DataKey<String> = DataKey::new("radio_group", "name");

fn radio_name(tree: &NodeTree, node: NodeId) -> Option<&str> {
    let current = &tree[node];
    (current.is_element() && current.tag == "input" && current.input_type() == "radio")
        .then(|| current.attr("name"))
        .flatten()
        .filter(|name| !name.is_empty())
}

/// Radios a `<label>` stands for: the one it names with `for` or the ones
/// it wraps.
fn labelled_radios(tree: &NodeTree, label: NodeId, name: &str) -> Vec<NodeId> {
    if let Some(target) = tree[label].attr("for") {
        return tree
            .ids()
            .filter(|&id| tree[id].attr("id") == Some(target) && radio_name(tree, id) == Some(name))
            .collect();
    }
    tree.descend(label, &TraverseOptions::new())
        .into_iter()
        .filter(|&id| radio_name(tree, id) == Some(name))
        .collect()
}

/// Siblings from `node` onwards that belong to its run, with the number of
/// radios among them.
fn run(tree: &NodeTree, node: NodeId, name: &str) -> (Vec<NodeId>, usize) {
    let Some(parent) = tree.parent(node) else {
        return (Vec::new(), 0);
    };
    let siblings = tree.visible_children(parent);
    let Some(start) = siblings.iter().position(|&s| s == node) else {
        return (Vec::new(), 0);
    };
    let mut members = Vec::new();
    let mut radios = 0;
    for &sibling in &siblings[start..] {
        if radio_name(tree, sibling) == Some(name) {
            radios += 1;
        } else if tree[sibling].tag == "label" && !labelled_radios(tree, sibling, name).is_empty() {
            if tree[sibling].attr("for").is_none() {
                radios += 1;
            }
        } else {
            break;
        }
        members.push(sibling);
    }
    (members, radios)
}

/// Groups radio buttons by name.
#[derive(Debug, Default)]
pub struct RadioGroup;

impl Extension<AndroidController> for RadioGroup {
    fn name(&self) -> &'static str {
        "radio_group"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        radio_name(tree, node).is_some()
            && tree
                .parent(node)
                .is_none_or(|parent| !tree[parent].data.has(GROUP_NAME))
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        let Some(name) = radio_name(ctx.tree, node) else {
            return false;
        };
        run(ctx.tree, node, name).1 > 1
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let name = radio_name(ctx.tree, node)?.to_string();
        let (members, _) = run(ctx.tree, node, &name);
        let natural = ctx.tree.parent(node)?;
        let group = ctx.tree.create_group(natural, &members);
        let rects: Vec<_> = members.iter().map(|&m| ctx.tree[m].linear()).collect();
        let horizontal = rects.windows(2).all(|pair| pair[1].x >= pair[0].right() - EPSILON);
        debug!("radio group {name:?} of {} members", members.len());
        ctx.tree[group].data.set(GROUP_NAME, name);
        let inline = ctx.tree[node].flags.inline;
        ctx.tree[group].flags.inline = inline;
        ctx.tree[group].flags.block = !inline;
        let orientation = if horizontal {
            Alignment::HORIZONTAL
        } else {
            Alignment::VERTICAL
        };
        let unit = LayoutUnit::new(parent, group, members).with_container(ContainerType::RadioGroup, orientation);
        Some(ExtensionResult::render_as(group, Some(unit)).subscribed())
    }

    fn post_base_layout(&mut self, ctx: &mut Context<'_>, node: NodeId) {
        let Some(group) = ctx.tree.parent(node).filter(|&p| ctx.tree[p].data.has(GROUP_NAME)) else {
            return;
        };
        let checked = ctx
            .tree
            .descend(group, &TraverseOptions::new())
            .into_iter()
            .filter(|&id| radio_name(ctx.tree, id).is_some() && ctx.tree[id].attrs.contains_key("checked"))
            .filter_map(|id| ctx.tree[id].document_id().map(str::to_string))
            .last();
        if let Some(id) = checked {
            ctx.tree[group].attributes.set(ANDROID, "checkedButton", format!("@id/{id}"));
        }
    }
}
