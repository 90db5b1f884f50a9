//! Labels for checkboxes and radio buttons.
//!
//! Android shows the label inside the button itself, so the `<label>` text is
//! moved onto its control and the label element is dropped.

use tessera_layout::{DataKey, Extension, ExtensionResult, NodeId, NodeTree, TraverseOptions};

use super::Context;
use crate::controller::AndroidController;

const TARGET: DataKey<NodeId> = DataKey::new("accessibility", "target");
const LABEL: DataKey<String> = DataKey::new("accessibility", "label");

/// Text of the label attached to `node`, if any.
#[must_use]
pub fn label_text(tree: &NodeTree, node: NodeId) -> Option<String> {
    tree[node].data.get(LABEL).cloned()
}

fn is_toggle(tree: &NodeTree, id: NodeId) -> bool {
    let node = &tree[id];
    node.tag == "input" && matches!(node.input_type().as_str(), "checkbox" | "radio")
}

fn target(tree: &NodeTree, label: NodeId) -> Option<NodeId> {
    if let Some(reference) = tree[label].attr("for").filter(|f| !f.is_empty()) {
        return tree
            .ids()
            .find(|&id| tree[id].attr("id") == Some(reference) && !tree[id].flags.excluded)
            .filter(|&id| is_toggle(tree, id));
    }
    tree.descend(label, &TraverseOptions::new().condition(|n| n.tag == "input"))
        .into_iter()
        .find(|&id| is_toggle(tree, id))
}

/// Merges `<label>` text into the checkbox or radio button it names.
#[derive(Debug, Default)]
pub struct Accessibility;

impl Extension<AndroidController> for Accessibility {
    fn name(&self) -> &'static str {
        "accessibility"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].tag == "label"
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        match target(ctx.tree, node) {
            Some(found) if !ctx.tree[found].data.has(LABEL) => {
                ctx.tree[node].data.set(TARGET, found);
                true
            }
            _ => false,
        }
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let target = ctx.tree[node].data.take(TARGET)?;
        let text = ctx
            .tree
            .descend(
                node,
                &TraverseOptions::new()
                    .excluding(target)
                    .include_excluded()
                    .condition(|n| n.is_text()),
            )
            .into_iter()
            .filter_map(|id| ctx.tree[id].text.clone())
            .collect::<Vec<_>>()
            .join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            ctx.tree[target].data.set(LABEL, text);
        }

        let wrapped = ctx.tree.ascend(target, &TraverseOptions::new()).contains(&node);
        if !wrapped {
            return Some(ExtensionResult::remove());
        }
        let host = ctx.tree.parent(node).unwrap_or(parent);
        let index = ctx.tree.child_index(node).unwrap_or(0);
        ctx.tree.insert_child(host, index, target);
        Some(ExtensionResult::replace_with(vec![target]))
    }
}
