//! Multi-column containers.
//!
//! Children are grouped by the column the reference engine placed them in,
//! and each column becomes an equally weighted vertical group in a
//! horizontal `LinearLayout`. Column rules are drawn as divider views
//! between the groups.

use log::debug;
use tessera_common::color::parse_color;
use tessera_layout::{
    Alignment, BoxRegion, ContainerType, Controller, DataKey, Extension, ExtensionResult, InsertPosition, LayoutUnit,
    NodeId, NodeTree,
};

use super::{Context, distinct_lines, line_index};
use crate::constants::{ANDROID, MATCH_CONSTRAINT, MATCH_PARENT};
use crate::controller::{AndroidController, set_explicit_spacing};

/// Column groups of a container, in order.
const COLUMNS: DataKey<Vec<NodeId>> = DataKey::new("column", "columns");

/// Whether `node` declares a multi-column layout.
pub(crate) fn is_multicolumn(tree: &NodeTree, node: NodeId) -> bool {
    let node = &tree[node];
    if !node.is_element() {
        return false;
    }
    let count = node.css("column-count");
    let width = node.css("column-width");
    (!count.is_empty() && count != "auto") || (!width.is_empty() && width != "auto")
}

pub(crate) fn column_gap(tree: &NodeTree, node: NodeId) -> f32 {
    let node = &tree[node];
    match node.css("column-gap") {
        "" | "normal" => node.font_size(),
        _ => node.css_length("column-gap").unwrap_or(0.0).max(0.0),
    }
}

/// Children bucketed by the measured column they start in.
fn columns(tree: &NodeTree, node: NodeId) -> Vec<Vec<NodeId>> {
    let children: Vec<NodeId> = tree
        .visible_children(node)
        .into_iter()
        .filter(|&c| tree[c].flags.page_flow && !tree[c].flags.render_exclude)
        .collect();
    let lines = distinct_lines(children.iter().map(|&c| tree[c].bounds().x));
    let mut buckets = vec![Vec::new(); lines.len()];
    for child in children {
        buckets[line_index(&lines, tree[child].bounds().x)].push(child);
    }
    buckets.retain(|b: &Vec<NodeId>| !b.is_empty());
    buckets
}

/// Lays out multi-column containers.
#[derive(Debug, Default)]
pub struct Column;

impl Extension<AndroidController> for Column {
    fn name(&self) -> &'static str {
        "column"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        is_multicolumn(tree, node)
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        columns(ctx.tree, node).len() > 1
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let buckets = columns(ctx.tree, node);
        let gap = column_gap(ctx.tree, node);
        let count = buckets.len();
        let mut groups = Vec::with_capacity(count);
        for (index, members) in buckets.iter().enumerate() {
            let group = ctx.tree.create_group(node, members);
            let attributes = &mut ctx.tree[group].attributes;
            attributes.set(ANDROID, "layout_width", MATCH_CONSTRAINT);
            attributes.set(ANDROID, "layout_weight", "1");
            attributes.set(ANDROID, "orientation", "vertical");
            if index + 1 < count {
                ctx.tree.modify_box(group, BoxRegion::MarginRight, gap, false);
            }
            groups.push(group);
        }
        debug!("column container {node:?} split into {count} columns");
        set_explicit_spacing(ctx.tree, node);
        ctx.tree[node].data.set(COLUMNS, groups.clone());
        let unit = LayoutUnit::new(parent, node, groups).with_container(ContainerType::Linear, Alignment::HORIZONTAL);
        Some(ExtensionResult::output(unit).subscribed())
    }

    fn post_resources(&mut self, ctx: &mut Context<'_>, node: NodeId) {
        let Some(groups) = ctx.tree[node].data.get(COLUMNS).cloned() else {
            return;
        };
        let container = &ctx.tree[node];
        let width = container.css_length("column-rule-width").unwrap_or(0.0);
        if matches!(container.css("column-rule-style"), "" | "none" | "hidden") || width <= 0.0 {
            return;
        }
        let Some(color) = parse_color(container.css("column-rule-color")).or_else(|| parse_color(container.css("color")))
        else {
            return;
        };
        let settings = ctx.controller.settings().clone();
        let gap = column_gap(ctx.tree, node);
        let color = ctx.resources.add_color(&color);
        // The rule sits in the middle of the gap, which the group margin already holds.
        let start = settings.dp(-(gap + width) / 2.0);
        let end = settings.dp((gap - width) / 2.0);
        let divider = format!(
            "<View {ANDROID}:layout_width=\"{}\" {ANDROID}:layout_height=\"{MATCH_PARENT}\" \
             {ANDROID}:layout_marginStart=\"{start}\" {ANDROID}:layout_marginEnd=\"{end}\" \
             {ANDROID}:background=\"@color/{color}\" />",
            settings.dp(width),
        );
        let insertions = ctx.controller.insertions_mut();
        for &group in groups.iter().take(groups.len().saturating_sub(1)) {
            insertions.add(group, InsertPosition::AfterOutside, divider.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_gap_is_not_negative() {
        let dom = tessera_dom::Snapshot::from_json(
            r#"{"root": {"tag": "body", "style": {"column-count": "2", "column-gap": "-4px"},
                "bounds": {"x": 0, "y": 0, "width": 100, "height": 100}}}"#,
        )
        .and_then(tessera_dom::Snapshot::into_tree)
        .unwrap();
        let viewport = tessera_dom::Viewport { width: 100.0, height: 100.0 };
        let tree = NodeTree::from_dom(&dom, viewport).unwrap();
        assert!(is_multicolumn(&tree, tree.root()));
        assert_eq!(column_gap(&tree, tree.root()), 0.0);
    }
}
