//! `<ul>` and `<ol>` lists.
//!
//! Each item is wrapped in a horizontal `LinearLayout` whose first child is
//! a synthetic marker view holding the bullet or counter text. Outside
//! markers take over the list's start padding.

use log::trace;
use tessera_common::units::parse_integer;
use tessera_layout::algorithms::{ListStyle, marker};
use tessera_layout::{
    Alignment, BoxRegion, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeKind, NodeTree,
    Rect, SetBox, SyntheticKind,
};

use super::Context;
use crate::constants::{ANDROID, MATCH_CONSTRAINT, WRAP_CONTENT};
use crate::controller::{AndroidController, set_explicit_spacing};

/// Counter value of an item.
const ORDINAL: DataKey<i32> = DataKey::new("list", "ordinal");

/// Width reserved for the marker of an item, zero for inside markers.
const GUTTER: DataKey<f32> = DataKey::new("list", "gutter");

/// Space between a marker and the item content, in pixels.
const MARKER_GAP: f32 = 8.0;

fn items(tree: &NodeTree, list: NodeId) -> Vec<NodeId> {
    tree.visible_children(list)
        .into_iter()
        .filter(|&c| tree[c].is_element() && tree[c].tag == "li")
        .collect()
}

/// Counter values for `count` items of an `<ol>`/`<ul>`, honouring `start`,
/// `reversed` and per-item `value` overrides.
pub(crate) fn ordinals(count: usize, start: Option<i32>, reversed: bool, values: &[Option<i32>]) -> Vec<i32> {
    let step = if reversed { -1 } else { 1 };
    let mut current = start.unwrap_or(if reversed { i32::try_from(count).unwrap_or(i32::MAX) } else { 1 });
    (0..count)
        .map(|index| {
            if let Some(Some(value)) = values.get(index) {
                current = *value;
            }
            let ordinal = current;
            current = current.saturating_add(step);
            ordinal
        })
        .collect()
}

fn integer_attr(tree: &NodeTree, node: NodeId, name: &str) -> Option<i32> {
    tree[node].attr(name).and_then(parse_integer)
}

/// Adds markers to list items.
#[derive(Debug, Default)]
pub struct List;

impl Extension<AndroidController> for List {
    fn name(&self) -> &'static str {
        "list"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        let node = &tree[node];
        node.is_element() && matches!(node.tag.as_str(), "ul" | "ol")
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        !items(ctx.tree, node).is_empty()
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> Option<ExtensionResult> {
        let items = items(ctx.tree, node);
        let values: Vec<Option<i32>> = items.iter().map(|&li| integer_attr(ctx.tree, li, "value")).collect();
        let start = integer_attr(ctx.tree, node, "start");
        let reversed = ctx.tree[node].attrs.contains_key("reversed");
        let outside = ctx.tree[node].css("list-style-position") != "inside";
        let gutter = if outside {
            ctx.tree.box_value(node, BoxRegion::PaddingLeft)
        } else {
            0.0
        };
        for (&li, ordinal) in items.iter().zip(ordinals(items.len(), start, reversed, &values)) {
            let data = &mut ctx.tree[li].data;
            data.set(ORDINAL, ordinal);
            data.set(GUTTER, gutter);
        }
        if gutter > 0.0 {
            ctx.tree.set_box(node, BoxRegion::PaddingLeft, SetBox { reset: Some(true), adjustment: Some(0.0) });
        }
        ctx.tree[node].render_extensions.push(self.name());
        Some(ExtensionResult::next())
    }

    fn process_child(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        if matches!(ctx.tree[node].kind, NodeKind::Synthetic(SyntheticKind::Marker)) {
            let unit = LayoutUnit::new(parent, node, Vec::new()).with_container(ContainerType::Text, Alignment::NONE);
            return Some(ExtensionResult::output(unit));
        }
        let ordinal = ctx.tree[node].data.take(ORDINAL)?;
        let gutter = ctx.tree[node].data.take(GUTTER).unwrap_or(0.0);
        let style = ListStyle::parse(ctx.tree[node].css("list-style-type"));
        let text = marker(style, ordinal);
        if text.is_empty() {
            return None;
        }
        trace!("list item {node:?} marker {text:?}");

        let settings = ctx.controller.settings().clone();
        let bounds = ctx.tree[node].bounds();
        let line_height = ctx.measurer.line_height(ctx.tree[node].font_size());
        let wrapper = ctx.tree.create_wrapper(node);
        let frame = Rect::new(bounds.x - gutter, bounds.y, gutter, line_height);
        let label = ctx.tree.create_synthetic(SyntheticKind::Marker, frame, Some(node));
        ctx.tree[label].text = Some(text.clone());
        ctx.tree.insert_child(wrapper, 0, label);
        {
            let attributes = &mut ctx.tree[label].attributes;
            attributes.set(ANDROID, "text", text);
            if gutter > 0.0 {
                attributes.set(ANDROID, "layout_width", settings.dp(gutter));
                attributes.set(ANDROID, "gravity", "end");
            } else {
                attributes.set(ANDROID, "layout_width", WRAP_CONTENT);
            }
            attributes.set(ANDROID, "layout_height", WRAP_CONTENT);
        }
        ctx.tree.modify_box(label, BoxRegion::PaddingRight, MARKER_GAP, false);

        let attributes = &mut ctx.tree[node].attributes;
        attributes.set(ANDROID, "layout_width", MATCH_CONSTRAINT);
        attributes.set(ANDROID, "layout_weight", "1");
        ctx.tree[wrapper].render_extensions.push(self.name());
        set_explicit_spacing(ctx.tree, wrapper);
        let unit = LayoutUnit::new(parent, wrapper, vec![label, node])
            .with_container(ContainerType::Linear, Alignment::HORIZONTAL | Alignment::WRAPPER);
        Some(ExtensionResult::render_as(wrapper, Some(unit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_count_up_from_start() {
        assert_eq!(ordinals(3, None, false, &[]), vec![1, 2, 3]);
        assert_eq!(ordinals(3, Some(5), false, &[]), vec![5, 6, 7]);
    }

    #[test]
    fn test_reversed_ordinals_count_down() {
        assert_eq!(ordinals(3, None, true, &[]), vec![3, 2, 1]);
        assert_eq!(ordinals(2, Some(10), true, &[]), vec![10, 9]);
    }

    #[test]
    fn test_ordinals_saturate_at_range_end() {
        assert_eq!(ordinals(2, Some(i32::MAX), false, &[]), vec![i32::MAX, i32::MAX]);
        assert_eq!(ordinals(2, Some(i32::MIN), true, &[]), vec![i32::MIN, i32::MIN]);
    }

    #[test]
    fn test_value_attribute_restarts_counter() {
        assert_eq!(ordinals(4, None, false, &[None, Some(7), None, None]), vec![1, 7, 8, 9]);
    }
}
