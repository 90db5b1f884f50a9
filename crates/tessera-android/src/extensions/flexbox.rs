//! Flex containers as `LinearLayout`.
//!
//! A single flex line maps onto one `LinearLayout`. Wrapped rows are split
//! into one horizontal group per line stacked in a vertical container.
//! Growing items get `layout_weight`; otherwise `justify-content` leftover
//! is distributed into item margins.

use log::debug;
use tessera_common::units::{format_decimal, parse_number};
use tessera_common::warning::warn_once;
use tessera_layout::algorithms::{ContentDistribution, distribute};
use tessera_layout::{
    Alignment, BoxRegion, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeTree,
};

use super::{Context, EPSILON, horizontal_gravity, vertical_gravity};
use crate::constants::{ANDROID, MATCH_CONSTRAINT, MATCH_PARENT};
use crate::controller::{AndroidController, set_explicit_spacing};

/// Members of one wrapped line, stored on its group.
const LINE: DataKey<Vec<NodeId>> = DataKey::new("flexbox", "line");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Direction {
    horizontal: bool,
    reverse: bool,
}

impl Direction {
    fn parse(value: &str) -> Self {
        Self {
            horizontal: !value.starts_with("column"),
            reverse: value.ends_with("reverse"),
        }
    }
}

fn is_flex(tree: &NodeTree, node: NodeId) -> bool {
    let node = &tree[node];
    node.is_element() && matches!(node.css("display"), "flex" | "inline-flex")
}

/// An item's own property, ignoring the values text runs copy from their parent.
fn item_css<'a>(tree: &'a NodeTree, item: NodeId, property: &str) -> &'a str {
    let node = &tree[item];
    if node.is_element() { node.css(property) } else { "" }
}

fn gap(tree: &NodeTree, node: NodeId, horizontal: bool) -> f32 {
    let property = if horizontal { "column-gap" } else { "row-gap" };
    tree[node].css_length(property).unwrap_or(0.0).max(0.0)
}

/// Items in visual order.
#[allow(clippy::cast_possible_truncation)]
fn ordered_items(tree: &NodeTree, node: NodeId, reverse: bool) -> Vec<NodeId> {
    let mut items: Vec<NodeId> = tree
        .visible_children(node)
        .into_iter()
        .filter(|&id| tree[id].flags.page_flow && !tree[id].flags.render_exclude)
        .collect();
    items.sort_by_key(|&id| parse_number(item_css(tree, id, "order")) as i64);
    if reverse {
        items.reverse();
    }
    items
}

/// Splits row items into lines where the measured position wraps back.
fn split_lines(tree: &NodeTree, items: &[NodeId], reverse: bool) -> Vec<Vec<NodeId>> {
    let mut lines: Vec<Vec<NodeId>> = Vec::new();
    let mut previous: Option<NodeId> = None;
    for &item in items {
        let rect = tree[item].linear();
        let wrapped = previous.is_some_and(|p| {
            let last = tree[p].linear();
            let back = if reverse {
                rect.right() > last.x + EPSILON
            } else {
                rect.x < last.right() - EPSILON
            };
            back && rect.y >= last.bottom() - EPSILON
        });
        match lines.last_mut() {
            Some(line) if !wrapped => line.push(item),
            _ => lines.push(vec![item]),
        }
        previous = Some(item);
    }
    lines
}

/// Sizes and spaces the items of one flex line.
///
/// Returns whether any item aligns to the baseline.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn arrange(ctx: &mut Context<'_>, container: NodeId, items: &[NodeId], main_size: f32, direction: Direction) -> bool {
    let horizontal = direction.horizontal;
    let gap = gap(ctx.tree, container, horizontal);
    let justify = ContentDistribution::parse(ctx.tree[container].css("justify-content"));
    let align_items = ctx.tree[container].css("align-items").to_string();
    let (main_attribute, cross_attribute) = if horizontal {
        ("layout_width", "layout_height")
    } else {
        ("layout_height", "layout_width")
    };
    let (start_margin, end_margin) = if horizontal {
        (BoxRegion::MarginLeft, BoxRegion::MarginRight)
    } else {
        (BoxRegion::MarginTop, BoxRegion::MarginBottom)
    };

    let mut growing = false;
    let mut baseline = false;
    let mut used = 0.0;
    for (index, &item) in items.iter().enumerate() {
        let grow = parse_number(item_css(ctx.tree, item, "flex-grow"));
        let rect = ctx.tree[item].linear();
        used += if horizontal { rect.width } else { rect.height };
        if index + 1 < items.len() && gap > 0.0 {
            ctx.tree.modify_box(item, end_margin, gap, false);
        }

        let align = match item_css(ctx.tree, item, "align-self") {
            "" | "auto" | "normal" => align_items.clone(),
            value => value.to_string(),
        };
        let declared_cross = if horizontal {
            ctx.tree[item].has_height()
        } else {
            ctx.tree[item].has_width()
        };
        let node = &mut ctx.tree[item];
        if grow > 0.0 {
            growing = true;
            node.attributes.set(ANDROID, main_attribute, MATCH_CONSTRAINT);
            node.attributes.set(ANDROID, "layout_weight", format_decimal(grow, 2));
        }
        if align.ends_with("baseline") {
            baseline = horizontal;
        }
        let gravity = if horizontal {
            vertical_gravity(&align)
        } else {
            horizontal_gravity(&align)
        };
        match gravity {
            Some(gravity) => node.attributes.set(ANDROID, "layout_gravity", gravity),
            None if !declared_cross && node.is_element() => {
                node.attributes.set(ANDROID, cross_attribute, MATCH_PARENT);
            }
            None => {}
        }
    }

    if !growing && !items.is_empty() {
        let gaps = gap * (items.len() - 1) as f32;
        let leftover = (main_size - used - gaps).floor() as i32;
        let spacing = distribute(justify, items.len(), leftover);
        for (&item, spacing) in items.iter().zip(spacing) {
            if spacing.start > 0 {
                ctx.tree.modify_box(item, start_margin, spacing.start as f32, false);
            }
            if spacing.end > 0 {
                ctx.tree.modify_box(item, end_margin, spacing.end as f32, false);
            }
        }
    }
    baseline
}

/// Lays out flex containers.
#[derive(Debug, Default)]
pub struct Flexbox;

impl Extension<AndroidController> for Flexbox {
    fn name(&self) -> &'static str {
        "flexbox"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        is_flex(tree, node)
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        !ordered_items(ctx.tree, node, false).is_empty()
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let direction = Direction::parse(ctx.tree[node].css("flex-direction"));
        let wrap = ctx.tree[node].css("flex-wrap").starts_with("wrap");
        let items = ordered_items(ctx.tree, node, direction.reverse);
        let content = ctx.tree[node].content_box();
        set_explicit_spacing(ctx.tree, node);

        let lines = if wrap && direction.horizontal {
            split_lines(ctx.tree, &items, direction.reverse)
        } else {
            if wrap {
                warn_once("flexbox", "wrapped columns are laid out as a single column");
            }
            vec![items.clone()]
        };

        if lines.len() <= 1 {
            let main = if direction.horizontal { content.width } else { content.height };
            let baseline = arrange(ctx, node, &items, main, direction);
            let orientation = if direction.horizontal {
                Alignment::HORIZONTAL
            } else {
                Alignment::VERTICAL
            };
            let alignment = if baseline {
                orientation | Alignment::BASELINE
            } else {
                orientation
            };
            let unit = LayoutUnit::new(parent, node, items).with_container(ContainerType::Linear, alignment);
            return Some(ExtensionResult::output(unit));
        }

        debug!("flex container {node:?} wraps into {} lines", lines.len());
        let row_gap = gap(ctx.tree, node, false);
        let count = lines.len();
        let mut groups = Vec::with_capacity(count);
        for (index, line) in lines.into_iter().enumerate() {
            let group = ctx.tree.create_group(node, &line);
            ctx.tree[group].attributes.set(ANDROID, "layout_width", MATCH_PARENT);
            if index + 1 < count && row_gap > 0.0 {
                ctx.tree.modify_box(group, BoxRegion::MarginBottom, row_gap, false);
            }
            ctx.tree[group].data.set(LINE, line);
            groups.push(group);
        }
        ctx.tree[node].render_extensions.push(self.name());
        let unit = LayoutUnit::new(parent, node, groups)
            .with_container(ContainerType::Linear, Alignment::VERTICAL | Alignment::SEGMENTED);
        Some(ExtensionResult::output(unit))
    }

    fn process_child(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let line = ctx.tree[node].data.take(LINE)?;
        let direction = Direction::parse(ctx.tree[parent].css("flex-direction"));
        let main = ctx.tree[parent].content_box().width;
        let baseline = arrange(ctx, parent, &line, main, direction);
        set_explicit_spacing(ctx.tree, node);
        let alignment = if baseline {
            Alignment::HORIZONTAL | Alignment::BASELINE
        } else {
            Alignment::HORIZONTAL
        };
        let unit = LayoutUnit::new(parent, node, line).with_container(ContainerType::Linear, alignment);
        Some(ExtensionResult::output(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_keywords() {
        assert_eq!(Direction::parse("row"), Direction { horizontal: true, reverse: false });
        assert_eq!(Direction::parse("column-reverse"), Direction { horizontal: false, reverse: true });
        assert_eq!(Direction::parse(""), Direction { horizontal: true, reverse: false });
    }
}
