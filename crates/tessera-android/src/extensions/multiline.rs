//! Text that wraps across lines or columns.
//!
//! A text run inside a multi-line `RelativeLayout` row is split into one
//! fragment per word, placed where the words would flow, so the row can wrap
//! them around its other inline children. Text-only multi-column containers
//! distribute their words over one fragment per column instead.
//!
//! Splitting is lossless: the fragments' text concatenates back to the
//! original run.

use log::debug;
use tessera_common::units::parse_count;
use tessera_layout::text::{TextMeasurer, partition_columns, split_words};
use tessera_layout::{
    Alignment, BoxRegion, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeKind,
    NodeTree, Rect, SyntheticKind,
};

use super::column::{column_gap, is_multicolumn};
use super::{Context, EPSILON};
use crate::constants::{ANDROID, MATCH_CONSTRAINT};
use crate::controller::{AndroidController, set_explicit_spacing};

/// Column texts of a multi-column container.
const COLUMNS: DataKey<Vec<String>> = DataKey::new("multiline", "columns");

/// Word segments of `text`, with a leading whitespace run folded into the
/// first word.
fn segments(text: &str) -> Vec<&str> {
    let words = split_words(text);
    match words.as_slice() {
        [first, second, ..] if first.trim().is_empty() => {
            let head = first.len() + second.len();
            let mut merged = vec![&text[..head]];
            merged.extend_from_slice(&words[2..]);
            merged
        }
        _ => words,
    }
}

/// Where each word of `text` lands when flowed greedily from `start` inside
/// the horizontal span `left..right`, one `line_height` per line from `top`.
pub(crate) fn reflow<'a>(
    text: &'a str,
    start: f32,
    (left, right): (f32, f32),
    top: f32,
    measurer: &dyn TextMeasurer,
    font_size: f32,
) -> Vec<(&'a str, Rect)> {
    let line_height = measurer.line_height(font_size);
    let mut x = start;
    let mut y = top;
    segments(text)
        .into_iter()
        .map(|word| {
            let width = measurer.text_width(word.trim_end(), font_size);
            if x + width > right + EPSILON && x > left + EPSILON {
                x = left;
                y += line_height;
            }
            let rect = Rect::new(x, y, width, line_height);
            x += measurer.text_width(word, font_size);
            (word, rect)
        })
        .collect()
}

/// `ratio` rounded down into `1..=limit`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn columns_that_fit(ratio: f32, limit: usize) -> usize {
    ratio.floor().clamp(1.0, limit.max(1) as f32) as usize
}

/// Number of columns a container asks for, at most `limit`.
fn column_count(tree: &NodeTree, node: NodeId, limit: usize) -> usize {
    let current = &tree[node];
    let gap = column_gap(tree, node);
    let available = current.content_box().width;
    let by_count = match current.css("column-count") {
        "" | "auto" => None,
        value => parse_count(value, limit).map(|count| count.max(1)),
    };
    let by_width = current
        .css_length("column-width")
        .filter(|&w| w > 0.0)
        .map(|w| columns_that_fit((available + gap) / (w + gap), limit));
    let count = match (by_count, by_width) {
        (Some(count), Some(width)) => count.min(width),
        (count, width) => count.or(width).unwrap_or(1),
    };
    count.min(limit.max(1))
}

fn text_children(tree: &NodeTree, node: NodeId) -> Vec<NodeId> {
    tree.visible_children(node)
        .into_iter()
        .filter(|&child| tree[child].kind == NodeKind::Text)
        .collect()
}

/// Splits text across lines or columns.
#[derive(Debug, Default)]
pub struct Multiline;

impl Multiline {
    fn split_lines(ctx: &mut Context<'_>, node: NodeId) -> Option<ExtensionResult> {
        let natural = ctx.tree.parent(node)?;
        let index = ctx.tree.child_index(node)?;
        let text = ctx.tree[node].text.clone()?;
        let bounds = ctx.tree[node].bounds();
        let content = ctx.tree[natural].content_box();
        let start = ctx
            .tree
            .previous_sibling(node)
            .map(|previous| ctx.tree[previous].linear())
            .filter(|previous| previous.overlaps_vertically(&bounds))
            .map_or(content.x, |previous| previous.right());
        let font_size = ctx.tree[node].font_size();
        let placed = reflow(&text, start, (content.x, content.right()), bounds.y, ctx.measurer, font_size);

        let mut fragments = Vec::with_capacity(placed.len());
        for (offset, (word, rect)) in placed.into_iter().enumerate() {
            let fragment = ctx.tree.create_synthetic(SyntheticKind::Fragment, rect, Some(node));
            let current = &mut ctx.tree[fragment];
            current.text = Some(word.to_string());
            current.flags.inline = true;
            ctx.tree.insert_child(natural, index + offset, fragment);
            fragments.push(fragment);
        }
        let (Some(&first), Some(&last)) = (fragments.first(), fragments.last()) else {
            return None;
        };
        let source = &ctx.tree[node];
        let leading = source.siblings_leading.clone();
        let trailing = source.siblings_trailing.clone();
        let (break_leading, break_trailing) = (source.line_break_leading, source.line_break_trailing);
        ctx.tree[first].siblings_leading = leading;
        ctx.tree[first].line_break_leading = break_leading;
        ctx.tree[last].siblings_trailing = trailing;
        ctx.tree[last].line_break_trailing = break_trailing;
        debug!("text {node:?} split into {} fragments", fragments.len());
        Some(ExtensionResult::replace_with(fragments))
    }

    #[allow(clippy::cast_precision_loss)]
    fn split_columns(ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let columns = ctx.tree[node].data.take(COLUMNS)?;
        let sources = text_children(ctx.tree, node);
        let style_from = sources.first().copied();
        let gap = column_gap(ctx.tree, node);
        let content = ctx.tree[node].content_box();
        let count = columns.len();
        let width = ((content.width - gap * (count - 1) as f32) / count as f32).max(0.0);
        for &source in &sources {
            ctx.tree.exclude(source);
        }
        let mut fragments = Vec::with_capacity(count);
        for (index, text) in columns.into_iter().enumerate() {
            let rect = Rect::new(content.x + index as f32 * (width + gap), content.y, width, content.height);
            let fragment = ctx.tree.create_synthetic(SyntheticKind::Fragment, rect, style_from);
            ctx.tree[fragment].text = Some(text);
            ctx.tree.append_child(node, fragment);
            let attributes = &mut ctx.tree[fragment].attributes;
            attributes.set(ANDROID, "layout_width", MATCH_CONSTRAINT);
            attributes.set(ANDROID, "layout_weight", "1");
            if index + 1 < count {
                ctx.tree.modify_box(fragment, BoxRegion::MarginRight, gap, false);
            }
            fragments.push(fragment);
        }
        debug!("text of {node:?} distributed over {count} columns");
        set_explicit_spacing(ctx.tree, node);
        let unit = LayoutUnit::new(parent, node, fragments).with_container(ContainerType::Linear, Alignment::HORIZONTAL);
        Some(ExtensionResult::output(unit))
    }
}

impl Extension<AndroidController> for Multiline {
    fn name(&self) -> &'static str {
        "multiline"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        let current = &tree[node];
        if current.kind == NodeKind::Text {
            return current.lines > 1;
        }
        if !is_multicolumn(tree, node) {
            return false;
        }
        let children = tree.visible_children(node);
        !children.is_empty() && children.iter().all(|&child| tree[child].kind == NodeKind::Text)
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> bool {
        if ctx.tree[node].kind == NodeKind::Text {
            let container = &ctx.tree[parent];
            return container.container_type == ContainerType::Relative
                && container.alignment.contains(Alignment::MULTILINE);
        }
        let text: String = text_children(ctx.tree, node)
            .into_iter()
            .filter_map(|child| ctx.tree[child].text.clone())
            .collect();
        let words = split_words(&text);
        let count = column_count(ctx.tree, node, words.len());
        if count < 2 {
            return false;
        }
        let columns = partition_columns(&words, count, ctx.measurer, ctx.tree[node].font_size());
        if columns.len() < 2 {
            return false;
        }
        ctx.tree[node].data.set(COLUMNS, columns);
        true
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        if ctx.tree[node].kind == NodeKind::Text {
            Self::split_lines(ctx, node)
        } else {
            Self::split_columns(ctx, node, parent)
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use tessera_layout::ApproximateTextMeasurer;

    use super::*;

    #[quickcheck]
    fn prop_reflow_is_lossless(text: String, start: u8, width: u8) -> bool {
        let right = f32::from(width) + 1.0;
        let placed = reflow(&text, f32::from(start), (0.0, right), 0.0, &ApproximateTextMeasurer, 10.0);
        placed.iter().map(|(word, _)| *word).collect::<String>() == text
    }

    /// Six pixels per glyph, twelve per line.
    struct Monospace;

    impl TextMeasurer for Monospace {
        #[allow(clippy::cast_precision_loss)]
        fn text_width(&self, text: &str, _font_size: f32) -> f32 {
            text.chars().count() as f32 * 6.0
        }

        fn line_height(&self, _font_size: f32) -> f32 {
            12.0
        }
    }

    #[test]
    fn test_reflow_wraps_to_left_edge() {
        let placed = reflow("aaaa aaaa aaaa", 40.0, (0.0, 60.0), 0.0, &Monospace, 10.0);
        let origins: Vec<(f32, f32)> = placed.iter().map(|(_, r)| (r.x, r.y)).collect();
        assert_eq!(origins, vec![(0.0, 12.0), (30.0, 12.0), (0.0, 24.0)]);
    }

    #[test]
    fn test_leading_whitespace_joins_first_word() {
        assert_eq!(segments("  one two"), vec!["  one ", "two"]);
        assert_eq!(segments("   "), vec!["   "]);
    }
}
