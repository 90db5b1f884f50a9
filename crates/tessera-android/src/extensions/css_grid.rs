//! CSS grid containers as `GridLayout`.
//!
//! Tracks are sized once for the whole container. Flexible tracks become
//! `layout_columnWeight` / `layout_rowWeight` so the device does the final
//! distribution; fixed tracks become literal cell sizes. Leftover space from
//! `justify-content` / `align-content` and the gaps become cell margins.
//!
//! Items are placed from their explicit grid lines when the author gave
//! them, otherwise from where the reference engine put them.

use log::debug;
use tessera_common::units::format_decimal;
use tessera_layout::algorithms::{
    ContentDistribution, TrackSize, TrackSizing, distribute, parse_track_list, resolve_tracks,
    span_contribution, track_offsets,
};
use tessera_layout::{
    Alignment, BoxRegion, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeTree,
};

use super::{Context, distinct_lines, horizontal_gravity, line_index, vertical_gravity};
use crate::constants::{ANDROID, MATCH_CONSTRAINT, WRAP_CONTENT};
use crate::controller::{AndroidController, set_explicit_spacing};

/// Position of an item in a grid, zero based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GridCell {
    pub row: usize,
    pub column: usize,
    pub row_span: usize,
    pub column_span: usize,
}

impl Default for GridCell {
    fn default() -> Self {
        Self {
            row: 0,
            column: 0,
            row_span: 1,
            column_span: 1,
        }
    }
}

pub(crate) const CELL: DataKey<GridCell> = DataKey::new("css_grid", "cell");

/// Writes the `GridLayout` cell attributes.
pub(crate) fn write_cell(tree: &mut NodeTree, node: NodeId, cell: GridCell) {
    let attributes = &mut tree[node].attributes;
    attributes.set(ANDROID, "layout_row", cell.row.to_string());
    attributes.set(ANDROID, "layout_column", cell.column.to_string());
    if cell.row_span > 1 {
        attributes.set(ANDROID, "layout_rowSpan", cell.row_span.to_string());
    }
    if cell.column_span > 1 {
        attributes.set(ANDROID, "layout_columnSpan", cell.column_span.to_string());
    }
}

#[derive(Debug)]
struct GridData {
    columns: TrackSizing,
    rows: TrackSizing,
    column_gap: f32,
    row_gap: f32,
    justify_content: ContentDistribution,
    justify_items: String,
    align_items: String,
}

const GRID: DataKey<GridData> = DataKey::new("css_grid", "grid");

/// Whether `node` is a grid whose columns are spread by `justify-content`.
#[must_use]
pub fn is_justified(tree: &NodeTree, node: NodeId) -> bool {
    tree[node].data.get(GRID).is_some_and(|grid| {
        grid.justify_content.is_spacing()
            || matches!(
                grid.justify_content,
                ContentDistribution::Center | ContentDistribution::End
            )
    })
}

fn is_grid(tree: &NodeTree, node: NodeId) -> bool {
    let node = &tree[node];
    node.is_element() && matches!(node.css("display"), "grid" | "inline-grid")
}

fn gap(tree: &NodeTree, node: NodeId, property: &str) -> f32 {
    tree[node].css_length(property).unwrap_or(0.0).max(0.0)
}

/// Tracks a placement may reach past the explicit grid.
const IMPLICIT_TRACK_LIMIT: usize = 100;

/// One-based line number of `value`. Negative lines count back from the
/// end of an explicit grid of `explicit` tracks, so `-1` is the last line.
fn resolve_line(value: &str, explicit: usize) -> Option<usize> {
    let line = value.trim().parse::<i64>().ok()?;
    let last = i64::try_from(explicit).ok()? + 1;
    let line = if line < 0 { last + 1 + line } else { line };
    usize::try_from(line).ok().filter(|&n| n > 0)
}

/// `(start, span)` from explicit line placement, zero based. Both stay
/// within the explicit grid plus [`IMPLICIT_TRACK_LIMIT`] tracks.
fn explicit_lines(start: &str, end: &str, explicit: usize) -> (Option<usize>, usize) {
    let limit = explicit + IMPLICIT_TRACK_LIMIT;
    let span_of = |value: &str| {
        value
            .strip_prefix("span")
            .map(|n| n.trim().parse::<usize>().unwrap_or(1).clamp(1, limit))
    };
    let line = resolve_line(start, explicit).map(|n| (n - 1).min(limit - 1));
    let span = span_of(start.trim())
        .or_else(|| span_of(end.trim()))
        .or_else(|| {
            let end = resolve_line(end, explicit)?;
            Some(end.checked_sub(line? + 1)?.max(1))
        })
        .unwrap_or(1);
    (line, span.min(limit - line.unwrap_or(0)))
}

/// Whether the end of a placement is left to the item's measured size.
fn end_is_implicit(start: &str, end: &str) -> bool {
    matches!(end.trim(), "" | "auto") && !start.trim().starts_with("span")
}

/// Track lines along one axis: the template's offsets when there is one,
/// otherwise the distinct item start positions.
fn axis_lines(template: &[TrackSize], starts: &[f32], available: f32, gap: f32, origin: f32) -> Vec<f32> {
    if template.is_empty() {
        let mut lines = distinct_lines(starts.iter().copied());
        if lines.is_empty() {
            lines.push(origin);
        }
        return lines;
    }
    let provisional = resolve_tracks(template, available, gap, &[], true);
    track_offsets(&provisional.sizes, gap, origin)
}

fn span_in(lines: &[f32], start: usize, end: f32) -> usize {
    let inside = lines
        .iter()
        .skip(start + 1)
        .take_while(|&&line| line < end - super::EPSILON)
        .count();
    inside + 1
}

/// Lays out CSS grid containers.
#[derive(Debug, Default)]
pub struct CssGrid;

impl CssGrid {
    fn place(tree: &NodeTree, node: NodeId, items: &[NodeId]) -> (Vec<GridCell>, Vec<TrackSize>, Vec<TrackSize>) {
        let container = &tree[node];
        let content = container.content_box();
        let context = *container.length_context();
        let column_gap = gap(tree, node, "column-gap");
        let row_gap = gap(tree, node, "row-gap");
        let mut columns = parse_track_list(container.css("grid-template-columns"), &context);
        let mut rows = parse_track_list(container.css("grid-template-rows"), &context);

        let rects: Vec<_> = items.iter().map(|&id| tree[id].linear()).collect();
        let xs: Vec<f32> = rects.iter().map(|r| r.x).collect();
        let ys: Vec<f32> = rects.iter().map(|r| r.y).collect();
        let column_lines = axis_lines(&columns, &xs, content.width, column_gap, content.x);
        let row_lines = axis_lines(&rows, &ys, content.height, row_gap, content.y);

        let cells: Vec<GridCell> = items
            .iter()
            .zip(&rects)
            .map(|(&id, rect)| {
                let item = &tree[id];
                let (column_start, column_end) = (item.css("grid-column-start"), item.css("grid-column-end"));
                let (row_start, row_end) = (item.css("grid-row-start"), item.css("grid-row-end"));
                let (column, column_span) = explicit_lines(column_start, column_end, columns.len());
                let (row, row_span) = explicit_lines(row_start, row_end, rows.len());
                let column = column.unwrap_or_else(|| line_index(&column_lines, rect.x));
                let row = row.unwrap_or_else(|| line_index(&row_lines, rect.y));
                let column_span = if end_is_implicit(column_start, column_end) {
                    span_in(&column_lines, column, rect.right())
                } else {
                    column_span
                };
                let row_span = if end_is_implicit(row_start, row_end) {
                    span_in(&row_lines, row, rect.bottom())
                } else {
                    row_span
                };
                GridCell {
                    row,
                    column,
                    row_span,
                    column_span,
                }
            })
            .collect();

        let column_count = cells.iter().map(|c| c.column + c.column_span).max().unwrap_or(1);
        let row_count = cells.iter().map(|c| c.row + c.row_span).max().unwrap_or(1);
        columns.resize(column_count.max(columns.len()), TrackSize::auto());
        rows.resize(row_count.max(rows.len()), TrackSize::auto());
        (cells, columns, rows)
    }

    /// Largest single-track contribution per track.
    fn contributions(tree: &NodeTree, items: &[NodeId], cells: &[GridCell], count: usize, columns: bool) -> Vec<f32> {
        let mut content = vec![0.0_f32; count];
        for (&id, cell) in items.iter().zip(cells) {
            let (index, span) = if columns {
                (cell.column, cell.column_span)
            } else {
                (cell.row, cell.row_span)
            };
            if span != 1 || index >= count {
                continue;
            }
            let rect = tree[id].linear();
            let size = if columns { rect.width } else { rect.height };
            content[index] = content[index].max(size);
        }
        content
    }

    fn size_cell(ctx: &mut Context<'_>, grid: &GridData, target: NodeId, item: NodeId, cell: GridCell) {
        let settings = ctx.controller.settings().clone();
        let margin = ctx.tree[item].box_model().margin;
        let justify = self_alignment(ctx.tree, item, "justify-self", &grid.justify_items);
        let align = self_alignment(ctx.tree, item, "align-self", &grid.align_items);
        let width = span_contribution(&grid.columns, cell.column, cell.column_span, grid.column_gap);
        let height = span_contribution(&grid.rows, cell.row, cell.row_span, grid.row_gap);

        let attributes = &mut ctx.tree[target].attributes;
        if width.weight > 0.0 {
            attributes.set(ANDROID, "layout_width", MATCH_CONSTRAINT);
            attributes.set(ANDROID, "layout_columnWeight", format_decimal(width.weight, 2));
            if width.fixed > 0.0 {
                attributes.set(ANDROID, "minWidth", settings.dp(width.fixed - margin.horizontal()));
            }
        } else if target != item || horizontal_gravity(&justify).is_none() {
            attributes.set(ANDROID, "layout_width", settings.dp((width.fixed - margin.horizontal()).max(0.0)));
        } else {
            attributes.set(ANDROID, "layout_width", WRAP_CONTENT);
        }
        if height.weight > 0.0 {
            attributes.set(ANDROID, "layout_height", MATCH_CONSTRAINT);
            attributes.set(ANDROID, "layout_rowWeight", format_decimal(height.weight, 2));
        } else if target != item || vertical_gravity(&align).is_none() {
            attributes.set(ANDROID, "layout_height", settings.dp((height.fixed - margin.vertical()).max(0.0)));
        } else {
            attributes.set(ANDROID, "layout_height", WRAP_CONTENT);
        }

        let gravity: Vec<&str> = [horizontal_gravity(&justify), vertical_gravity(&align)]
            .into_iter()
            .flatten()
            .collect();
        if !gravity.is_empty() {
            let attributes = &mut ctx.tree[item].attributes;
            if target != item {
                attributes.set(ANDROID, "layout_width", WRAP_CONTENT);
                attributes.set(ANDROID, "layout_height", WRAP_CONTENT);
            }
            attributes.set(ANDROID, "layout_gravity", gravity.join("|"));
        }
    }
}

/// The item's own alignment, or the container default when it has none.
fn self_alignment(tree: &NodeTree, item: NodeId, property: &str, default: &str) -> String {
    match tree[item].css(property) {
        "" | "auto" | "normal" => default.to_string(),
        value => value.to_string(),
    }
}

fn diverges(tree: &NodeTree, item: NodeId, grid: &GridData) -> bool {
    let own = |property: &str, default: &str| match tree[item].css(property) {
        "" | "auto" | "normal" => false,
        value => value != default && value != "stretch",
    };
    own("justify-self", &grid.justify_items) || own("align-self", &grid.align_items)
}

impl Extension<AndroidController> for CssGrid {
    fn name(&self) -> &'static str {
        "css_grid"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        is_grid(tree, node)
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        let items = ctx.tree.visible_children(node);
        !items.is_empty() && items.iter().all(|&id| ctx.tree[id].is_element())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let items: Vec<NodeId> = ctx
            .tree
            .visible_children(node)
            .into_iter()
            .filter(|&id| ctx.tree[id].flags.page_flow)
            .collect();
        if items.is_empty() {
            return None;
        }
        let (cells, column_tracks, row_tracks) = Self::place(ctx.tree, node, &items);
        let content = ctx.tree[node].content_box();
        let column_gap = gap(ctx.tree, node, "column-gap");
        let row_gap = gap(ctx.tree, node, "row-gap");
        let justify_content = ContentDistribution::parse(ctx.tree[node].css("justify-content"));
        let align_content = ContentDistribution::parse(ctx.tree[node].css("align-content"));

        let column_content = Self::contributions(ctx.tree, &items, &cells, column_tracks.len(), true);
        let row_content = Self::contributions(ctx.tree, &items, &cells, row_tracks.len(), false);
        let stretch_columns = matches!(justify_content, ContentDistribution::Normal | ContentDistribution::Stretch);
        let stretch_rows = matches!(align_content, ContentDistribution::Normal | ContentDistribution::Stretch);
        let columns = resolve_tracks(&column_tracks, content.width, column_gap, &column_content, stretch_columns);
        let rows = resolve_tracks(&row_tracks, content.height, row_gap, &row_content, stretch_rows);

        let column_spacing = if columns.has_flexible() {
            Vec::new()
        } else {
            distribute(justify_content, columns.sizes.len(), columns.free_space.floor() as i32)
        };
        let row_spacing = if rows.has_flexible() {
            Vec::new()
        } else {
            distribute(align_content, rows.sizes.len(), rows.free_space.floor() as i32)
        };

        let column_count = columns.sizes.len();
        let row_count = rows.sizes.len();
        for (&item, &cell) in items.iter().zip(&cells) {
            let last_column = cell.column + cell.column_span - 1;
            let last_row = cell.row + cell.row_span - 1;
            let mut adjust = |region: BoxRegion, value: f32| {
                if value > 0.0 {
                    ctx.tree.modify_box(item, region, value, false);
                }
            };
            if let (Some(first), Some(last)) = (column_spacing.get(cell.column), column_spacing.get(last_column)) {
                adjust(BoxRegion::MarginLeft, first.start as f32);
                adjust(BoxRegion::MarginRight, last.end as f32);
            }
            if let (Some(first), Some(last)) = (row_spacing.get(cell.row), row_spacing.get(last_row)) {
                adjust(BoxRegion::MarginTop, first.start as f32);
                adjust(BoxRegion::MarginBottom, last.end as f32);
            }
            if last_column + 1 < column_count {
                adjust(BoxRegion::MarginRight, column_gap);
            }
            if last_row + 1 < row_count {
                adjust(BoxRegion::MarginBottom, row_gap);
            }
            ctx.tree[item].data.set(CELL, cell);
        }

        debug!(
            "grid {node:?}: {row_count} rows x {column_count} columns, column sizes {:?}",
            columns.sizes
        );
        let container = &ctx.tree[node];
        let grid = GridData {
            columns,
            rows,
            column_gap,
            row_gap,
            justify_content,
            justify_items: container.css("justify-items").to_string(),
            align_items: container.css("align-items").to_string(),
        };
        ctx.tree[node].data.set(GRID, grid);
        ctx.tree[node].render_extensions.push(self.name());
        set_explicit_spacing(ctx.tree, node);

        let unit = LayoutUnit::new(parent, node, items)
            .with_container(ContainerType::Grid, Alignment::NONE)
            .with_grid(row_count, column_count);
        Some(ExtensionResult::output(unit))
    }

    fn process_child(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let cell = ctx.tree[node].data.get(CELL).copied()?;
        let grid = ctx.tree[parent].data.take(GRID)?;
        let result = if diverges(ctx.tree, node, &grid) {
            let wrapper = ctx.tree.create_wrapper(node);
            ctx.tree[wrapper].data.set(CELL, cell);
            write_cell(ctx.tree, wrapper, cell);
            Self::size_cell(ctx, &grid, wrapper, node, cell);
            let unit = LayoutUnit::new(parent, wrapper, vec![node])
                .with_container(ContainerType::Frame, Alignment::SINGLE | Alignment::WRAPPER);
            ExtensionResult::render_as(wrapper, Some(unit))
        } else {
            write_cell(ctx.tree, node, cell);
            Self::size_cell(ctx, &grid, node, node, cell);
            ExtensionResult::next()
        };
        ctx.tree[parent].data.set(GRID, grid);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_lines() {
        assert_eq!(explicit_lines("2", "4", 3), (Some(1), 2));
        assert_eq!(explicit_lines("1", "span 3", 3), (Some(0), 3));
        assert_eq!(explicit_lines("span 2", "auto", 3), (None, 2));
        assert_eq!(explicit_lines("auto", "auto", 3), (None, 1));
        assert_eq!(explicit_lines("3", "2", 3), (Some(2), 1));
    }

    #[test]
    fn test_negative_lines_count_from_the_end() {
        assert_eq!(explicit_lines("1", "-1", 3), (Some(0), 3));
        assert_eq!(explicit_lines("2", "-1", 3), (Some(1), 2));
        assert_eq!(explicit_lines("-2", "-1", 3), (Some(2), 1));
        assert_eq!(explicit_lines("-1", "auto", 2), (Some(2), 1));
        assert_eq!(explicit_lines("1", "-9", 3), (Some(0), 1));
    }

    #[test]
    fn test_lines_and_spans_are_bounded() {
        let limit = 2 + IMPLICIT_TRACK_LIMIT;
        assert_eq!(explicit_lines("1", "span 99999999999", 2), (Some(0), limit));
        assert_eq!(explicit_lines("2000000000", "auto", 2), (Some(limit - 1), 1));
        assert_eq!(explicit_lines("1", "2000000000", 2), (Some(0), limit));
        assert_eq!(explicit_lines("5", "span 1000", 2), (Some(4), limit - 4));
    }

    #[test]
    fn test_span_from_lines() {
        let lines = [0.0, 100.0, 200.0];
        assert_eq!(span_in(&lines, 0, 100.0), 1);
        assert_eq!(span_in(&lines, 0, 250.0), 3);
        assert_eq!(span_in(&lines, 1, 300.0), 2);
    }
}
