//! Tables as `GridLayout`.
//!
//! Cells are lifted out of their rows and sections into the table itself
//! and placed by an occupancy grid that honours `colspan` and `rowspan`.
//! A caption becomes a first row spanning every column; a row without cells
//! keeps its height through a spacer.

use std::ops::RangeInclusive;

use log::debug;
use tessera_common::units::{parse_integer, parse_length};
use tessera_layout::{
    Alignment, BoxRegion, ContainerType, Extension, ExtensionResult, LayoutUnit, NodeId, NodeKind, NodeTree,
    SyntheticKind,
};

use super::Context;
use super::css_grid::{CELL, GridCell, write_cell};
use crate::constants::ANDROID;
use crate::controller::{AndroidController, set_explicit_spacing};

const SECTIONS: &[&str] = &["thead", "tbody", "tfoot"];

/// Rows in document order, looking through row groups.
fn table_rows(tree: &NodeTree, table: NodeId) -> (Vec<NodeId>, Vec<NodeId>) {
    let mut rows = Vec::new();
    let mut sections = Vec::new();
    for child in tree.visible_children(table) {
        let tag = tree[child].tag.as_str();
        if tag == "tr" {
            rows.push(child);
        } else if SECTIONS.contains(&tag) {
            sections.push(child);
            rows.extend(
                tree.visible_children(child)
                    .into_iter()
                    .filter(|&r| tree[r].tag == "tr"),
            );
        }
    }
    (rows, sections)
}

/// `colspan` values browsers honour.
const COLSPAN: RangeInclusive<i32> = 1..=1000;
/// `rowspan` values browsers honour; zero runs to the end of the table.
const ROWSPAN: RangeInclusive<i32> = 0..=65534;

/// A span attribute clamped into `range`; missing, negative or unparsable
/// values count as one.
fn parse_span(value: Option<&str>, range: &RangeInclusive<i32>) -> usize {
    value
        .and_then(parse_integer)
        .filter(|n| *n >= 0)
        .and_then(|n| usize::try_from(n.clamp(*range.start(), *range.end())).ok())
        .unwrap_or(1)
}

/// Occupancy grid placement of `rows`. A `rowspan` of zero runs to the last
/// row.
pub(crate) fn place_cells(rows: &[Vec<(usize, usize)>]) -> Vec<Vec<GridCell>> {
    let mut occupied: Vec<Vec<bool>> = vec![Vec::new(); rows.len()];
    let mut placed = Vec::with_capacity(rows.len());
    for (row, cells) in rows.iter().enumerate() {
        let mut column = 0;
        let mut line = Vec::with_capacity(cells.len());
        for &(column_span, row_span) in cells {
            while occupied[row].get(column).copied().unwrap_or(false) {
                column += 1;
            }
            let column_span = column_span.max(1);
            let row_span = if row_span == 0 { rows.len() - row } else { row_span.min(rows.len() - row) };
            for taken in &mut occupied[row..row + row_span] {
                if taken.len() < column + column_span {
                    taken.resize(column + column_span, false);
                }
                for slot in &mut taken[column..column + column_span] {
                    *slot = true;
                }
            }
            line.push(GridCell {
                row,
                column,
                row_span,
                column_span,
            });
            column += column_span;
        }
        placed.push(line);
    }
    placed
}

fn border_spacing(tree: &NodeTree, table: NodeId) -> (f32, f32) {
    let node = &tree[table];
    if node.css("border-collapse") == "collapse" {
        return (0.0, 0.0);
    }
    let context = *node.length_context();
    let values: Vec<f32> = node
        .css("border-spacing")
        .split_whitespace()
        .filter_map(|v| parse_length(v, &context))
        .collect();
    match values.as_slice() {
        [both] => (*both, *both),
        [horizontal, vertical, ..] => (*horizontal, *vertical),
        [] => (0.0, 0.0),
    }
}

fn cell_gravity(tree: &NodeTree, cell: NodeId) -> Option<String> {
    let node = &tree[cell];
    let vertical = match node.css("vertical-align") {
        "middle" => Some("center_vertical"),
        "bottom" => Some("bottom"),
        _ => None,
    };
    let horizontal = match node.css("text-align") {
        "center" => Some("center_horizontal"),
        "right" | "end" => Some("end"),
        _ => None,
    };
    let parts: Vec<&str> = [vertical, horizontal].into_iter().flatten().collect();
    (!parts.is_empty()).then(|| parts.join("|"))
}

/// Lays out `<table>` elements.
#[derive(Debug, Default)]
pub struct Table;

impl Extension<AndroidController> for Table {
    fn name(&self) -> &'static str {
        "table"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].is_element() && tree[node].tag == "table"
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        !table_rows(ctx.tree, node).0.is_empty()
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let settings = ctx.controller.settings().clone();
        let (rows, sections) = table_rows(ctx.tree, node);
        let caption = ctx
            .tree
            .visible_children(node)
            .into_iter()
            .find(|&c| ctx.tree[c].tag == "caption");
        let row_cells: Vec<Vec<NodeId>> = rows
            .iter()
            .map(|&row| {
                ctx.tree
                    .visible_children(row)
                    .into_iter()
                    .filter(|&c| matches!(ctx.tree[c].tag.as_str(), "td" | "th"))
                    .collect()
            })
            .collect();
        let spans: Vec<Vec<(usize, usize)>> = row_cells
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .map(|&c| {
                        let cell = &ctx.tree[c];
                        (parse_span(cell.attr("colspan"), &COLSPAN), parse_span(cell.attr("rowspan"), &ROWSPAN))
                    })
                    .collect()
            })
            .collect();
        let placed = place_cells(&spans);
        let offset = usize::from(caption.is_some());
        let column_count = placed
            .iter()
            .flatten()
            .map(|c| c.column + c.column_span)
            .max()
            .unwrap_or(1);
        let row_count = rows.len() + offset;
        let (spacing_x, spacing_y) = border_spacing(ctx.tree, node);

        let mut children = Vec::new();
        if let Some(caption) = caption {
            let cell = GridCell {
                column_span: column_count,
                ..GridCell::default()
            };
            ctx.tree[caption].data.set(CELL, cell);
            ctx.tree.insert_child(node, 0, caption);
            children.push(caption);
        }
        for (index, ((&row, cells), positions)) in rows.iter().zip(&row_cells).zip(&placed).enumerate() {
            if cells.is_empty() {
                let spanned = placed[..index]
                    .iter()
                    .flatten()
                    .any(|c| c.row + c.row_span > index);
                if !spanned {
                    let bounds = ctx.tree[row].bounds();
                    let spacer = ctx.tree.create_synthetic(SyntheticKind::Spacer, bounds, None);
                    let cell = GridCell {
                        row: index + offset,
                        column_span: column_count,
                        ..GridCell::default()
                    };
                    ctx.tree[spacer].data.set(CELL, cell);
                    ctx.tree.append_child(node, spacer);
                    children.push(spacer);
                }
                continue;
            }
            for (&cell_node, &position) in cells.iter().zip(positions) {
                let cell = GridCell {
                    row: position.row + offset,
                    ..position
                };
                let bounds = ctx.tree[cell_node].bounds();
                if position.column + position.column_span < column_count {
                    ctx.tree.modify_box(cell_node, BoxRegion::MarginRight, spacing_x, false);
                }
                if position.row + position.row_span < rows.len() {
                    ctx.tree.modify_box(cell_node, BoxRegion::MarginBottom, spacing_y, false);
                }
                let gravity = cell_gravity(ctx.tree, cell_node);
                let attributes = &mut ctx.tree[cell_node].attributes;
                attributes.set(ANDROID, "layout_width", settings.dp(bounds.width));
                attributes.set(ANDROID, "layout_height", settings.dp(bounds.height));
                if let Some(gravity) = gravity {
                    attributes.set(ANDROID, "gravity", gravity);
                }
                ctx.tree[cell_node].data.set(CELL, cell);
                ctx.tree.append_child(node, cell_node);
                children.push(cell_node);
            }
        }
        for region in BoxRegion::PADDING {
            let spacing = if region.edge().is_horizontal() { spacing_x } else { spacing_y };
            ctx.tree.modify_box(node, region, spacing, false);
        }
        for section in sections.into_iter().chain(rows) {
            ctx.tree.exclude(section);
        }

        debug!("table {node:?}: {row_count} rows x {column_count} columns");
        ctx.tree[node].render_extensions.push(self.name());
        set_explicit_spacing(ctx.tree, node);
        let unit = LayoutUnit::new(parent, node, children)
            .with_container(ContainerType::Grid, Alignment::NONE)
            .with_grid(row_count, column_count);
        Some(ExtensionResult::output(unit))
    }

    fn process_child(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let cell = ctx.tree[node].data.get(CELL).copied()?;
        write_cell(ctx.tree, node, cell);
        if matches!(ctx.tree[node].kind, NodeKind::Synthetic(SyntheticKind::Spacer)) {
            let settings = ctx.controller.settings();
            let height = settings.dp(ctx.tree[node].bounds().height);
            ctx.tree[node].attributes.set(ANDROID, "layout_height", height);
            let unit = LayoutUnit::new(parent, node, Vec::new()).with_container(ContainerType::Space, Alignment::NONE);
            return Some(ExtensionResult::output(unit));
        }
        Some(ExtensionResult::next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: usize, column: usize, row_span: usize, column_span: usize) -> GridCell {
        GridCell {
            row,
            column,
            row_span,
            column_span,
        }
    }

    #[test]
    fn test_rowspan_pushes_later_cells_right() {
        let placed = place_cells(&[vec![(1, 2), (1, 1)], vec![(1, 1)]]);
        assert_eq!(placed[0], vec![cell(0, 0, 2, 1), cell(0, 1, 1, 1)]);
        assert_eq!(placed[1], vec![cell(1, 1, 1, 1)]);
    }

    #[test]
    fn test_spans_are_clamped() {
        assert_eq!(parse_span(Some("1e15"), &COLSPAN), 1);
        assert_eq!(parse_span(Some("5000"), &COLSPAN), 1000);
        assert_eq!(parse_span(Some("0"), &COLSPAN), 1);
        assert_eq!(parse_span(Some("0"), &ROWSPAN), 0);
        assert_eq!(parse_span(Some("70000"), &ROWSPAN), 65534);
        assert_eq!(parse_span(Some("-2"), &ROWSPAN), 1);
        assert_eq!(parse_span(Some("wide"), &COLSPAN), 1);
        assert_eq!(parse_span(None, &ROWSPAN), 1);
    }

    #[test]
    fn test_colspan_and_open_rowspan() {
        let placed = place_cells(&[vec![(2, 0)], vec![(1, 1)], vec![]]);
        assert_eq!(placed[0], vec![cell(0, 0, 3, 2)]);
        assert_eq!(placed[1], vec![cell(1, 2, 1, 1)]);
        assert!(placed[2].is_empty());
    }
}
