//! Feature extensions for the Android target.
//!
//! Each extension owns one CSS concern. They are registered in priority
//! order: the first one that accepts a node during base layout owns it.

pub mod accessibility;
pub mod background;
pub mod column;
pub mod css_grid;
pub mod fixed;
pub mod flexbox;
pub mod list;
pub mod max_width_height;
pub mod multiline;
pub mod negative_x;
pub mod positive_x;
pub mod radio_group;
pub mod relative;
pub mod sprite;
pub mod table;
pub mod vertical_align;
pub mod white_space;

use tessera_layout::{Application, Edge, LayoutContext, NodeId, NodeTree, ResourceStore};

use crate::constants::ANDROID;
use crate::controller::AndroidController;

/// Context handed to every Android extension.
pub type Context<'a> = LayoutContext<'a, AndroidController>;

/// Registers the built-in extensions in priority order.
pub fn register_all(app: &mut Application<AndroidController>) {
    app.register(accessibility::Accessibility);
    app.register(background::Background);
    app.register(fixed::Fixed);
    app.register(negative_x::NegativeX);
    app.register(positive_x::PositiveX);
    app.register(max_width_height::MaxWidthHeight);
    app.register(radio_group::RadioGroup);
    app.register(multiline::Multiline);
    app.register(css_grid::CssGrid);
    app.register(flexbox::Flexbox);
    app.register(table::Table);
    app.register(column::Column);
    app.register(list::List);
    app.register(sprite::Sprite);
    app.register(relative::Relative);
    app.register(vertical_align::VerticalAlign);
    app.register(white_space::WhiteSpace);
}

/// Points an image view at `uri`, registering it as a drawable.
pub(crate) fn set_image_source(tree: &mut NodeTree, resources: &mut ResourceStore, node: NodeId, uri: &str) {
    let name = resources.add_image(uri);
    tree[node].attributes.set(ANDROID, "src", format!("@drawable/{name}"));
}

/// Sides in box order.
pub(crate) const EDGES: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left];

/// Resolved `top`, `right`, `bottom` or `left` of a positioned element,
/// with percentages taken against its parent's box.
pub(crate) fn side_offset(tree: &NodeTree, id: NodeId, edge: Edge) -> Option<f32> {
    let node = &tree[id];
    let side = edge.to_string();
    if !node.is_element() || !node.has_offset(&side) {
        return None;
    }
    let basis = tree.parent(id).map_or(node.bounds(), |p| tree[p].bounds());
    let size = if edge.is_horizontal() { basis.width } else { basis.height };
    node.css_length_or_percent(&side, size)
}

/// Offsets below this are treated as zero.
pub(crate) const EPSILON: f32 = 0.5;

/// `layout_gravity` for a main-axis or `justify-*` keyword.
pub(crate) fn horizontal_gravity(keyword: &str) -> Option<&'static str> {
    match keyword.split_whitespace().last().unwrap_or_default() {
        "start" | "flex-start" | "self-start" | "left" => Some("start"),
        "end" | "flex-end" | "self-end" | "right" => Some("end"),
        "center" => Some("center_horizontal"),
        _ => None,
    }
}

/// `layout_gravity` for a cross-axis or `align-*` keyword.
pub(crate) fn vertical_gravity(keyword: &str) -> Option<&'static str> {
    match keyword.split_whitespace().last().unwrap_or_default() {
        "start" | "flex-start" | "self-start" | "top" | "baseline" => Some("top"),
        "end" | "flex-end" | "self-end" | "bottom" => Some("bottom"),
        "center" | "middle" => Some("center_vertical"),
        _ => None,
    }
}

/// Sorted positions with values closer than [`EPSILON`] merged.
pub(crate) fn distinct_lines(values: impl IntoIterator<Item = f32>) -> Vec<f32> {
    let mut values: Vec<f32> = values.into_iter().collect();
    values.sort_by(f32::total_cmp);
    values.dedup_by(|b, a| (*b - *a).abs() < EPSILON);
    values
}

/// Index of the last line at or before `position`.
pub(crate) fn line_index(lines: &[f32], position: f32) -> usize {
    lines
        .iter()
        .rposition(|&line| line <= position + EPSILON)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_lines() {
        let lines = distinct_lines([10.0, 0.0, 10.2, 55.0, 0.3]);
        assert_eq!(lines, vec![0.0, 10.0, 55.0]);
        assert_eq!(line_index(&lines, 54.8), 2);
        assert_eq!(line_index(&lines, 30.0), 1);
        assert_eq!(line_index(&lines, -4.0), 0);
    }

    #[test]
    fn test_gravity_keywords() {
        assert_eq!(horizontal_gravity("safe center"), Some("center_horizontal"));
        assert_eq!(horizontal_gravity("stretch"), None);
        assert_eq!(vertical_gravity("flex-end"), Some("bottom"));
        assert_eq!(vertical_gravity("normal"), None);
    }
}
