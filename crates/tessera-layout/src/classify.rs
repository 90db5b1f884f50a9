//! Default container inference.
//!
//! Used for every node no extension claims. The decision is driven by the
//! element itself for widgets, and otherwise by how the children were laid
//! out by the reference engine: stacked, in a row, floating, or absolutely
//! positioned.

use log::trace;

use crate::box_model::Rect;
use crate::layout_unit::{Alignment, ContainerType, LayoutUnit};
use crate::node::{Node, NodeId};
use crate::node_tree::NodeTree;

/// Tolerance for sub-pixel rounding in measured geometry.
const EPSILON: f32 = 0.5;

/// Widget type implied by the element alone.
#[must_use]
pub fn widget_type(node: &Node) -> Option<ContainerType> {
    if node.is_text() {
        return Some(ContainerType::Text);
    }
    let widget = match node.tag.as_str() {
        "img" | "svg" | "canvas" | "picture" => ContainerType::Image,
        "textarea" => ContainerType::Edit,
        "select" => ContainerType::Select,
        "button" => ContainerType::Button,
        "hr" => ContainerType::Line,
        "iframe" | "video" | "embed" | "object" => ContainerType::Web,
        "input" => match node.input_type().as_str() {
            "checkbox" => ContainerType::Checkbox,
            "radio" => ContainerType::Radio,
            "range" => ContainerType::Range,
            "submit" | "reset" | "button" | "image" => ContainerType::Button,
            "hidden" => return None,
            _ => ContainerType::Edit,
        },
        _ => return None,
    };
    Some(widget)
}

/// Whether the node's content renders as one run of text.
fn is_text_only(tree: &NodeTree, id: NodeId) -> bool {
    let children = tree.visible_children(id);
    !children.is_empty()
        && children.iter().all(|&child| {
            let node = &tree[child];
            node.is_text()
                || (node.flags.inline
                    && node.is_element()
                    && !node.has_visual()
                    && widget_type(node).is_none()
                    && is_text_only(tree, child))
        })
}

fn is_horizontal_row(rects: &[Rect]) -> bool {
    rects
        .windows(2)
        .all(|pair| pair[1].x >= pair[0].right() - EPSILON && pair[0].overlaps_vertically(&pair[1]))
}

fn is_vertical_stack(rects: &[Rect]) -> bool {
    rects.windows(2).all(|pair| pair[1].y >= pair[0].bottom() - EPSILON)
}

/// Picks the container type and arrangement for `node`.
#[must_use]
pub fn classify(tree: &NodeTree, node: NodeId, parent: NodeId) -> LayoutUnit {
    let children = tree.visible_children(node);
    let unit = LayoutUnit::new(parent, node, children.clone());
    let current = &tree[node];

    if let Some(widget) = widget_type(current) {
        return unit.with_container(widget, Alignment::NONE);
    }
    if children.is_empty() {
        let container = if current.has_visual() || current.has_width() || current.has_height() {
            ContainerType::Frame
        } else {
            ContainerType::Space
        };
        return unit.with_container(container, Alignment::NONE);
    }
    if is_text_only(tree, node) {
        return unit.with_container(ContainerType::Text, Alignment::NONE);
    }

    let flow: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|&c| tree[c].flags.page_flow)
        .collect();
    let absolute = children.len() - flow.len();
    let wrapper = if current.is_synthetic() {
        Alignment::WRAPPER
    } else {
        Alignment::NONE
    };

    let unit = if children.len() == 1 {
        unit.with_container(ContainerType::Frame, Alignment::SINGLE | wrapper)
    } else if flow.is_empty() {
        unit.with_container(ContainerType::Constraint, Alignment::ABSOLUTE | wrapper)
    } else if absolute > 0 {
        unit.with_container(ContainerType::Constraint, Alignment::AUTO_LAYOUT | wrapper)
    } else if flow.iter().any(|&c| tree[c].is_floating()) {
        unit.with_container(ContainerType::Relative, Alignment::FLOAT | wrapper)
    } else {
        let rects: Vec<Rect> = flow.iter().map(|&c| tree[c].linear()).collect();
        let inline = flow.iter().all(|&c| tree[c].flags.inline);
        if is_horizontal_row(&rects) {
            unit.with_container(ContainerType::Linear, Alignment::HORIZONTAL | wrapper)
        } else if inline {
            unit.with_container(
                ContainerType::Relative,
                Alignment::HORIZONTAL | Alignment::MULTILINE | wrapper,
            )
        } else if is_vertical_stack(&rects) {
            unit.with_container(ContainerType::Linear, Alignment::VERTICAL | wrapper)
        } else {
            unit.with_container(ContainerType::Constraint, Alignment::AUTO_LAYOUT | wrapper)
        }
    };
    trace!(
        "classified {node:?} <{}> as {} {:?}",
        current.tag, unit.container_type, unit.alignment
    );
    unit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_and_stack_detection() {
        let row = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(10.0, 0.0, 10.0, 10.0)];
        assert!(is_horizontal_row(&row));
        assert!(!is_vertical_stack(&row));
        let stack = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 10.2, 10.0, 10.0)];
        assert!(is_vertical_stack(&stack));
        assert!(!is_horizontal_row(&stack));
    }
}
