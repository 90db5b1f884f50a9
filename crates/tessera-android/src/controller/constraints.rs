//! Positions for children of layout containers.
//!
//! Children keep the place the reference engine measured for them. Each
//! container kind gets its native anchors, and whatever distance the anchors
//! and CSS margins do not already account for is added to the margins.

use tessera_layout::{Alignment, BoxRegion, ContainerType, Float, NodeId, NodeTree};

use super::has_explicit_spacing;
use crate::constants::{ANDROID, APP, MATCH_PARENT, PARENT};
use crate::extensions::relative::flow_rect;
use crate::settings::{API_RTL, AndroidSettings};

/// Gaps below this are measurement noise.
const EPSILON: f32 = 0.5;

const HORIZONTAL_ANCHORS: &[&str] = &[
    "layout_constraintStart_toStartOf",
    "layout_constraintStart_toEndOf",
    "layout_constraintEnd_toEndOf",
    "layout_constraintEnd_toStartOf",
    "layout_constraintLeft_toLeftOf",
    "layout_constraintLeft_toRightOf",
    "layout_constraintRight_toRightOf",
    "layout_constraintRight_toLeftOf",
];

const VERTICAL_ANCHORS: &[&str] = &[
    "layout_constraintTop_toTopOf",
    "layout_constraintTop_toBottomOf",
    "layout_constraintBottom_toBottomOf",
    "layout_constraintBottom_toTopOf",
    "layout_constraintBaseline_toBaselineOf",
];

pub(super) fn apply(tree: &mut NodeTree, settings: &AndroidSettings) {
    for parent in tree.render_order() {
        let children: Vec<NodeId> = tree
            .render_children(parent)
            .iter()
            .copied()
            .filter(|&c| !tree[c].flags.excluded)
            .collect();
        if children.is_empty() {
            continue;
        }
        let explicit = has_explicit_spacing(tree, parent);
        match tree[parent].container_type {
            ContainerType::Constraint => constraint_anchors(tree, parent, &children, settings, explicit),
            ContainerType::Relative => relative_flow(tree, parent, &children, settings, explicit),
            ContainerType::Frame if !explicit => frame_offsets(tree, parent, &children),
            ContainerType::Linear | ContainerType::RadioGroup if !explicit => {
                linear_offsets(tree, parent, &children);
            }
            _ => {}
        }
    }
}

/// Adds `gap` to a margin of `child` unless an extension owns that margin.
fn shift(tree: &mut NodeTree, parent: NodeId, child: NodeId, region: BoxRegion, gap: f32) {
    if gap.abs() < EPSILON || tree.inner_wrapped(parent) == Some(child) || tree.get_box(child, region).0 {
        return;
    }
    tree.modify_box(child, region, gap, true);
}

/// Sets a start/end style attribute, plus its left/right twin on devices
/// without RTL support.
fn directional(
    tree: &mut NodeTree,
    child: NodeId,
    namespace: &str,
    (modern, legacy): (&str, &str),
    value: &str,
    settings: &AndroidSettings,
) {
    let attributes = &mut tree[child].attributes;
    attributes.set(namespace, modern, value);
    if !settings.supports(API_RTL) {
        attributes.set(namespace, legacy, value);
    }
}

fn reference(tree: &NodeTree, id: NodeId) -> Option<String> {
    tree[id].document_id().map(|d| format!("@id/{d}"))
}

/// Right edge of the border box in flow plus the margin that will be emitted.
fn outer_right(tree: &NodeTree, id: NodeId) -> f32 {
    let css = tree[id].box_model().margin.right;
    flow_rect(tree, id).right() - css + tree.box_value(id, BoxRegion::MarginRight)
}

fn outer_bottom(tree: &NodeTree, id: NodeId) -> f32 {
    let css = tree[id].box_model().margin.bottom;
    flow_rect(tree, id).bottom() - css + tree.box_value(id, BoxRegion::MarginBottom)
}

fn is_centered(tree: &NodeTree, parent: NodeId, child: NodeId) -> bool {
    let node = &tree[child];
    (node.css_initial("margin-left") == "auto" && node.css_initial("margin-right") == "auto")
        || (node.flags.inline && tree[parent].css("text-align") == "center")
}

fn constraint_anchors(
    tree: &mut NodeTree,
    parent: NodeId,
    children: &[NodeId],
    settings: &AndroidSettings,
    explicit: bool,
) {
    let content = tree[parent].content_box();
    let mut previous_flow: Option<NodeId> = None;
    for &child in children {
        let rect = flow_rect(tree, child);
        let node = &tree[child];
        let in_flow = node.flags.page_flow;
        let from_right = !in_flow && node.has_offset("right") && !node.has_offset("left");
        let from_bottom = !in_flow && node.has_offset("bottom") && !node.has_offset("top");
        let anchored_x = HORIZONTAL_ANCHORS.iter().any(|a| node.attributes.contains(APP, a));
        let anchored_y = VERTICAL_ANCHORS.iter().any(|a| node.attributes.contains(APP, a));

        if !anchored_x {
            if from_right {
                let names = ("layout_constraintEnd_toEndOf", "layout_constraintRight_toRightOf");
                directional(tree, child, APP, names, PARENT, settings);
                if !explicit {
                    shift(tree, parent, child, BoxRegion::MarginRight, content.right() - rect.right());
                }
            } else {
                let names = ("layout_constraintStart_toStartOf", "layout_constraintLeft_toLeftOf");
                directional(tree, child, APP, names, PARENT, settings);
                if !explicit {
                    shift(tree, parent, child, BoxRegion::MarginLeft, rect.x - content.x);
                }
            }
        }

        if !anchored_y {
            let below = previous_flow
                .filter(|_| in_flow)
                .filter(|&prev| rect.y >= tree[prev].bounds().bottom() - EPSILON)
                .and_then(|prev| Some((prev, reference(tree, prev)?)));
            let attributes = &mut tree[child].attributes;
            if from_bottom {
                attributes.set(APP, "layout_constraintBottom_toBottomOf", PARENT);
                if !explicit {
                    shift(tree, parent, child, BoxRegion::MarginBottom, content.bottom() - rect.bottom());
                }
            } else if let Some((prev, target)) = below {
                attributes.set(APP, "layout_constraintTop_toBottomOf", target);
                if !explicit {
                    let gap = rect.y - tree[prev].bounds().bottom();
                    shift(tree, parent, child, BoxRegion::MarginTop, gap);
                }
            } else {
                attributes.set(APP, "layout_constraintTop_toTopOf", PARENT);
                if !explicit {
                    shift(tree, parent, child, BoxRegion::MarginTop, rect.y - content.y);
                }
            }
        }
        if in_flow {
            previous_flow = Some(child);
        }
    }
}

fn relative_flow(
    tree: &mut NodeTree,
    parent: NodeId,
    children: &[NodeId],
    settings: &AndroidSettings,
    explicit: bool,
) {
    let content = tree[parent].content_box();
    let mut above: Option<NodeId> = None;
    let mut row_lowest: Option<NodeId> = None;
    let mut row_last: Option<NodeId> = None;
    let mut anchor: Option<NodeId> = None;

    for &child in children {
        let rect = flow_rect(tree, child);
        let new_row = row_last.is_some_and(|last| {
            let last = flow_rect(tree, last);
            tree[child].line_break_leading
                || !last.overlaps_vertically(&rect)
                || rect.x < last.right() - EPSILON
        });
        if new_row {
            above = row_lowest.or(above);
            row_lowest = None;
            anchor = None;
        }

        if tree[child].float() == Float::Right {
            let names = ("layout_alignParentEnd", "layout_alignParentRight");
            directional(tree, child, ANDROID, names, "true", settings);
            if !explicit {
                shift(tree, parent, child, BoxRegion::MarginRight, content.right() - rect.right());
            }
        } else {
            let start = match anchor.and_then(|a| Some((a, reference(tree, a)?))) {
                Some((previous, target)) => {
                    directional(tree, child, ANDROID, ("layout_toEndOf", "layout_toRightOf"), &target, settings);
                    outer_right(tree, previous)
                }
                None => content.x,
            };
            if !explicit {
                shift(tree, parent, child, BoxRegion::MarginLeft, rect.x - start);
            }
            anchor = Some(child);
        }

        let top = match above.and_then(|a| Some((a, reference(tree, a)?))) {
            Some((lowest, target)) => {
                tree[child].attributes.set(ANDROID, "layout_below", target);
                outer_bottom(tree, lowest)
            }
            None => content.y,
        };
        if !explicit {
            shift(tree, parent, child, BoxRegion::MarginTop, rect.y - top);
        }

        row_last = Some(child);
        if row_lowest.is_none_or(|lowest| outer_bottom(tree, child) > outer_bottom(tree, lowest)) {
            row_lowest = Some(child);
        }
    }
}

fn frame_offsets(tree: &mut NodeTree, parent: NodeId, children: &[NodeId]) {
    let content = tree[parent].content_box();
    for &child in children {
        let rect = flow_rect(tree, child);
        if is_centered(tree, parent, child) {
            tree[child]
                .attributes
                .set_if_absent(ANDROID, "layout_gravity", "center_horizontal");
        } else {
            shift(tree, parent, child, BoxRegion::MarginLeft, rect.x - content.x);
        }
        shift(tree, parent, child, BoxRegion::MarginTop, rect.y - content.y);
    }
}

fn linear_offsets(tree: &mut NodeTree, parent: NodeId, children: &[NodeId]) {
    let content = tree[parent].content_box();
    let vertical = tree[parent].alignment.contains(Alignment::VERTICAL);
    let end_aligned = matches!(tree[parent].css("text-align"), "right" | "end");
    let mut previous: Option<NodeId> = None;
    for &child in children {
        let rect = flow_rect(tree, child);
        if vertical {
            let start = previous.map_or(content.y, |p| outer_bottom(tree, p));
            shift(tree, parent, child, BoxRegion::MarginTop, rect.y - start);
            previous = Some(child);
            let fills = tree[child].attributes.get(ANDROID, "layout_width") == Some(MATCH_PARENT);
            if fills {
                continue;
            }
            if is_centered(tree, parent, child) {
                tree[child]
                    .attributes
                    .set_if_absent(ANDROID, "layout_gravity", "center_horizontal");
            } else if end_aligned && tree[child].flags.inline {
                tree[child].attributes.set_if_absent(ANDROID, "layout_gravity", "end");
            } else {
                shift(tree, parent, child, BoxRegion::MarginLeft, rect.x - content.x);
            }
        } else {
            let start = previous.map_or(content.x, |p| outer_right(tree, p));
            shift(tree, parent, child, BoxRegion::MarginLeft, rect.x - start);
            if !tree[child].attributes.contains(ANDROID, "layout_gravity") {
                shift(tree, parent, child, BoxRegion::MarginTop, rect.y - content.y);
            }
            previous = Some(child);
        }
    }
}
