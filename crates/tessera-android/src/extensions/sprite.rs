//! CSS sprites.
//!
//! A fixed-size box that shows one region of a larger image through a
//! non-repeating `background-position` becomes a `FrameLayout` clipping an
//! `ImageView` drawn at its natural size and shifted by the position.

use tessera_common::css_url::css_urls;
use tessera_common::units::{parse_length, split_outside_parens};
use tessera_layout::{
    Alignment, BoxRegion, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeTree, Rect,
    SyntheticKind,
};

use super::{Context, EPSILON, set_image_source};
use crate::constants::{ANDROID, WRAP_CONTENT};
use crate::controller::{AndroidController, set_explicit_spacing};

/// Image uri of the sprite layer.
const SOURCE: DataKey<String> = DataKey::new("sprite", "source");

/// `background-position` as pixel offsets. Percentages and keywords are not
/// sprite positions.
fn sprite_position(tree: &NodeTree, node: NodeId) -> Option<(f32, f32)> {
    let node = &tree[node];
    let context = *node.length_context();
    let parts: Vec<f32> = node
        .css("background-position")
        .split_whitespace()
        .map(|v| parse_length(v, &context))
        .collect::<Option<Vec<f32>>>()?;
    match parts.as_slice() {
        [x] => Some((*x, 0.0)),
        [x, y] => Some((*x, *y)),
        _ => None,
    }
}

/// Shows a region of a sprite sheet.
#[derive(Debug, Default)]
pub struct Sprite;

impl Extension<AndroidController> for Sprite {
    fn name(&self) -> &'static str {
        "sprite"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        let current = &tree[node];
        current.is_element()
            && current.has_width()
            && current.has_height()
            && tree.visible_children(node).is_empty()
            && current.css("background-repeat") == "no-repeat"
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, _parent: NodeId) -> bool {
        let current = &ctx.tree[node];
        if split_outside_parens(current.css("background-image"), ',').len() != 1 {
            return false;
        }
        let Some(url) = css_urls(current.css("background-image")).first().map(|url| (*url).to_string()) else {
            return false;
        };
        let Some((x, y)) = sprite_position(ctx.tree, node) else {
            return false;
        };
        if x.abs() < EPSILON && y.abs() < EPSILON {
            return false;
        }
        ctx.tree[node].data.set(SOURCE, url);
        true
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let url = ctx.tree[node].data.take(SOURCE)?;
        let (x, y) = sprite_position(ctx.tree, node)?;
        let current = &ctx.tree[node];
        let bounds = current.bounds();
        let border = current.box_model().border;
        let padding = current.box_model().padding;
        let frame = Rect::new(bounds.x + border.left + x, bounds.y + border.top + y, bounds.width, bounds.height);

        let layer = ctx.tree.create_synthetic(SyntheticKind::Layer, frame, Some(node));
        ctx.tree[layer].data.set(SOURCE, url);
        ctx.tree.append_child(node, layer);
        // Positions are relative to the padding box, the frame lays out from the content box.
        ctx.tree.modify_box(layer, BoxRegion::MarginLeft, x - padding.left, true);
        ctx.tree.modify_box(layer, BoxRegion::MarginTop, y - padding.top, true);

        ctx.tree[node].set_css("background-image", "none");
        ctx.tree[node].render_extensions.push(self.name());
        set_explicit_spacing(ctx.tree, node);
        let unit = LayoutUnit::new(parent, node, vec![layer]).with_container(ContainerType::Frame, Alignment::SINGLE);
        Some(ExtensionResult::output(unit))
    }

    fn process_child(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let url = ctx.tree[node].data.take(SOURCE)?;
        set_image_source(ctx.tree, ctx.resources, node, &url);
        let attributes = &mut ctx.tree[node].attributes;
        attributes.set(ANDROID, "layout_width", WRAP_CONTENT);
        attributes.set(ANDROID, "layout_height", WRAP_CONTENT);
        attributes.set(ANDROID, "scaleType", "matrix");
        let unit = LayoutUnit::new(parent, node, Vec::new()).with_container(ContainerType::Image, Alignment::NONE);
        Some(ExtensionResult::output(unit))
    }
}
