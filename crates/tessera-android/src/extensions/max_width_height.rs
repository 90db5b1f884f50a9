//! `max-width` and `max-height`.
//!
//! Widgets take the native `maxWidth`/`maxHeight`. Layouts have no such
//! attribute, so they are wrapped in a `ConstraintLayout` and sized with a
//! constrained `0dp` dimension and a maximum, centred when their horizontal
//! margins are `auto`.

use tessera_layout::{
    Alignment, BoxRegion, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeTree, SetBox,
    widget_type,
};

use super::Context;
use crate::constants::{ANDROID, APP, MATCH_CONSTRAINT, PARENT};
use crate::controller::AndroidController;
use crate::settings::API_RTL;

/// Resolved `(max-width, max-height)` in pixels.
const LIMITS: DataKey<(Option<f32>, Option<f32>)> = DataKey::new("max_width_height", "limits");

fn limit(tree: &NodeTree, node: NodeId, property: &str, horizontal: bool) -> Option<f32> {
    let current = &tree[node];
    if matches!(current.css(property), "" | "none") {
        return None;
    }
    let basis = tree.parent(node).map_or(current.bounds(), |p| tree[p].content_box());
    let size = if horizontal { basis.width } else { basis.height };
    current.css_length_or_percent(property, size).filter(|v| *v > 0.0)
}

fn is_auto_centered(tree: &NodeTree, node: NodeId) -> bool {
    let current = &tree[node];
    current.css_initial("margin-left") == "auto" && current.css_initial("margin-right") == "auto"
}

/// Applies maximum sizes.
#[derive(Debug, Default)]
pub struct MaxWidthHeight;

impl Extension<AndroidController> for MaxWidthHeight {
    fn name(&self) -> &'static str {
        "max_width_height"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        let current = &tree[node];
        current.is_element()
            && (!matches!(current.css("max-width"), "" | "none") || !matches!(current.css("max-height"), "" | "none"))
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> bool {
        if parent == ctx.tree.document() {
            return false;
        }
        let width = limit(ctx.tree, node, "max-width", true);
        let height = limit(ctx.tree, node, "max-height", false);
        if width.is_none() && height.is_none() {
            return false;
        }
        ctx.tree[node].data.set(LIMITS, (width, height));
        true
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let (width, height) = ctx.tree[node].data.take(LIMITS)?;
        let settings = ctx.controller.settings().clone();
        let leaf = widget_type(&ctx.tree[node]).is_some() || ctx.tree.visible_children(node).is_empty();
        if leaf {
            let image = ctx.tree[node].tag == "img";
            let attributes = &mut ctx.tree[node].attributes;
            if let Some(width) = width {
                attributes.set(ANDROID, "maxWidth", settings.dp(width));
            }
            if let Some(height) = height {
                attributes.set(ANDROID, "maxHeight", settings.dp(height));
            }
            if image {
                attributes.set(ANDROID, "adjustViewBounds", "true");
            }
            return None;
        }

        let centered = is_auto_centered(ctx.tree, node);
        let wrapper = ctx.tree.create_wrapper(node);
        if centered {
            let reset = SetBox { reset: Some(true), adjustment: Some(0.0) };
            ctx.tree.set_box(wrapper, BoxRegion::MarginLeft, reset);
            ctx.tree.set_box(wrapper, BoxRegion::MarginRight, reset);
        }
        let attributes = &mut ctx.tree[node].attributes;
        if let Some(width) = width {
            attributes.set(ANDROID, "layout_width", MATCH_CONSTRAINT);
            attributes.set(APP, "layout_constraintWidth_max", settings.dp(width));
            attributes.set(APP, "layout_constraintStart_toStartOf", PARENT);
            attributes.set(APP, "layout_constraintEnd_toEndOf", PARENT);
            if !settings.supports(API_RTL) {
                attributes.set(APP, "layout_constraintLeft_toLeftOf", PARENT);
                attributes.set(APP, "layout_constraintRight_toRightOf", PARENT);
            }
            let bias = if centered { "0.5" } else { "0" };
            attributes.set(APP, "layout_constraintHorizontal_bias", bias);
        }
        if let Some(height) = height {
            attributes.set(APP, "layout_constrainedHeight", "true");
            attributes.set(APP, "layout_constraintHeight_max", settings.dp(height));
        }
        let unit = LayoutUnit::new(parent, wrapper, vec![node])
            .with_container(ContainerType::Constraint, Alignment::AUTO_LAYOUT | Alignment::WRAPPER);
        Some(ExtensionResult::render_as(wrapper, Some(unit)))
    }
}
