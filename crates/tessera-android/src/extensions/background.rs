//! Layered and scaled background images.
//!
//! A drawable cannot crop or fit a bitmap the way `background-size: cover`
//! does, and only the first image of a list reaches the background
//! drawable. Such nodes are wrapped in a `FrameLayout` that stacks one
//! `ImageView` per image below the node itself.

use log::debug;
use tessera_common::color::parse_color;
use tessera_common::css_url::css_urls;
use tessera_common::units::split_outside_parens;
use tessera_layout::{
    Alignment, ContainerType, DataKey, Extension, ExtensionResult, LayoutUnit, NodeId, NodeTree, SyntheticKind,
};

use super::{Context, set_image_source};
use crate::constants::{ANDROID, MATCH_PARENT};
use crate::controller::{AndroidController, set_explicit_spacing};

/// Image uri and `background-size` of a layer.
const SOURCE: DataKey<(String, String)> = DataKey::new("background", "source");

fn layer_scale(size: &str) -> &'static str {
    match size.trim() {
        "cover" => "centerCrop",
        "contain" => "fitCenter",
        "100% 100%" => "fitXY",
        _ => "matrix",
    }
}

/// Renders multi-image and scaled backgrounds as image layers.
#[derive(Debug, Default)]
pub struct Background;

impl Extension<AndroidController> for Background {
    fn name(&self) -> &'static str {
        "background"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        let node = &tree[node];
        node.is_element() && node.css("background-image").contains("url(")
    }

    fn condition(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> bool {
        if parent == ctx.tree.document() {
            return false;
        }
        let current = &ctx.tree[node];
        let urls = css_urls(current.css("background-image"));
        let scaled = split_outside_parens(current.css("background-size"), ',')
            .iter()
            .any(|size| matches!(size.trim(), "cover" | "contain"));
        urls.len() > 1 || (urls.len() == 1 && scaled)
    }

    fn process_node(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let current = &ctx.tree[node];
        let urls: Vec<String> = css_urls(current.css("background-image"))
            .into_iter()
            .map(str::to_string)
            .collect();
        let sizes: Vec<String> = split_outside_parens(current.css("background-size"), ',')
            .into_iter()
            .map(|s| s.trim().to_string())
            .collect();
        let color = current.css("background-color").to_string();
        let bounds = current.bounds();

        let wrapper = ctx.tree.create_wrapper(node);
        if parse_color(&color).is_some_and(|c| !c.is_transparent()) {
            ctx.tree[wrapper].set_css("background-color", color);
        }
        // The first image of the list paints on top.
        let mut children = Vec::with_capacity(urls.len() + 1);
        for (index, url) in urls.into_iter().enumerate().rev() {
            let size = sizes
                .get(index)
                .or_else(|| sizes.last())
                .cloned()
                .unwrap_or_default();
            let layer = ctx.tree.create_synthetic(SyntheticKind::Layer, bounds, Some(node));
            ctx.tree[layer].data.set(SOURCE, (url, size));
            let position = children.len();
            ctx.tree.insert_child(wrapper, position, layer);
            children.push(layer);
        }
        children.push(node);
        debug!("background of {node:?} split into {} layers", children.len() - 1);

        let inner = &mut ctx.tree[node];
        inner.set_css("background-image", "none");
        inner.set_css("background-color", "transparent");
        ctx.tree[wrapper].render_extensions.push(self.name());
        set_explicit_spacing(ctx.tree, wrapper);
        let unit = LayoutUnit::new(parent, wrapper, children)
            .with_container(ContainerType::Frame, Alignment::WRAPPER);
        Some(ExtensionResult::render_as(wrapper, Some(unit)))
    }

    fn process_child(&mut self, ctx: &mut Context<'_>, node: NodeId, parent: NodeId) -> Option<ExtensionResult> {
        let (uri, size) = ctx.tree[node].data.get(SOURCE).cloned()?;
        set_image_source(ctx.tree, ctx.resources, node, &uri);
        let attributes = &mut ctx.tree[node].attributes;
        attributes.set(ANDROID, "layout_width", MATCH_PARENT);
        attributes.set(ANDROID, "layout_height", MATCH_PARENT);
        attributes.set(ANDROID, "scaleType", layer_scale(&size));
        let unit = LayoutUnit::new(parent, node, Vec::new()).with_container(ContainerType::Image, Alignment::NONE);
        Some(ExtensionResult::output(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_scale() {
        assert_eq!(layer_scale("cover"), "centerCrop");
        assert_eq!(layer_scale(" contain"), "fitCenter");
        assert_eq!(layer_scale("auto"), "matrix");
        assert_eq!(layer_scale(""), "matrix");
    }
}
