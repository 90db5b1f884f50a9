//! Resource collection: strings, colors, text appearance, arrays and
//! background drawables.

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use log::warn;
use serde_json::{Map, Value, json};
use tessera_common::color::{Rgba, parse_color};
use tessera_common::units::{format_decimal, is_length, parse_number};
use tessera_common::warning::warn_once;
use tessera_layout::{
    ContainerType, Edge, EdgeSizes, Node, NodeId, NodeKind, NodeTree, ResourceStore, StyleResource,
    SyntheticKind, TraverseOptions,
};

use crate::constants::ANDROID;
use crate::extensions::accessibility::label_text;
use crate::settings::{API_LINE_HEIGHT, API_OREO, AndroidSettings};
use crate::template::{apply_template, rules};

/// Line height of `line-height: normal` relative to the font size.
const NORMAL_LINE_HEIGHT: f32 = 1.2;

static DRAWABLE: LazyLock<Map<String, Value>> = LazyLock::new(|| {
    rules(json!({
        "shape": {
            "@": ["xmlns:android", "android:shape"],
            ">": {
                "solid": { "@": ["android:color"] },
                "stroke": { "@": ["android:width", "android:color", "android:dashWidth", "android:dashGap"] },
                "corners": { "@": [
                    "android:radius",
                    "android:topLeftRadius",
                    "android:topRightRadius",
                    "android:bottomLeftRadius",
                    "android:bottomRightRadius"
                ] }
            }
        },
        "layer-list": {
            "@": ["xmlns:android"],
            ">": {
                "item": {
                    "@": ["android:left", "android:top", "android:right", "android:bottom"],
                    "#": "markup",
                    ">": { "bitmap": { "@": ["android:src", "android:gravity", "android:tileMode"] } }
                }
            }
        }
    }))
});

pub(super) fn apply(tree: &mut NodeTree, settings: &AndroidSettings, resources: &mut ResourceStore) {
    let mut appearances: Vec<(NodeId, IndexMap<String, String>)> = Vec::new();
    for id in tree.render_order() {
        let container = tree[id].container_type;
        match container {
            ContainerType::Image => image_source(tree, id, resources),
            ContainerType::Checkbox | ContainerType::Radio => {
                if !tree[id].attributes.contains(ANDROID, "text") {
                    if let Some(label) = label_text(tree, id) {
                        tree[id].attributes.set(ANDROID, "text", label);
                    }
                }
            }
            ContainerType::Select => entries(tree, id, resources),
            ContainerType::Line => rule_color(tree, id, resources),
            _ => {}
        }
        strings(tree, id, resources);
        if container.is_text() {
            appearances.push((id, text_appearance(&tree[id], settings, resources)));
            text_layout(tree, id, settings);
        }
        if container != ContainerType::Line {
            background(tree, id, settings, resources);
        }
    }
    apply_styles(tree, appearances, resources);
}

fn strings(tree: &mut NodeTree, id: NodeId, resources: &mut ResourceStore) {
    for name in ["text", "hint", "contentDescription"] {
        let attributes = &mut tree[id].attributes;
        let Some(value) = attributes.get(ANDROID, name).filter(|v| !v.starts_with('@')) else {
            continue;
        };
        let key = resources.add_string(value, None);
        attributes.set(ANDROID, name, format!("@string/{key}"));
    }
}

fn image_source(tree: &mut NodeTree, id: NodeId, resources: &mut ResourceStore) {
    let node = &tree[id];
    let source = node
        .attr("src")
        .or_else(|| node.attr("data-src"))
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let alt = node.attr("alt").filter(|a| !a.trim().is_empty()).map(str::to_string);
    let attributes = &mut tree[id].attributes;
    if let Some(source) = source {
        if !attributes.contains(ANDROID, "src") {
            let name = resources.add_image(&source);
            attributes.set(ANDROID, "src", format!("@drawable/{name}"));
        }
    }
    if let Some(alt) = alt {
        attributes.set_if_absent(ANDROID, "contentDescription", alt.trim());
    }
}

fn entries(tree: &mut NodeTree, id: NodeId, resources: &mut ResourceStore) {
    let options = tree.descend(
        id,
        &TraverseOptions::new()
            .include_excluded()
            .condition(|n| n.tag == "option"),
    );
    let items: Vec<String> = options
        .iter()
        .map(|&option| tree.text_content(option).trim().to_string())
        .collect();
    if items.is_empty() {
        return;
    }
    let hint = tree[id].document_id().unwrap_or("entries").to_string();
    let name = resources.add_array(&hint, items);
    tree[id].attributes.set(ANDROID, "entries", format!("@array/{name}"));
}

fn rule_color(tree: &mut NodeTree, id: NodeId, resources: &mut ResourceStore) {
    let node = &tree[id];
    let color = parse_color(node.css("border-top-color"))
        .or_else(|| parse_color(node.css("background-color")))
        .unwrap_or(Rgba::opaque(0x80, 0x80, 0x80));
    let name = resources.add_color(&color);
    tree[id]
        .attributes
        .set_if_absent(ANDROID, "background", format!("@color/{name}"));
}

/// Generic family for a CSS `font-family` list, `None` for the default.
fn font_family(value: &str) -> Option<&'static str> {
    let first = value
        .split(',')
        .next()?
        .trim()
        .trim_matches(['"', '\''])
        .to_ascii_lowercase();
    match first.as_str() {
        "serif" | "times" | "times new roman" | "georgia" => Some("serif"),
        "monospace" | "courier" | "courier new" | "consolas" | "menlo" => Some("monospace"),
        "cursive" => Some("cursive"),
        "" | "sans-serif" | "arial" | "helvetica" | "helvetica neue" | "system-ui"
        | "-apple-system" | "roboto" => None,
        other => {
            warn_once("font-family", &format!("`{other}` has no Android equivalent"));
            None
        }
    }
}

/// Attributes that may be shared through a style, keyed without namespace.
fn text_appearance(
    node: &Node,
    settings: &AndroidSettings,
    resources: &mut ResourceStore,
) -> IndexMap<String, String> {
    let mut items = IndexMap::new();
    let _ = items.insert("textSize".to_string(), settings.sp(node.font_size()));
    if let Some(color) = parse_color(node.css("color")) {
        let _ = items.insert("textColor".to_string(), format!("@color/{}", resources.add_color(&color)));
    }
    let bold = match node.css("font-weight") {
        "bold" | "bolder" => true,
        weight => parse_number(weight) >= 600.0,
    };
    let italic = matches!(node.css("font-style"), "italic" | "oblique");
    let style = match (bold, italic) {
        (true, true) => Some("bold|italic"),
        (true, false) => Some("bold"),
        (false, true) => Some("italic"),
        (false, false) => None,
    };
    if let Some(style) = style {
        let _ = items.insert("textStyle".to_string(), style.to_string());
    }
    if let Some(family) = font_family(node.css("font-family")) {
        let _ = items.insert("fontFamily".to_string(), family.to_string());
    }
    if node.css("text-transform") == "uppercase" {
        let _ = items.insert("textAllCaps".to_string(), "true".to_string());
    }
    items
}

/// Per-node text attributes that never go into a style.
fn text_layout(tree: &mut NodeTree, id: NodeId, settings: &AndroidSettings) {
    let node = &tree[id];
    let font_size = node.font_size();
    let mut set: Vec<(&str, String)> = Vec::new();
    if node.container_type != ContainerType::Button {
        match node.css("text-align") {
            "center" => set.push(("gravity", "center_horizontal".to_string())),
            "right" | "end" => set.push(("gravity", "end".to_string())),
            "justify" if settings.supports(API_OREO) => {
                set.push(("justificationMode", "inter_word".to_string()));
            }
            _ => {}
        }
    }
    if let Some(spacing) = node.css_length("letter-spacing").filter(|s| *s != 0.0) {
        if font_size > 0.0 {
            set.push(("letterSpacing", format_decimal(spacing / font_size, 3)));
        }
    }
    let line_height = match node.css("line-height") {
        "" | "normal" => None,
        value if is_length(value) => node.css_length("line-height"),
        value => Some(parse_number(value) * font_size),
    };
    if let Some(line_height) = line_height.filter(|h| *h > 0.0) {
        if settings.supports(API_LINE_HEIGHT) {
            set.push(("lineHeight", settings.sp(line_height)));
        } else {
            let extra = line_height - font_size * NORMAL_LINE_HEIGHT;
            if extra.abs() >= 0.5 {
                set.push(("lineSpacingExtra", settings.sp(extra)));
            }
        }
    }
    let attributes = &mut tree[id].attributes;
    for (name, value) in set {
        attributes.set_if_absent(ANDROID, name, value);
    }
}

/// Moves text appearances shared by two or more views into a style.
fn apply_styles(
    tree: &mut NodeTree,
    appearances: Vec<(NodeId, IndexMap<String, String>)>,
    resources: &mut ResourceStore,
) {
    let key = |items: &IndexMap<String, String>| -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    };
    let mut counts: HashMap<Vec<(String, String)>, usize> = HashMap::new();
    for (_, items) in &appearances {
        *counts.entry(key(items)).or_default() += 1;
    }
    for (id, items) in appearances {
        let shared = items.len() > 1 && counts.get(&key(&items)).copied().unwrap_or(0) > 1;
        let attributes = &mut tree[id].attributes;
        if shared {
            let style = StyleResource {
                parent: None,
                items: items
                    .into_iter()
                    .map(|(name, value)| (format!("{ANDROID}:{name}"), value))
                    .collect(),
            };
            let name = resources.add_style("TextStyle", style);
            attributes.set("", "style", format!("@style/{name}"));
        } else {
            for (name, value) in items {
                attributes.set_if_absent(ANDROID, &name, value);
            }
        }
    }
}

fn first_url(value: &str) -> Option<&str> {
    let start = value.find("url(")? + 4;
    let rest = &value[start..];
    let end = rest.find(')')?;
    let url = rest[..end].trim().trim_matches(['"', '\'']);
    (!url.is_empty()).then_some(url)
}

fn border_color(node: &Node, edge: Edge) -> Rgba {
    parse_color(node.css(&format!("border-{edge}-color")))
        .or_else(|| parse_color(node.css("color")))
        .unwrap_or(Rgba::opaque(0, 0, 0))
}

fn background(tree: &mut NodeTree, id: NodeId, settings: &AndroidSettings, resources: &mut ResourceStore) {
    let node = &tree[id];
    let layer = matches!(
        node.kind,
        NodeKind::Synthetic(SyntheticKind::Layer | SyntheticKind::Marker)
    );
    if layer || node.is_text() || node.attributes.contains(ANDROID, "background") {
        return;
    }
    let fill = parse_color(node.css("background-color"));
    let border: EdgeSizes = node.box_model().border;
    let bounds = node.bounds();
    let basis = bounds.width.min(bounds.height);
    let radius = |corner: &str| {
        node.css_length_or_percent(&format!("border-{corner}-radius"), basis)
            .unwrap_or(0.0)
            .max(0.0)
    };
    let radii = [
        radius("top-left"),
        radius("top-right"),
        radius("bottom-left"),
        radius("bottom-right"),
    ];
    let image_value = node.css("background-image");
    if image_value.contains("gradient(") {
        warn_once("background", "gradients are not translated");
    }
    let image = first_url(image_value).map(str::to_string);
    let has_border = border.horizontal() + border.vertical() > 0.0;
    let rounded = radii.iter().any(|r| *r > 0.0);
    if fill.is_none() && !has_border && image.is_none() {
        return;
    }

    let value = if !has_border && !rounded && image.is_none() {
        fill.map(|color| format!("@color/{}", resources.add_color(&color)))
    } else if !has_border && !rounded && fill.is_none() {
        image.map(|uri| format!("@drawable/{}", resources.add_image(&uri)))
    } else {
        let document_id = node.document_id().unwrap_or("view").to_string();
        let xml = drawable(node, fill, border, radii, image.as_deref(), settings, resources);
        match xml {
            Ok(xml) => {
                let name = resources.add_drawable(&format!("{document_id}_background"), &xml);
                Some(format!("@drawable/{name}"))
            }
            Err(err) => {
                warn!("background of {id:?} skipped: {err}");
                None
            }
        }
    };
    if let Some(value) = value {
        tree[id].attributes.set(ANDROID, "background", value);
    }
}

#[allow(clippy::too_many_arguments)]
fn drawable(
    node: &Node,
    fill: Option<Rgba>,
    border: EdgeSizes,
    radii: [f32; 4],
    image: Option<&str>,
    settings: &AndroidSettings,
    resources: &mut ResourceStore,
) -> Result<String, crate::template::TemplateError> {
    let namespace = settings.namespaces.android.as_str();
    let color = |resources: &mut ResourceStore, rgba: &Rgba| format!("@color/{}", resources.add_color(rgba));
    let corners = if radii.iter().all(|r| *r == radii[0]) {
        (radii[0] > 0.0).then(|| json!([{ "android:radius": settings.dp(radii[0]) }]))
    } else {
        Some(json!([{
            "android:topLeftRadius": settings.dp(radii[0]),
            "android:topRightRadius": settings.dp(radii[1]),
            "android:bottomLeftRadius": settings.dp(radii[2]),
            "android:bottomRightRadius": settings.dp(radii[3]),
        }]))
    };
    let solid = fill.map(|rgba| json!([{ "android:color": color(resources, &rgba) }]));
    let uniform = [border.right, border.bottom, border.left].iter().all(|w| *w == border.top)
        && [Edge::Right, Edge::Bottom, Edge::Left]
            .iter()
            .all(|&edge| border_color(node, edge) == border_color(node, Edge::Top));

    let mut layers: Vec<Value> = Vec::new();
    if uniform {
        let stroke = (border.top > 0.0).then(|| {
            let dashed = node.css("border-top-style") == "dashed";
            json!([{
                "android:width": settings.dp(border.top),
                "android:color": color(resources, &border_color(node, Edge::Top)),
                "android:dashWidth": dashed.then(|| settings.dp(border.top * 3.0)),
                "android:dashGap": dashed.then(|| settings.dp(border.top)),
            }])
        });
        let shape = json!({
            "android:shape": "rectangle",
            "solid": solid,
            "stroke": stroke,
            "corners": corners,
        });
        if image.is_none() {
            let mut shape = shape;
            shape["xmlns:android"] = json!(namespace);
            return apply_template("shape", &DRAWABLE, &[shape], 0, settings.indent);
        }
        layers.push(json!({ "markup": apply_template("shape", &DRAWABLE, &[shape], 0, settings.indent)? }));
    } else {
        // Outer layer paints the border colour, the inset layer the fill.
        let outer = json!({
            "android:shape": "rectangle",
            "solid": [{ "android:color": color(resources, &border_color(node, Edge::Top)) }],
            "corners": corners,
        });
        layers.push(json!({ "markup": apply_template("shape", &DRAWABLE, &[outer], 0, settings.indent)? }));
        let inner = json!({ "android:shape": "rectangle", "solid": solid, "corners": corners });
        layers.push(json!({
            "android:left": settings.dp(border.left),
            "android:top": settings.dp(border.top),
            "android:right": settings.dp(border.right),
            "android:bottom": settings.dp(border.bottom),
            "markup": apply_template("shape", &DRAWABLE, &[inner], 0, settings.indent)?,
        }));
    }
    if let Some(uri) = image {
        let tile = matches!(node.css("background-repeat"), "" | "repeat");
        layers.push(json!({
            "bitmap": [{
                "android:src": format!("@drawable/{}", resources.add_image(uri)),
                "android:gravity": if tile { Value::Null } else { json!("top|start") },
                "android:tileMode": if tile { json!("repeat") } else { Value::Null },
            }]
        }));
    }
    let list = json!({ "xmlns:android": namespace, "item": layers });
    apply_template("layer-list", &DRAWABLE, &[list], 0, settings.indent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_family_generic_mapping() {
        assert_eq!(font_family("\"Times New Roman\", serif"), Some("serif"));
        assert_eq!(font_family("Menlo, monospace"), Some("monospace"));
        assert_eq!(font_family("Helvetica, Arial, sans-serif"), None);
    }

    #[test]
    fn test_first_url() {
        assert_eq!(first_url("url(\"img/a.png\"), url(b.png)"), Some("img/a.png"));
        assert_eq!(first_url("none"), None);
        assert_eq!(first_url("url()"), None);
    }
}
