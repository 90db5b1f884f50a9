//! The Android controller.
//!
//! `render_node` picks the control, assigns the id and writes sizes and
//! widget attributes. The post passes then anchor children, emit box spacing
//! and collect resources over the whole render tree; `finalize` hands the
//! result to the writer.

mod constraints;
mod resources;
mod spacing;

use log::trace;
use tessera_common::units::{format_decimal, parse_number};
use tessera_layout::{
    Alignment, ContainerType, Controller, DataKey, InsertionTable, LayoutUnit, NodeId, NodeTree,
    OutputFile, RenderTemplate, ResourceStore, TemplateKind,
};

use crate::constants::{
    ANDROID, IMAGE_BUTTON, MATCH_PARENT, WRAP_CONTENT, control_name, input_type, scale_type,
};
use crate::extensions::css_grid;
use crate::settings::AndroidSettings;
use crate::writer;

/// Set on containers whose children are spaced by an extension; the
/// controller then leaves their margins alone when anchoring.
pub const EXPLICIT_SPACING: DataKey<bool> = DataKey::new("controller", "explicit_spacing");

/// Accumulated `(x, y)` translation in pixels.
pub const TRANSLATION: DataKey<(f32, f32)> = DataKey::new("controller", "translation");

/// Adds a visual offset that does not affect layout.
pub fn add_translation(tree: &mut NodeTree, node: NodeId, dx: f32, dy: f32) {
    let data = &mut tree[node].data;
    match data.get_mut(TRANSLATION) {
        Some((x, y)) => {
            *x += dx;
            *y += dy;
        }
        None => data.set(TRANSLATION, (dx, dy)),
    }
}

/// Marks `node` as spaced by an extension.
pub fn set_explicit_spacing(tree: &mut NodeTree, node: NodeId) {
    tree[node].data.set(EXPLICIT_SPACING, true);
}

/// Whether an extension spaces the children of `node`.
#[must_use]
pub fn has_explicit_spacing(tree: &NodeTree, node: NodeId) -> bool {
    tree[node].data.get(EXPLICIT_SPACING).copied().unwrap_or(false)
}

/// Renders layout units as Android views.
#[derive(Debug, Default)]
pub struct AndroidController {
    settings: AndroidSettings,
    insertions: InsertionTable,
}

impl AndroidController {
    /// Creates a controller for `settings`.
    #[must_use]
    pub fn new(settings: AndroidSettings) -> Self {
        Self {
            settings,
            insertions: InsertionTable::default(),
        }
    }

    /// Target settings.
    #[must_use]
    pub fn settings(&self) -> &AndroidSettings {
        &self.settings
    }

    fn layout_size(&self, tree: &NodeTree, unit: &LayoutUnit, horizontal: bool) -> String {
        if unit.parent == tree.document() {
            return MATCH_PARENT.to_string();
        }
        let node = &tree[unit.node];
        let bounds = node.bounds();
        let measured = if horizontal { bounds.width } else { bounds.height };
        let percent = if horizontal {
            node.percent_width()
        } else {
            node.percent_height()
        };
        if percent.is_some_and(|p| p >= 1.0) {
            return MATCH_PARENT.to_string();
        }
        let declared = if horizontal { node.has_width() } else { node.has_height() };
        if declared || (horizontal && css_grid::is_justified(tree, unit.node)) {
            return self.settings.dp(measured);
        }

        let parent = &tree[unit.parent];
        let in_row = matches!(
            parent.container_type,
            ContainerType::Linear | ContainerType::RadioGroup
        ) && parent.alignment.contains(Alignment::HORIZONTAL);
        let replaced = matches!(unit.container_type, ContainerType::Image | ContainerType::Web);
        if horizontal
            && node.flags.block
            && node.flags.page_flow
            && !node.is_floating()
            && !in_row
            && parent.container_type != ContainerType::Grid
            && !replaced
        {
            return MATCH_PARENT.to_string();
        }
        let intrinsic = replaced
            || (unit.children.is_empty()
                && matches!(
                    unit.container_type,
                    ContainerType::Frame | ContainerType::Space | ContainerType::Line
                ));
        if intrinsic && measured > 0.0 {
            self.settings.dp(measured)
        } else {
            WRAP_CONTENT.to_string()
        }
    }

    fn widget_attributes(tree: &mut NodeTree, unit: &LayoutUnit) {
        let id = unit.node;
        let text = display_text(tree, id);
        let node = &tree[id];
        let attr = |name: &str| node.attr(name).filter(|v| !v.is_empty()).map(str::to_string);
        let mut set: Vec<(&'static str, String)> = Vec::new();
        match unit.container_type {
            ContainerType::Linear | ContainerType::RadioGroup => {
                let orientation = if unit.alignment.contains(Alignment::VERTICAL) {
                    "vertical"
                } else {
                    "horizontal"
                };
                if !node.attributes.contains(ANDROID, "orientation") {
                    set.push(("orientation", orientation.to_string()));
                }
                if orientation == "horizontal" && !unit.alignment.contains(Alignment::BASELINE) {
                    set.push(("baselineAligned", "false".to_string()));
                }
            }
            ContainerType::Grid => {
                if let Some(columns) = unit.column_count.filter(|c| *c > 0) {
                    set.push(("columnCount", columns.to_string()));
                }
                if let Some(rows) = unit.row_count.filter(|r| *r > 0) {
                    set.push(("rowCount", rows.to_string()));
                }
            }
            ContainerType::Text if !text.is_empty() => set.push(("text", text)),
            ContainerType::Button => {
                let label = attr("value").map_or(text, |v| escape_reference(&v));
                if !label.is_empty() {
                    set.push(("text", label));
                }
            }
            ContainerType::Edit => {
                let textarea = node.tag == "textarea";
                let kind = if textarea { "textarea".to_string() } else { node.input_type() };
                set.push(("inputType", input_type(&kind).to_string()));
                if let Some(placeholder) = attr("placeholder") {
                    set.push(("hint", escape_reference(&placeholder)));
                }
                let value = if textarea {
                    Some(text).filter(|t| !t.is_empty())
                } else {
                    attr("value").map(|v| escape_reference(&v))
                };
                if let Some(value) = value {
                    set.push(("text", value));
                }
                if let Some(rows) = attr("rows") {
                    set.push(("minLines", format_decimal(parse_number(&rows), 0)));
                }
            }
            ContainerType::Checkbox | ContainerType::Radio => {
                if node.attrs.contains_key("checked") {
                    set.push(("checked", "true".to_string()));
                }
            }
            ContainerType::Range => {
                let number = |name: &str, default: f32| attr(name).map_or(default, |v| parse_number(&v));
                let (min, max) = (number("min", 0.0), number("max", 100.0));
                let value = number("value", (min + max) / 2.0);
                set.push(("max", format_decimal(max - min, 0)));
                set.push(("progress", format_decimal(value - min, 0)));
            }
            ContainerType::Image if !node.attributes.contains(ANDROID, "scaleType") => {
                set.push(("scaleType", scale_type(node.css("object-fit")).to_string()));
            }
            _ => {}
        }
        if !node.flags.visible {
            set.push(("visibility", "invisible".to_string()));
        }
        let opacity = node.css("opacity");
        if !opacity.is_empty() {
            let alpha = parse_number(opacity).clamp(0.0, 1.0);
            if alpha < 1.0 {
                set.push(("alpha", format_decimal(alpha, 2)));
            }
        }
        let attributes = &mut tree[id].attributes;
        for (name, value) in set {
            attributes.set(ANDROID, name, value);
        }
    }
}

/// A literal beginning with `@` or `?` would be read as a reference.
fn escape_reference(text: &str) -> String {
    if text.starts_with(['@', '?']) {
        format!("\\{text}")
    } else {
        text.to_string()
    }
}

/// Text shown by a text-bearing node, whitespace-collapsed unless
/// `white-space` preserves it.
fn display_text(tree: &NodeTree, id: NodeId) -> String {
    let node = &tree[id];
    let raw = if node.is_text() {
        node.text.clone().unwrap_or_default()
    } else {
        tree.text_content(id)
    };
    let text = if matches!(node.css("white-space"), "pre" | "pre-wrap" | "break-spaces") {
        raw
    } else {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if node.is_synthetic() && raw.ends_with(char::is_whitespace) && !collapsed.is_empty() {
            format!("{collapsed} ")
        } else {
            collapsed
        }
    };
    escape_reference(&text)
}

impl Controller for AndroidController {
    fn render_node(&mut self, tree: &mut NodeTree, unit: &LayoutUnit) -> RenderTemplate {
        let id = unit.node;
        let control = if unit.container_type == ContainerType::Button
            && tree[id].tag == "input"
            && tree[id].input_type() == "image"
        {
            IMAGE_BUTTON
        } else {
            control_name(unit.container_type)
        };
        let document_id = tree.assign_document_id(id, control);
        let width = self.layout_size(tree, unit, true);
        let height = self.layout_size(tree, unit, false);
        {
            let attributes = &mut tree[id].attributes;
            attributes.set(ANDROID, "id", format!("@+id/{document_id}"));
            attributes.set_if_absent(ANDROID, "layout_width", width);
            attributes.set_if_absent(ANDROID, "layout_height", height);
        }
        Self::widget_attributes(tree, unit);

        let kind = if tree[id].flags.include && unit.parent != tree.document() {
            TemplateKind::Include
        } else {
            TemplateKind::Xml
        };
        trace!("{control} @+id/{document_id} for {id:?}");
        RenderTemplate {
            kind,
            node: id,
            parent: unit.parent,
            control_name: control.to_string(),
        }
    }

    fn insertions(&self) -> &InsertionTable {
        &self.insertions
    }

    fn insertions_mut(&mut self) -> &mut InsertionTable {
        &mut self.insertions
    }

    fn post_constraints(&mut self, tree: &mut NodeTree, _resources: &mut ResourceStore) {
        constraints::apply(tree, &self.settings);
    }

    fn post_box_spacing(&mut self, tree: &mut NodeTree, resources: &mut ResourceStore) {
        spacing::apply(tree, &self.settings, resources);
    }

    fn post_resources(&mut self, tree: &mut NodeTree, resources: &mut ResourceStore) {
        resources::apply(tree, &self.settings, resources);
    }

    fn finalize(&mut self, tree: &NodeTree, resources: &ResourceStore) -> Vec<OutputFile> {
        writer::write_document(tree, &self.insertions, resources, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_escaping() {
        assert_eq!(escape_reference("@home"), "\\@home");
        assert_eq!(escape_reference("?why"), "\\?why");
        assert_eq!(escape_reference("plain @ text"), "plain @ text");
    }
}
