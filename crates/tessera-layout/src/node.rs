//! Shadow tree nodes.
//!
//! Each [`Node`] mirrors one source element or text run, or is a synthetic
//! construct (wrapper, group, text fragment, list marker) created by an
//! extension. Measured geometry is private and only readable; corrections go
//! through the adjustment table on [`crate::NodeTree`].

use indexmap::IndexMap;
use strum_macros::{Display, EnumString};
use tessera_common::units::{LengthContext, parse_length, parse_length_or_percent, parse_percent};
use tessera_dom::{AttributesMap, ImageSize, StyleMap};

use crate::box_model::{BoxAdjustment, BoxModel, Rect};
use crate::controller::RenderTemplate;
use crate::data::DataTable;
use crate::layout_unit::{Alignment, ContainerType};

/// Index of a node in a [`crate::NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The synthetic document node that hosts the root view.
    pub const DOCUMENT: NodeId = NodeId(0);
}

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic `#document` node.
    Document,
    /// A source element.
    Element,
    /// A source text run.
    Text,
    /// A node created during layout.
    Synthetic(SyntheticKind),
}

/// Kinds of nodes created during layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SyntheticKind {
    /// Container around one node that takes over its outer box.
    Wrapper,
    /// Container around several sibling nodes.
    Group,
    /// Piece of a split text run.
    Fragment,
    /// List bullet or ordinal.
    Marker,
    /// Empty view used for spacing.
    Spacer,
    /// Image layer for a background.
    Layer,
}

/// The CSS `position` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PositionType {
    /// Normal flow.
    #[default]
    Static,
    /// Normal flow, offset visually.
    Relative,
    /// Out of flow, positioned against the containing block.
    Absolute,
    /// Out of flow, positioned against the viewport.
    Fixed,
    /// Normal flow until scrolled.
    Sticky,
}

impl PositionType {
    /// Whether the node is taken out of normal flow.
    #[must_use]
    pub fn is_out_of_flow(self) -> bool {
        matches!(self, PositionType::Absolute | PositionType::Fixed)
    }
}

/// The CSS `float` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Float {
    /// Not floating.
    #[default]
    None,
    /// `float: left`
    Left,
    /// `float: right`
    Right,
}

/// State bits for a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// Mirrors a source element or text run.
    pub natural: bool,
    /// Participates in normal flow.
    pub page_flow: bool,
    /// Displayed (not `display: none`, not `visibility: hidden`).
    pub visible: bool,
    /// Skipped by rendering but kept for geometry queries.
    pub render_exclude: bool,
    /// Removed from layout entirely.
    pub excluded: bool,
    /// A template has been emitted.
    pub rendered: bool,
    /// Inline-level box.
    pub inline: bool,
    /// Block-level box.
    pub block: bool,
    /// Text wraps over more than one line.
    pub multiline: bool,
    /// Rendered into its own layout file.
    pub include: bool,
}

/// Output attributes keyed by `namespace:name`, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(IndexMap<String, String>);

impl Attributes {
    fn key(namespace: &str, name: &str) -> String {
        if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}:{name}")
        }
    }

    /// Sets an attribute, keeping its original position when replaced.
    pub fn set(&mut self, namespace: &str, name: &str, value: impl Into<String>) {
        let _ = self.0.insert(Self::key(namespace, name), value.into());
    }

    /// Sets an attribute only if it is not already present.
    pub fn set_if_absent(&mut self, namespace: &str, name: &str, value: impl Into<String>) {
        let _ = self.0
            .entry(Self::key(namespace, name))
            .or_insert_with(|| value.into());
    }

    /// Reads an attribute.
    pub fn get(&self, namespace: &str, name: &str) -> Option<&str> {
        self.0.get(&Self::key(namespace, name)).map(String::as_str)
    }

    /// Removes an attribute, preserving the order of the rest.
    pub fn remove(&mut self, namespace: &str, name: &str) -> Option<String> {
        self.0.shift_remove(&Self::key(namespace, name))
    }

    /// Whether an attribute is present.
    pub fn contains(&self, namespace: &str, name: &str) -> bool {
        self.0.contains_key(&Self::key(namespace, name))
    }

    /// Iterates over `(qualified name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One node of the shadow tree.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    /// What the node stands for.
    pub kind: NodeKind,
    /// Lowercase tag name, `#text` for text runs and `#<kind>` for synthetic nodes.
    pub tag: String,
    /// Source element attributes.
    pub attrs: AttributesMap,
    /// Text of a text run or fragment.
    pub text: Option<String>,
    /// Natural size of an image.
    pub image: Option<ImageSize>,
    /// Rendered line count of a text run.
    pub lines: u32,
    pub(crate) style: StyleMap,
    pub(crate) declared: StyleMap,
    pub(crate) length_context: LengthContext,
    pub(crate) bounds: Rect,
    pub(crate) linear: Rect,
    pub(crate) box_model: BoxModel,
    pub(crate) box_adjustment: BoxAdjustment,
    pub(crate) box_register: [Option<NodeId>; 8],
    pub(crate) position: PositionType,
    pub(crate) float: Float,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) render_parent: Option<NodeId>,
    pub(crate) render_children: Vec<NodeId>,
    pub(crate) outer_wrapper: Option<NodeId>,
    pub(crate) inner_wrapped: Option<NodeId>,
    pub(crate) replaces: Vec<NodeId>,
    pub(crate) depth: usize,
    pub(crate) applied: Vec<&'static str>,
    pub(crate) document_id: Option<String>,
    /// State bits.
    pub flags: NodeFlags,
    /// Container type assigned when rendered.
    pub container_type: ContainerType,
    /// Alignment hints assigned when rendered.
    pub alignment: Alignment,
    /// Target control name assigned when rendered.
    pub control_name: String,
    /// Output attributes.
    pub attributes: Attributes,
    /// Emitted template.
    pub template: Option<RenderTemplate>,
    /// Extensions whose `process_child` runs for this node's children.
    pub render_extensions: Vec<&'static str>,
    /// Nodes whose leading line break and margin this node carries.
    pub siblings_leading: Vec<NodeId>,
    /// Nodes whose trailing line break and margin this node carries.
    pub siblings_trailing: Vec<NodeId>,
    /// A line break precedes this node.
    pub line_break_leading: bool,
    /// A line break follows this node.
    pub line_break_trailing: bool,
    /// Extension records.
    pub data: DataTable,
}

impl Node {
    pub(crate) fn blank(id: NodeId, kind: NodeKind, tag: impl Into<String>) -> Self {
        Node {
            id,
            kind,
            tag: tag.into(),
            attrs: AttributesMap::new(),
            text: None,
            image: None,
            lines: 0,
            style: StyleMap::new(),
            declared: StyleMap::new(),
            length_context: LengthContext::default(),
            bounds: Rect::default(),
            linear: Rect::default(),
            box_model: BoxModel::default(),
            box_adjustment: BoxAdjustment::default(),
            box_register: [None; 8],
            position: PositionType::Static,
            float: Float::None,
            parent: None,
            children: Vec::new(),
            render_parent: None,
            render_children: Vec::new(),
            outer_wrapper: None,
            inner_wrapped: None,
            replaces: Vec::new(),
            depth: 0,
            applied: Vec::new(),
            document_id: None,
            flags: NodeFlags {
                visible: true,
                page_flow: true,
                ..NodeFlags::default()
            },
            container_type: ContainerType::Unknown,
            alignment: Alignment::NONE,
            control_name: String::new(),
            attributes: Attributes::default(),
            template: None,
            render_extensions: Vec::new(),
            siblings_leading: Vec::new(),
            siblings_trailing: Vec::new(),
            line_break_leading: false,
            line_break_trailing: false,
            data: DataTable::default(),
        }
    }

    /// This node's index.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Computed value of a CSS property, or `""`.
    #[must_use]
    pub fn css(&self, property: &str) -> &str {
        self.style.value(property)
    }

    /// Author-declared value of a CSS property, falling back to the computed one.
    #[must_use]
    pub fn css_initial(&self, property: &str) -> &str {
        self.declared
            .get(property)
            .unwrap_or_else(|| self.style.value(property))
    }

    /// Overrides a computed property on this node only.
    pub fn set_css(&mut self, property: &str, value: impl Into<String>) {
        self.style.set(property, value);
    }

    /// A computed length in pixels, `None` for keywords and percentages.
    #[must_use]
    pub fn css_length(&self, property: &str) -> Option<f32> {
        parse_length(self.css(property), &self.length_context)
    }

    /// A declared length or percentage of `basis`, in pixels.
    #[must_use]
    pub fn css_length_or_percent(&self, property: &str, basis: f32) -> Option<f32> {
        parse_length_or_percent(self.css_initial(property), basis, &self.length_context)
    }

    /// Context for resolving relative lengths on this node.
    #[must_use]
    pub fn length_context(&self) -> &LengthContext {
        &self.length_context
    }

    /// Font size in pixels.
    #[must_use]
    pub fn font_size(&self) -> f32 {
        self.length_context.font_size
    }

    /// Attribute of the source element.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// `type` attribute of an `<input>`, lowercased, `text` by default.
    #[must_use]
    pub fn input_type(&self) -> String {
        self.attr("type")
            .map_or_else(|| "text".to_string(), str::to_ascii_lowercase)
    }

    /// Whether the node is a source element.
    #[must_use]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Whether the node carries text directly (text run or fragment).
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Text | NodeKind::Synthetic(SyntheticKind::Fragment)
        )
    }

    /// Whether the node was created during layout.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        matches!(self.kind, NodeKind::Synthetic(_))
    }

    /// Whether the node is a text run containing only whitespace.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        self.is_text() && self.text.as_deref().is_none_or(|t| t.trim().is_empty())
    }

    /// Measured border box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Border box extended by the margins.
    #[must_use]
    pub fn linear(&self) -> Rect {
        self.linear
    }

    /// CSS margin, border and padding.
    #[must_use]
    pub fn box_model(&self) -> &BoxModel {
        &self.box_model
    }

    /// Content box.
    #[must_use]
    pub fn content_box(&self) -> Rect {
        self.box_model.content_box(self.bounds)
    }

    /// Late corrections.
    #[must_use]
    pub fn box_adjustment(&self) -> &BoxAdjustment {
        &self.box_adjustment
    }

    /// `position` value.
    #[must_use]
    pub fn position(&self) -> PositionType {
        self.position
    }

    /// `float` value.
    #[must_use]
    pub fn float(&self) -> Float {
        self.float
    }

    /// Whether the node floats.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.float != Float::None
    }

    /// `display` value, `inline` for text.
    #[must_use]
    pub fn display(&self) -> &str {
        if self.is_text() {
            return "inline";
        }
        match self.css("display") {
            "" => "block",
            display => display,
        }
    }

    /// Whether any of the four offsets is set.
    #[must_use]
    pub fn has_offset(&self, side: &str) -> bool {
        let value = self.css(side);
        !value.is_empty() && value != "auto"
    }

    /// Declared width as a length or percentage.
    #[must_use]
    pub fn has_width(&self) -> bool {
        let value = self.css_initial("width");
        !value.is_empty() && value != "auto"
    }

    /// Declared height as a length or percentage.
    #[must_use]
    pub fn has_height(&self) -> bool {
        let value = self.css_initial("height");
        !value.is_empty() && value != "auto"
    }

    /// Declared width as a fraction of the container.
    #[must_use]
    pub fn percent_width(&self) -> Option<f32> {
        parse_percent(self.css_initial("width"))
    }

    /// Declared height as a fraction of the container.
    #[must_use]
    pub fn percent_height(&self) -> Option<f32> {
        parse_percent(self.css_initial("height"))
    }

    /// Generated document id, once assigned by the controller.
    #[must_use]
    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    /// Nodes this synthetic node stands in for.
    #[must_use]
    pub fn replaces(&self) -> &[NodeId] {
        &self.replaces
    }

    /// Nesting depth below the document node.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether `extension` has already processed this node.
    #[must_use]
    pub fn is_applied(&self, extension: &str) -> bool {
        self.applied.contains(&extension)
    }

    /// Whether the node paints anything on its own.
    #[must_use]
    pub fn has_visual(&self) -> bool {
        let border = self.box_model.border;
        let background = self.css("background-color");
        border.horizontal() + border.vertical() > 0.0
            || self.css("background-image").contains("url(")
            || self.css("background-image").contains("gradient(")
            || !(background.is_empty()
                || background == "transparent"
                || background == "rgba(0, 0, 0, 0)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_keep_order() {
        let mut attrs = Attributes::default();
        attrs.set("android", "id", "@+id/a");
        attrs.set("android", "layout_width", "match_parent");
        attrs.set("app", "layout_constraintTop_toTopOf", "parent");
        attrs.set("android", "id", "@+id/b");
        attrs.set_if_absent("android", "layout_width", "wrap_content");
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["android:id", "android:layout_width", "app:layout_constraintTop_toTopOf"]
        );
        assert_eq!(attrs.get("android", "id"), Some("@+id/b"));
        assert_eq!(attrs.get("android", "layout_width"), Some("match_parent"));
    }

    #[test]
    fn test_position_parse() {
        assert_eq!("ABSOLUTE".parse::<PositionType>().unwrap(), PositionType::Absolute);
        assert!(PositionType::Fixed.is_out_of_flow());
        assert!(!PositionType::Relative.is_out_of_flow());
    }
}
