//! The seam between the pipeline and a target platform.
//!
//! A [`Controller`] turns classified [`LayoutUnit`]s into render templates,
//! performs the per-target post passes over the whole render tree, and hands
//! the finished document to its writer.

use indexmap::IndexMap;

use crate::layout_unit::LayoutUnit;
use crate::node::NodeId;
use crate::node_tree::NodeTree;
use crate::output::OutputFile;
use crate::resource::ResourceStore;

/// How a template is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// Inline markup.
    Xml,
    /// A reference to a separately written layout file.
    Include,
}

/// The controller's output for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTemplate {
    /// Emission kind.
    pub kind: TemplateKind,
    /// The rendered node.
    pub node: NodeId,
    /// Its render parent.
    pub parent: NodeId,
    /// Target control (tag) name.
    pub control_name: String,
}

/// Where a raw markup fragment goes relative to a node's own markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before the opening tag.
    BeforeOutside,
    /// After the opening tag, before the children.
    BeforeInside,
    /// After the children, before the closing tag.
    AfterInside,
    /// After the closing tag.
    AfterOutside,
}

/// Raw fragments attached to one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insertions {
    /// Before the opening tag.
    pub before_outside: Vec<String>,
    /// After the opening tag.
    pub before_inside: Vec<String>,
    /// Before the closing tag.
    pub after_inside: Vec<String>,
    /// After the closing tag.
    pub after_outside: Vec<String>,
}

/// Per-node raw markup, for output that is not itself a node (dividers, include tags).
#[derive(Debug, Clone, Default)]
pub struct InsertionTable(IndexMap<NodeId, Insertions>);

impl InsertionTable {
    /// Appends a fragment at `position` around `node`.
    pub fn add(&mut self, node: NodeId, position: InsertPosition, fragment: impl Into<String>) {
        let entry = self.0.entry(node).or_default();
        let list = match position {
            InsertPosition::BeforeOutside => &mut entry.before_outside,
            InsertPosition::BeforeInside => &mut entry.before_inside,
            InsertPosition::AfterInside => &mut entry.after_inside,
            InsertPosition::AfterOutside => &mut entry.after_outside,
        };
        list.push(fragment.into());
    }

    /// Fragments at `position` around `node`.
    #[must_use]
    pub fn fragments(&self, node: NodeId, position: InsertPosition) -> &[String] {
        let Some(entry) = self.0.get(&node) else {
            return &[];
        };
        match position {
            InsertPosition::BeforeOutside => &entry.before_outside,
            InsertPosition::BeforeInside => &entry.before_inside,
            InsertPosition::AfterInside => &entry.after_inside,
            InsertPosition::AfterOutside => &entry.after_outside,
        }
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Whether nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A target platform.
///
/// The post hooks run once per phase over the whole render tree, after the
/// extensions' own hooks for that phase (before them for resources).
pub trait Controller {
    /// Renders a classified node: picks the control name, assigns the
    /// document id and writes the structural attributes.
    fn render_node(&mut self, tree: &mut NodeTree, unit: &LayoutUnit) -> RenderTemplate;

    /// Raw markup attached around nodes.
    fn insertions(&self) -> &InsertionTable;

    /// Mutable access to the raw markup table.
    fn insertions_mut(&mut self) -> &mut InsertionTable;

    /// After every node has been rendered once.
    fn post_base_layout(&mut self, _tree: &mut NodeTree, _resources: &mut ResourceStore) {}

    /// Positional anchors.
    fn post_constraints(&mut self, _tree: &mut NodeTree, _resources: &mut ResourceStore) {}

    /// Structural cleanup.
    fn post_optimize(&mut self, _tree: &mut NodeTree, _resources: &mut ResourceStore) {}

    /// Margins and padding from the adjusted box values.
    fn post_box_spacing(&mut self, _tree: &mut NodeTree, _resources: &mut ResourceStore) {}

    /// Strings, colors, dimensions and styles.
    fn post_resources(&mut self, _tree: &mut NodeTree, _resources: &mut ResourceStore) {}

    /// Serialises the finished document.
    fn finalize(&mut self, tree: &NodeTree, resources: &ResourceStore) -> Vec<OutputFile>;

    /// Clears per-document state before a new document is processed.
    fn reset(&mut self) {
        self.insertions_mut().clear();
    }
}
