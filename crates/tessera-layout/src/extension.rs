//! Pluggable per-feature translators.
//!
//! Each [`Extension`] owns one CSS concern. During base layout the registry
//! is searched in registration order and the first extension whose `is` and
//! `condition` both hold takes the node; everything else falls through to
//! default classification. Extensions that need to revisit a node once the
//! whole tree is rendered subscribe it for the post phases.

use indexmap::IndexSet;

use crate::controller::Controller;
use crate::layout_unit::LayoutUnit;
use crate::node::NodeId;
use crate::node_tree::NodeTree;
use crate::resource::ResourceStore;
use crate::text::TextMeasurer;

/// Everything an extension may touch during a call.
pub struct LayoutContext<'a, C: Controller> {
    /// The shadow tree.
    pub tree: &'a mut NodeTree,
    /// The target controller.
    pub controller: &'a mut C,
    /// Resource side-table.
    pub resources: &'a mut ResourceStore,
    /// Text measurement.
    pub measurer: &'a dyn TextMeasurer,
    subscribed: Vec<NodeId>,
}

impl<'a, C: Controller> LayoutContext<'a, C> {
    /// Bundles the pipeline state for one extension call.
    pub fn new(
        tree: &'a mut NodeTree,
        controller: &'a mut C,
        resources: &'a mut ResourceStore,
        measurer: &'a dyn TextMeasurer,
    ) -> Self {
        Self {
            tree,
            controller,
            resources,
            measurer,
            subscribed: Vec::new(),
        }
    }

    /// Requests post-phase callbacks for `node` from the calling extension.
    pub fn subscribe(&mut self, node: NodeId) {
        self.subscribed.push(node);
    }

    pub(crate) fn into_subscriptions(self) -> Vec<NodeId> {
        self.subscribed
    }
}

/// What an extension decided about a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionResult {
    /// Render the node with this descriptor.
    pub output: Option<LayoutUnit>,
    /// Descriptor for the `render_as` node.
    pub output_as: Option<LayoutUnit>,
    /// Render under this parent instead.
    pub parent: Option<NodeId>,
    /// Render this node (normally a new wrapper) in place of the current
    /// one; the current node is then laid out inside it.
    pub render_as: Option<NodeId>,
    /// Lay these nodes out in place of the current one.
    pub replace_with: Vec<NodeId>,
    /// Emit the node into its own layout file.
    pub include: bool,
    /// Nothing further to do for this node.
    pub complete: bool,
    /// Continue with default classification.
    pub next: bool,
    /// Request post-phase callbacks for the node.
    pub subscribe: bool,
}

impl ExtensionResult {
    /// Render the node with `unit`.
    #[must_use]
    pub fn output(unit: LayoutUnit) -> Self {
        Self {
            output: Some(unit),
            complete: true,
            ..Self::default()
        }
    }

    /// Render `wrapper` in place of the node, optionally with `unit`.
    #[must_use]
    pub fn render_as(wrapper: NodeId, unit: Option<LayoutUnit>) -> Self {
        Self {
            render_as: Some(wrapper),
            output_as: unit,
            ..Self::default()
        }
    }

    /// Replace the node with `nodes`.
    #[must_use]
    pub fn replace_with(nodes: Vec<NodeId>) -> Self {
        Self {
            replace_with: nodes,
            complete: true,
            ..Self::default()
        }
    }

    /// Continue with default classification.
    #[must_use]
    pub fn next() -> Self {
        Self {
            next: true,
            ..Self::default()
        }
    }

    /// Drop the node from the output.
    #[must_use]
    pub fn remove() -> Self {
        Self {
            complete: true,
            ..Self::default()
        }
    }

    /// Also request post-phase callbacks.
    #[must_use]
    pub fn subscribed(mut self) -> Self {
        self.subscribe = true;
        self
    }

    /// Render under `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// A per-feature translator.
///
/// Only `name` and `is` are required. Hooks default to "not interested".
pub trait Extension<C: Controller> {
    /// Stable name, used for data keys and `render_extensions`.
    fn name(&self) -> &'static str;

    /// Cheap structural eligibility.
    fn is(&self, tree: &NodeTree, node: NodeId) -> bool;

    /// Contextual eligibility. May store records on the node for later hooks.
    fn condition(&mut self, _ctx: &mut LayoutContext<'_, C>, _node: NodeId, _parent: NodeId) -> bool {
        true
    }

    /// Transforms a claimed node. `None` falls back to default handling.
    fn process_node(
        &mut self,
        _ctx: &mut LayoutContext<'_, C>,
        _node: NodeId,
        _parent: NodeId,
    ) -> Option<ExtensionResult> {
        None
    }

    /// Handles a child of a node that listed this extension in its
    /// `render_extensions`.
    fn process_child(
        &mut self,
        _ctx: &mut LayoutContext<'_, C>,
        _node: NodeId,
        _parent: NodeId,
    ) -> Option<ExtensionResult> {
        None
    }

    /// After every node has been rendered once.
    fn post_base_layout(&mut self, _ctx: &mut LayoutContext<'_, C>, _node: NodeId) {}

    /// After the controller has emitted anchors.
    fn post_constraints(&mut self, _ctx: &mut LayoutContext<'_, C>, _node: NodeId) {}

    /// Structural cleanup.
    fn post_optimize(&mut self, _ctx: &mut LayoutContext<'_, C>, _node: NodeId) {}

    /// Before the controller emits margins and padding.
    fn post_box_spacing(&mut self, _ctx: &mut LayoutContext<'_, C>, _node: NodeId) {}

    /// After the controller has collected resources.
    fn post_resources(&mut self, _ctx: &mut LayoutContext<'_, C>, _node: NodeId) {}
}

pub(crate) struct RegistryEntry<C: Controller> {
    pub(crate) extension: Box<dyn Extension<C>>,
    pub(crate) subscribers: IndexSet<NodeId>,
    pub(crate) enabled: bool,
}

/// Extensions in priority order with their subscriber sets.
pub struct ExtensionRegistry<C: Controller> {
    pub(crate) entries: Vec<RegistryEntry<C>>,
}

impl<C: Controller> Default for ExtensionRegistry<C> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<C: Controller> ExtensionRegistry<C> {
    /// Appends an extension at the lowest priority. A second extension with
    /// the same name replaces the first in place.
    pub fn register(&mut self, extension: Box<dyn Extension<C>>) {
        let entry = RegistryEntry {
            extension,
            subscribers: IndexSet::new(),
            enabled: true,
        };
        let name = entry.extension.name();
        match self.entries.iter().position(|e| e.extension.name() == name) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Enables or disables an extension by name. Returns whether it exists.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.extension.name() == name) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Extension names in priority order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.extension.name()).collect()
    }

    /// Nodes subscribed to `name`.
    #[must_use]
    pub fn subscribers(&self, name: &str) -> Vec<NodeId> {
        self.entries
            .iter()
            .find(|e| e.extension.name() == name)
            .map(|e| e.subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.extension.name() == name)
    }

    pub(crate) fn clear_subscribers(&mut self) {
        for entry in &mut self.entries {
            entry.subscribers.clear();
        }
    }

    /// Number of registered extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no extensions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
