//! The layout pipeline.
//!
//! ```text
//! DomTree ──from_dom──▶ NodeTree ──base layout──▶ render tree
//!                                   (extensions, then default classification)
//!         ──post phases──▶ adjusted templates ──finalize──▶ OutputFile list
//! ```
//!
//! Phases are strictly ordered and each one completes over the whole tree
//! before the next begins. [`PhaseGate`] enforces the order.

use std::collections::VecDeque;

use indexmap::IndexSet;
use log::{debug, info, trace};
use strum_macros::Display;
use tessera_common::warning::clear_warnings;
use tessera_dom::{DomTree, Viewport};

use crate::classify::classify;
use crate::controller::Controller;
use crate::error::LayoutError;
use crate::extension::{Extension, ExtensionRegistry, ExtensionResult, LayoutContext};
use crate::layout_unit::LayoutUnit;
use crate::node::NodeId;
use crate::node_tree::NodeTree;
use crate::output::OutputFile;
use crate::resource::ResourceStore;
use crate::text::{ApproximateTextMeasurer, TextMeasurer};

/// Pipeline phases, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Nothing processed yet.
    #[default]
    Idle,
    /// The node tree has been built.
    CachePopulated,
    /// Nodes are being classified and rendered.
    BaseLayout,
    /// Corrections needing every node's initial render.
    PostBaseLayout,
    /// Anchors and positional constraints.
    PostConstraints,
    /// Structural cleanup.
    PostOptimize,
    /// Margins and padding.
    PostBoxSpacing,
    /// Resource collection.
    PostResources,
    /// Output produced.
    Finalized,
}

impl Phase {
    /// The post phases, in execution order.
    pub const POST: [Phase; 5] = [
        Phase::PostBaseLayout,
        Phase::PostConstraints,
        Phase::PostOptimize,
        Phase::PostBoxSpacing,
        Phase::PostResources,
    ];

    /// The phase that must follow this one.
    #[must_use]
    pub fn next(self) -> Option<Phase> {
        Some(match self {
            Phase::Idle => Phase::CachePopulated,
            Phase::CachePopulated => Phase::BaseLayout,
            Phase::BaseLayout => Phase::PostBaseLayout,
            Phase::PostBaseLayout => Phase::PostConstraints,
            Phase::PostConstraints => Phase::PostOptimize,
            Phase::PostOptimize => Phase::PostBoxSpacing,
            Phase::PostBoxSpacing => Phase::PostResources,
            Phase::PostResources => Phase::Finalized,
            Phase::Finalized => return None,
        })
    }
}

/// Barrier that only lets the pipeline advance one phase at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseGate {
    current: Phase,
}

impl PhaseGate {
    /// The phase most recently entered.
    #[must_use]
    pub fn current(&self) -> Phase {
        self.current
    }

    /// Enters `phase`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::PhaseOrder`] unless `phase` directly follows the
    /// current one.
    pub fn enter(&mut self, phase: Phase) -> Result<(), LayoutError> {
        let expected = self.current.next().unwrap_or(Phase::Idle);
        if phase != expected {
            return Err(LayoutError::PhaseOrder {
                expected,
                found: phase,
            });
        }
        trace!("entering phase {phase}");
        self.current = phase;
        Ok(())
    }

    /// Back to [`Phase::Idle`] for a new document.
    pub fn reset(&mut self) {
        self.current = Phase::Idle;
    }
}

#[derive(Debug, Clone, Copy)]
struct WorkItem {
    node: NodeId,
    parent: NodeId,
}

enum Outcome {
    Done,
    Continue(NodeId),
}

/// Drives a document through the pipeline for one target.
pub struct Application<C: Controller> {
    controller: C,
    registry: ExtensionRegistry<C>,
    resources: ResourceStore,
    measurer: Box<dyn TextMeasurer>,
    gate: PhaseGate,
}

impl<C: Controller> Application<C> {
    /// Creates a pipeline with no extensions and approximate text metrics.
    pub fn new(controller: C) -> Self {
        Self {
            controller,
            registry: ExtensionRegistry::default(),
            resources: ResourceStore::new(),
            measurer: Box::new(ApproximateTextMeasurer),
            gate: PhaseGate::default(),
        }
    }

    /// Replaces the text measurer.
    #[must_use]
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    /// Registers an extension at the lowest priority.
    pub fn register(&mut self, extension: impl Extension<C> + 'static) {
        self.registry.register(Box::new(extension));
    }

    /// The extension registry.
    pub fn registry(&self) -> &ExtensionRegistry<C> {
        &self.registry
    }

    /// Mutable extension registry.
    pub fn registry_mut(&mut self) -> &mut ExtensionRegistry<C> {
        &mut self.registry
    }

    /// The target controller.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Resources collected for the last document.
    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    /// The phase most recently entered.
    pub fn phase(&self) -> Phase {
        self.gate.current()
    }

    /// Lays out a document up to and including the resource phase.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnableToFinalize`] when the document has no body.
    pub fn parse_document(&mut self, dom: &DomTree, viewport: Viewport) -> Result<NodeTree, LayoutError> {
        self.gate.reset();
        self.registry.clear_subscribers();
        self.resources.clear();
        self.controller.reset();
        clear_warnings();

        let mut tree = NodeTree::from_dom(dom, viewport)?;
        self.gate.enter(Phase::CachePopulated)?;
        info!("laying out document with {} nodes", tree.len());

        self.gate.enter(Phase::BaseLayout)?;
        self.base_layout(&mut tree);

        for phase in Phase::POST {
            self.gate.enter(phase)?;
            self.post_phase(&mut tree, phase);
        }
        Ok(tree)
    }

    /// Serialises a laid-out document.
    ///
    /// # Errors
    ///
    /// [`LayoutError::PhaseOrder`] if the document has not been laid out,
    /// [`LayoutError::UnableToFinalize`] if nothing was rendered.
    pub fn finalize(&mut self, tree: &NodeTree) -> Result<Vec<OutputFile>, LayoutError> {
        self.gate.enter(Phase::Finalized)?;
        if tree.render_children(tree.document()).is_empty() {
            return Err(LayoutError::UnableToFinalize);
        }
        let files = self.controller.finalize(tree, &self.resources);
        info!("finalized document into {} files", files.len());
        Ok(files)
    }

    /// [`Self::parse_document`] followed by [`Self::finalize`].
    ///
    /// # Errors
    ///
    /// See both steps.
    pub fn run(&mut self, dom: &DomTree, viewport: Viewport) -> Result<(NodeTree, Vec<OutputFile>), LayoutError> {
        let tree = self.parse_document(dom, viewport)?;
        let files = self.finalize(&tree)?;
        Ok((tree, files))
    }

    /// Calls into one extension with a fresh context and records any
    /// subscriptions it made.
    fn call<R>(
        &mut self,
        tree: &mut NodeTree,
        index: usize,
        f: impl FnOnce(&mut dyn Extension<C>, &mut LayoutContext<'_, C>) -> R,
    ) -> R {
        let entry = &mut self.registry.entries[index];
        let mut ctx = LayoutContext::new(tree, &mut self.controller, &mut self.resources, &*self.measurer);
        let result = f(entry.extension.as_mut(), &mut ctx);
        entry.subscribers.extend(ctx.into_subscriptions());
        result
    }

    fn base_layout(&mut self, tree: &mut NodeTree) {
        let mut queue = VecDeque::from([WorkItem {
            node: tree.root(),
            parent: tree.document(),
        }]);
        while let Some(item) = queue.pop_front() {
            self.dispatch(tree, item, &mut queue);
        }
    }

    fn dispatch(&mut self, tree: &mut NodeTree, item: WorkItem, queue: &mut VecDeque<WorkItem>) {
        let node = item.node;
        let mut parent = item.parent;
        {
            let current = &tree[node];
            if current.flags.excluded || current.flags.render_exclude || current.flags.rendered {
                return;
            }
            // Regrouped since it was queued; it is queued again under its new parent.
            if tree.parent(node) != Some(item.parent) {
                trace!("skipping stale work item {node:?}");
                return;
            }
        }

        let hooks = tree[parent].render_extensions.clone();
        for name in hooks {
            let Some(index) = self.registry.position(name) else {
                continue;
            };
            if !self.registry.entries[index].enabled {
                continue;
            }
            let result = self.call(tree, index, |ext, ctx| ext.process_child(ctx, node, parent));
            if let Some(result) = result {
                trace!("{name} handled child {node:?}");
                match self.apply(tree, index, node, parent, result, queue) {
                    Outcome::Done => return,
                    Outcome::Continue(next_parent) => parent = next_parent,
                }
                break;
            }
        }

        for index in 0..self.registry.entries.len() {
            let entry = &self.registry.entries[index];
            let name = entry.extension.name();
            if !entry.enabled || tree[node].is_applied(name) || !entry.extension.is(tree, node) {
                continue;
            }
            if !self.call(tree, index, |ext, ctx| ext.condition(ctx, node, parent)) {
                continue;
            }
            tree.mark_applied(node, name);
            debug!("{name} claimed {node:?} <{}>", tree[node].tag);
            if let Some(result) = self.call(tree, index, |ext, ctx| ext.process_node(ctx, node, parent)) {
                match self.apply(tree, index, node, parent, result, queue) {
                    Outcome::Done => return,
                    Outcome::Continue(next_parent) => parent = next_parent,
                }
            }
            break;
        }

        let unit = classify(tree, node, parent);
        self.render(tree, &unit, queue);
    }

    fn apply(
        &mut self,
        tree: &mut NodeTree,
        index: usize,
        node: NodeId,
        parent: NodeId,
        result: ExtensionResult,
        queue: &mut VecDeque<WorkItem>,
    ) -> Outcome {
        let ExtensionResult {
            output,
            output_as,
            parent: parent_override,
            render_as,
            replace_with,
            include,
            complete,
            next,
            subscribe,
        } = result;
        if subscribe {
            let _ = self.registry.entries[index].subscribers.insert(node);
        }
        if include {
            tree[node].flags.include = true;
        }
        let parent = parent_override.unwrap_or(parent);

        if !replace_with.is_empty() {
            for &replacement in replace_with.iter().rev() {
                let natural = tree.parent(replacement).unwrap_or(parent);
                queue.push_front(WorkItem {
                    node: replacement,
                    parent: natural,
                });
            }
            if !replace_with.contains(&node) {
                tree.exclude(node);
            }
            return Outcome::Done;
        }
        if let Some(wrapper) = render_as {
            let mut unit = output_as.unwrap_or_else(|| classify(tree, wrapper, parent));
            unit.node = wrapper;
            unit.parent = parent;
            self.render(tree, &unit, queue);
            return Outcome::Done;
        }
        if let Some(unit) = output {
            self.render(tree, &unit, queue);
            return Outcome::Done;
        }
        if complete && !next {
            tree.exclude(node);
            return Outcome::Done;
        }
        Outcome::Continue(parent)
    }

    fn render(&mut self, tree: &mut NodeTree, unit: &LayoutUnit, queue: &mut VecDeque<WorkItem>) {
        let node = unit.node;
        let template = self.controller.render_node(tree, unit);
        tree.set_render_parent(node, unit.parent);
        {
            let rendered = &mut tree[node];
            rendered.flags.rendered = true;
            rendered.container_type = unit.container_type;
            rendered.alignment = unit.alignment;
            rendered.control_name.clone_from(&template.control_name);
            rendered.template = Some(template);
        }
        trace!(
            "rendered {node:?} as {} under {:?}",
            unit.container_type, unit.parent
        );
        if !unit.container_type.is_container() {
            return;
        }
        let mut pending: IndexSet<NodeId> = unit.children.iter().map(|&c| tree.outermost(c)).collect();
        pending.extend(tree.visible_children(node));
        for child in pending {
            queue.push_back(WorkItem { node: child, parent: node });
        }
    }

    fn post_phase(&mut self, tree: &mut NodeTree, phase: Phase) {
        if phase == Phase::PostResources {
            self.controller_phase(tree, phase);
            self.extension_phase(tree, phase);
        } else {
            self.extension_phase(tree, phase);
            self.controller_phase(tree, phase);
        }
    }

    fn extension_phase(&mut self, tree: &mut NodeTree, phase: Phase) {
        for index in 0..self.registry.entries.len() {
            if !self.registry.entries[index].enabled {
                continue;
            }
            let subscribers: Vec<NodeId> = self.registry.entries[index].subscribers.iter().copied().collect();
            for node in subscribers {
                if tree[node].flags.excluded {
                    continue;
                }
                self.call(tree, index, |ext, ctx| match phase {
                    Phase::PostBaseLayout => ext.post_base_layout(ctx, node),
                    Phase::PostConstraints => ext.post_constraints(ctx, node),
                    Phase::PostOptimize => ext.post_optimize(ctx, node),
                    Phase::PostBoxSpacing => ext.post_box_spacing(ctx, node),
                    Phase::PostResources => ext.post_resources(ctx, node),
                    _ => {}
                });
            }
        }
    }

    fn controller_phase(&mut self, tree: &mut NodeTree, phase: Phase) {
        let resources = &mut self.resources;
        match phase {
            Phase::PostBaseLayout => self.controller.post_base_layout(tree, resources),
            Phase::PostConstraints => self.controller.post_constraints(tree, resources),
            Phase::PostOptimize => self.controller.post_optimize(tree, resources),
            Phase::PostBoxSpacing => self.controller.post_box_spacing(tree, resources),
            Phase::PostResources => self.controller.post_resources(tree, resources),
            _ => {}
        }
    }
}
