//! Arena of layout nodes.
//!
//! The [`NodeTree`] is built once from a [`DomTree`] and then reshaped by the
//! pipeline: wrappers and groups are spliced into the natural tree, and the
//! render tree (what the controller emits) is recorded alongside it. Nodes
//! are never freed; removed nodes are flagged as excluded.

use std::collections::{HashMap, HashSet};
use std::ops::{Index, IndexMut};

use log::{debug, trace};
use tessera_common::units::{DEFAULT_FONT_SIZE, LengthContext, parse_length, parse_length_or_percent};
use tessera_dom::{DomTree, NodeId as DomId, NodeType, StyleMap, Viewport};

use crate::box_model::{BoxModel, BoxRegion, EdgeSizes, Rect, SetBox};
use crate::error::LayoutError;
use crate::node::{Float, Node, NodeId, NodeKind, PositionType, SyntheticKind};

/// Elements that never produce output.
const NON_RENDERED_TAGS: &[&str] = &[
    "head", "script", "style", "meta", "link", "title", "noscript", "template", "base",
];

/// Properties a wrapper takes over from the node it wraps.
const WRAPPER_PROPERTIES: &[&str] = &[
    "display",
    "position",
    "float",
    "clear",
    "top",
    "right",
    "bottom",
    "left",
    "z-index",
    "order",
    "flex-grow",
    "flex-shrink",
    "flex-basis",
    "align-self",
    "justify-self",
    "grid-row-start",
    "grid-row-end",
    "grid-column-start",
    "grid-column-end",
    "vertical-align",
];

/// Arena-based shadow tree.
#[derive(Debug)]
pub struct NodeTree {
    nodes: Vec<Node>,
    root: NodeId,
    viewport: Viewport,
    id_counters: HashMap<String, usize>,
    used_ids: HashSet<String>,
}

impl NodeTree {
    /// Builds the shadow tree from the `<body>` of `dom`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnableToFinalize`] when the document has no body or
    /// document element.
    pub fn from_dom(dom: &DomTree, viewport: Viewport) -> Result<Self, LayoutError> {
        let body = dom.body().ok_or(LayoutError::UnableToFinalize)?;
        let mut document = Node::blank(NodeId::DOCUMENT, NodeKind::Document, "#document");
        document.bounds = Rect::new(0.0, 0.0, viewport.width, viewport.height);
        document.linear = document.bounds;
        document.flags.rendered = true;
        let mut tree = NodeTree {
            nodes: vec![document],
            root: NodeId::DOCUMENT,
            viewport,
            id_counters: HashMap::new(),
            used_ids: HashSet::new(),
        };
        let root_font_size = dom
            .document_element()
            .and_then(|html| dom.as_element(html))
            .and_then(|html| parse_length(html.style.value("font-size"), &LengthContext::default()))
            .unwrap_or(DEFAULT_FONT_SIZE);
        let base_context = LengthContext {
            root_font_size,
            font_size: root_font_size,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
        };

        let mut pending = vec![(body, NodeId::DOCUMENT, base_context)];
        while let Some((dom_id, parent, context)) = pending.pop() {
            let Some(id) = tree.import(dom, dom_id, parent, &context) else {
                continue;
            };
            if parent == NodeId::DOCUMENT {
                tree.root = id;
            }
            let context = tree.nodes[id.0].length_context;
            pending.extend(
                dom.children(dom_id)
                    .iter()
                    .rev()
                    .map(|&child| (child, id, context)),
            );
        }
        if tree.root == NodeId::DOCUMENT {
            return Err(LayoutError::UnableToFinalize);
        }
        debug!("node tree populated with {} nodes", tree.nodes.len());
        Ok(tree)
    }

    /// Copies one DOM node into the arena and links it under `parent`.
    fn import(
        &mut self,
        dom: &DomTree,
        dom_id: DomId,
        parent: NodeId,
        context: &LengthContext,
    ) -> Option<NodeId> {
        let dom_node = dom.get(dom_id)?;
        let id = NodeId(self.nodes.len());
        let parent_width = self.nodes[parent.0].content_box().width;
        let node = match &dom_node.node_type {
            NodeType::Element(element) => {
                let mut node = Node::blank(id, NodeKind::Element, element.tag_name.clone());
                node.attrs = element.attrs.clone();
                node.style = element.style.clone();
                node.declared = element.declared.clone();
                node.image = element.image;
                node.length_context = LengthContext {
                    font_size: parse_length(element.style.value("font-size"), context)
                        .unwrap_or(context.font_size),
                    ..*context
                };
                node.bounds = element.bounds.into();
                node.box_model = resolve_box_model(&node, parent_width);
                node.linear = node.bounds.expanded_by(node.box_model.margin);
                node.position = node.css("position").parse().unwrap_or_default();
                node.float = if node.position.is_out_of_flow() {
                    Float::None
                } else {
                    node.css("float").parse().unwrap_or_default()
                };
                let display = node.css("display").to_string();
                node.flags.natural = true;
                node.flags.page_flow = !node.position.is_out_of_flow();
                node.flags.visible = display != "none" && node.css("visibility") != "hidden";
                node.flags.excluded =
                    display == "none" || NON_RENDERED_TAGS.contains(&node.tag.as_str());
                node.flags.render_exclude = node.tag == "br";
                node.flags.inline = display.starts_with("inline");
                node.flags.block = matches!(
                    display.as_str(),
                    "block" | "flex" | "grid" | "list-item" | "table" | "flow-root"
                );
                node.flags.include = node.attr("data-include").is_some();
                node.flags.multiline = dom.children(dom_id).iter().any(|&child| {
                    dom.as_text(child).is_some_and(|text| text.lines > 1)
                });
                node
            }
            NodeType::Text(text) => {
                let mut node = Node::blank(id, NodeKind::Text, "#text");
                node.text = Some(text.content.clone());
                node.lines = text.lines;
                node.style = self.nodes[parent.0].style.clone();
                node.length_context = *context;
                node.bounds = text.bounds.into();
                node.linear = node.bounds;
                node.flags.natural = true;
                node.flags.inline = true;
                node.flags.multiline = text.lines > 1;
                node.flags.excluded = text.content.trim().is_empty();
                node
            }
            NodeType::Comment(_) | NodeType::Document => return None,
        };
        self.nodes.push(node);
        self.append_child(parent, id);
        trace!("imported {} as {id:?} under {parent:?}", self.nodes[id.0].tag);
        Some(id)
    }

    /// The root view (the `<body>` element).
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The synthetic document node.
    #[must_use]
    pub fn document(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// Viewport the source was measured in.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Mutable node by id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes, including synthetic and excluded ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the document node exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    // ===== structure =====

    /// Natural parent.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Natural children, including excluded ones.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Natural children that take part in layout.
    #[must_use]
    pub fn visible_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| !self[child].flags.excluded)
            .collect()
    }

    /// Parent in the render tree.
    #[must_use]
    pub fn render_parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.render_parent)
    }

    /// Children in the render tree, in emission order.
    #[must_use]
    pub fn render_children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.render_children.as_slice())
    }

    /// Wrapper hosting this node, if any.
    #[must_use]
    pub fn outer_wrapper(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.outer_wrapper)
    }

    /// Outermost of a chain of wrappers, or the node itself.
    #[must_use]
    pub fn outermost(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(wrapper) = self.outer_wrapper(current) {
            current = wrapper;
        }
        current
    }

    /// Node wrapped by this wrapper, if any.
    #[must_use]
    pub fn inner_wrapped(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.inner_wrapped)
    }

    /// Innermost node of a chain of wrappers, or the node itself.
    #[must_use]
    pub fn innermost(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(inner) = self.inner_wrapped(current) {
            current = inner;
        }
        current
    }

    /// Position among the natural parent's children.
    #[must_use]
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Appends `child` to `parent`'s natural children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.update_depth(child);
    }

    /// Inserts `child` at `index` among `parent`'s natural children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.update_depth(child);
    }

    /// Removes `child` from its natural parent. The node stays allocated.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != child);
        }
    }

    /// Attaches `child` to `parent` in the render tree.
    pub fn set_render_parent(&mut self, child: NodeId, parent: NodeId) {
        if let Some(previous) = self.nodes[child.0].render_parent {
            self.nodes[previous.0].render_children.retain(|&c| c != child);
        }
        self.nodes[child.0].render_parent = Some(parent);
        if !self.nodes[parent.0].render_children.contains(&child) {
            self.nodes[parent.0].render_children.push(child);
        }
    }

    /// Removes the node from layout. It is kept for geometry queries.
    pub fn exclude(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        node.flags.excluded = true;
        node.flags.render_exclude = true;
        if let Some(parent) = node.render_parent.take() {
            self.nodes[parent.0].render_children.retain(|&c| c != id);
        }
    }

    /// Records that `extension` has processed `id`.
    pub fn mark_applied(&mut self, id: NodeId, extension: &'static str) {
        let applied = &mut self.nodes[id.0].applied;
        if !applied.contains(&extension) {
            applied.push(extension);
        }
    }

    /// Render tree in pre-order, starting below the document node.
    #[must_use]
    pub fn render_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self
            .render_children(NodeId::DOCUMENT)
            .iter()
            .rev()
            .copied()
            .collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.render_children(id).iter().rev());
        }
        order
    }

    /// Concatenated text of the node and its natural descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &self[current];
            if node.is_text() {
                out.push_str(node.text.as_deref().unwrap_or_default());
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    fn update_depth(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let depth = self.nodes[current.0]
                .parent
                .map_or(0, |p| self.nodes[p.0].depth + 1);
            self.nodes[current.0].depth = depth;
            stack.extend(self.nodes[current.0].children.iter().copied());
        }
    }

    // ===== box adjustments =====

    fn box_owner(&self, id: NodeId, region: BoxRegion) -> NodeId {
        let mut owner = id;
        for _ in 0..self.nodes.len() {
            match self.nodes[owner.0].box_register[region.index()] {
                Some(delegate) if delegate != owner => owner = delegate,
                _ => break,
            }
        }
        owner
    }

    /// Adds `value` to the adjustment of `region`.
    ///
    /// Unless `negative` is set, the emitted value is clamped so it never goes
    /// below zero.
    pub fn modify_box(&mut self, id: NodeId, region: BoxRegion, value: f32, negative: bool) {
        if value == 0.0 {
            return;
        }
        let owner = self.box_owner(id, region);
        let node = &mut self.nodes[owner.0];
        let index = region.index();
        let base = if node.box_adjustment.reset[index] {
            0.0
        } else {
            node.box_model.region(region)
        };
        let mut adjustment = node.box_adjustment.adjustment[index] + value;
        if !negative && base + adjustment < 0.0 {
            adjustment = -base;
        }
        node.box_adjustment.adjustment[index] = adjustment;
        trace!("modify_box {owner:?} {region} by {value} -> {adjustment}");
    }

    /// Overwrites the reset flag and/or adjustment of `region`.
    pub fn set_box(&mut self, id: NodeId, region: BoxRegion, update: SetBox) {
        let owner = self.box_owner(id, region);
        let adjustment = &mut self.nodes[owner.0].box_adjustment;
        if let Some(reset) = update.reset {
            adjustment.reset[region.index()] = reset;
        }
        if let Some(value) = update.adjustment {
            adjustment.adjustment[region.index()] = value;
        }
    }

    /// `(reset, adjustment)` of `region`.
    #[must_use]
    pub fn get_box(&self, id: NodeId, region: BoxRegion) -> (bool, f32) {
        let owner = self.box_owner(id, region);
        let adjustment = &self.nodes[owner.0].box_adjustment;
        (adjustment.is_reset(region), adjustment.adjustment(region))
    }

    /// Sends future reads and writes of `region` on `id` to `delegate`.
    pub fn register_box(&mut self, id: NodeId, region: BoxRegion, delegate: NodeId) {
        if id != delegate {
            self.nodes[id.0].box_register[region.index()] = Some(delegate);
        }
    }

    /// Value to emit for `region`: `(reset ? 0 : css) + adjustment`.
    #[must_use]
    pub fn box_value(&self, id: NodeId, region: BoxRegion) -> f32 {
        let node = &self.nodes[id.0];
        node.box_adjustment
            .resolve(region, node.box_model.region(region))
    }

    // ===== synthesis =====

    fn alloc(&mut self, kind: SyntheticKind, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::blank(id, NodeKind::Synthetic(kind), tag));
        id
    }

    /// Creates an unattached synthetic node.
    ///
    /// Text style and font context are copied from `style_from`.
    pub fn create_synthetic(
        &mut self,
        kind: SyntheticKind,
        bounds: Rect,
        style_from: Option<NodeId>,
    ) -> NodeId {
        let id = self.alloc(kind, &format!("#{kind}"));
        if let Some(source) = style_from {
            let style = self.nodes[source.0].style.clone();
            let context = self.nodes[source.0].length_context;
            let node = &mut self.nodes[id.0];
            node.style = style;
            node.length_context = context;
            node.replaces.push(source);
        }
        let node = &mut self.nodes[id.0];
        node.bounds = bounds;
        node.linear = bounds;
        id
    }

    /// Wraps `id` in a new container that takes over its position in the
    /// tree, its outer box and its margins.
    pub fn create_wrapper(&mut self, id: NodeId) -> NodeId {
        let wrapper = self.alloc(SyntheticKind::Wrapper, "#wrapper");
        let source = &self.nodes[id.0];
        let mut style = StyleMap::new();
        for &property in WRAPPER_PROPERTIES {
            if let Some(value) = source.style.get(property) {
                style.set(property, value);
            }
        }
        let mut declared = StyleMap::new();
        for property in ["width", "height"] {
            if let Some(value) = source.declared.get(property) {
                declared.set(property, value);
            }
        }
        let (bounds, linear, margin, position, float, flags, context, parent) = (
            source.bounds,
            source.linear,
            source.box_model.margin,
            source.position,
            source.float,
            source.flags,
            source.length_context,
            source.parent,
        );
        let mut margin_adjustment = [(false, 0.0); 4];
        for (slot, region) in margin_adjustment.iter_mut().zip(BoxRegion::MARGIN) {
            *slot = (
                source.box_adjustment.is_reset(region),
                source.box_adjustment.adjustment(region),
            );
        }

        {
            let node = &mut self.nodes[wrapper.0];
            node.style = style;
            node.declared = declared;
            node.bounds = bounds;
            node.linear = linear;
            node.box_model.margin = margin;
            node.position = position;
            node.float = float;
            node.length_context = context;
            node.flags.page_flow = flags.page_flow;
            node.flags.visible = flags.visible;
            node.flags.inline = flags.inline;
            node.flags.block = flags.block;
            node.replaces.push(id);
            node.inner_wrapped = Some(id);
            for ((reset, value), region) in margin_adjustment.into_iter().zip(BoxRegion::MARGIN) {
                node.box_adjustment.reset[region.index()] = reset;
                node.box_adjustment.adjustment[region.index()] = value;
            }
        }

        if let Some(parent) = parent {
            let index = self.child_index(id).unwrap_or(self.children(parent).len());
            self.insert_child(parent, index, wrapper);
        }
        self.append_child(wrapper, id);
        {
            let node = &mut self.nodes[id.0];
            node.outer_wrapper = Some(wrapper);
            node.position = PositionType::Static;
            node.float = Float::None;
            node.flags.page_flow = true;
        }
        for region in BoxRegion::MARGIN {
            self.set_box(id, region, SetBox { reset: Some(true), adjustment: Some(0.0) });
            self.register_box(id, region, wrapper);
        }
        debug!("created wrapper {wrapper:?} for {id:?}");
        wrapper
    }

    /// Groups sibling `members` under a new container inserted where the
    /// first of them was.
    pub fn create_group(&mut self, parent: NodeId, members: &[NodeId]) -> NodeId {
        let group = self.alloc(SyntheticKind::Group, "#group");
        let index = members
            .first()
            .and_then(|&first| self.child_index(first))
            .unwrap_or(self.children(parent).len());
        let bounds = members
            .iter()
            .map(|&m| self.nodes[m.0].bounds)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        let linear = members
            .iter()
            .map(|&m| self.nodes[m.0].linear)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        let context = self.nodes[parent.0].length_context;
        {
            let node = &mut self.nodes[group.0];
            node.bounds = bounds;
            node.linear = linear;
            node.length_context = context;
            node.replaces = members.to_vec();
            node.flags.block = true;
            node.style.set("display", "block");
        }
        self.insert_child(parent, index, group);
        for &member in members {
            self.append_child(group, member);
        }
        debug!("created group {group:?} for {members:?}");
        group
    }

    // ===== document ids =====

    /// Assigns (once) and returns the node's document id.
    ///
    /// The element `id` attribute is used when it is a valid identifier,
    /// otherwise `<control>_<n>` with a counter per control name.
    pub fn assign_document_id(&mut self, id: NodeId, control_name: &str) -> String {
        if let Some(existing) = &self.nodes[id.0].document_id {
            return existing.clone();
        }
        let preferred = self.nodes[id.0]
            .attr("id")
            .map(sanitize_identifier)
            .filter(|s| !s.is_empty());
        let document_id = match preferred {
            Some(name) if !self.used_ids.contains(&name) => name,
            Some(name) => self.next_numbered(&name),
            None => self.next_numbered(&control_stem(control_name)),
        };
        let _ = self.used_ids.insert(document_id.clone());
        self.nodes[id.0].document_id = Some(document_id.clone());
        document_id
    }

    fn next_numbered(&mut self, stem: &str) -> String {
        let counter = self.id_counters.entry(stem.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{stem}_{counter}");
            if !self.used_ids.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Node carrying `document_id`.
    #[must_use]
    pub fn find_document_id(&self, document_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.document_id.as_deref() == Some(document_id))
            .map(Node::id)
    }
}

impl Index<NodeId> for NodeTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for NodeTree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

fn resolve_box_model(node: &Node, parent_width: f32) -> BoxModel {
    let context = node.length_context;
    let edge = |property: String| {
        parse_length_or_percent(node.css(&property), parent_width, &context).unwrap_or(0.0)
    };
    let sides = |prefix: &str, suffix: &str| EdgeSizes {
        top: edge(format!("{prefix}-top{suffix}")),
        right: edge(format!("{prefix}-right{suffix}")),
        bottom: edge(format!("{prefix}-bottom{suffix}")),
        left: edge(format!("{prefix}-left{suffix}")),
    };
    let mut border = sides("border", "-width");
    for (side, width) in [
        ("top", &mut border.top),
        ("right", &mut border.right),
        ("bottom", &mut border.bottom),
        ("left", &mut border.left),
    ] {
        let style = node.css(&format!("border-{side}-style"));
        if style.is_empty() || style == "none" || style == "hidden" {
            *width = 0.0;
        }
    }
    let mut padding = sides("padding", "");
    for side in [&mut padding.top, &mut padding.right, &mut padding.bottom, &mut padding.left] {
        *side = side.max(0.0);
    }
    BoxModel {
        margin: sides("margin", ""),
        border,
        padding,
    }
}

/// Replaces characters that are not valid in a resource identifier.
#[must_use]
pub fn sanitize_identifier(value: &str) -> String {
    let mut out: String = value
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// `androidx.constraintlayout.widget.ConstraintLayout` → `constraint_layout`.
fn control_stem(control_name: &str) -> String {
    let short = control_name.rsplit('.').next().unwrap_or(control_name);
    let mut out = String::with_capacity(short.len() + 4);
    for (i, c) in short.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() { "view".to_string() } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_stem() {
        assert_eq!(
            control_stem("androidx.constraintlayout.widget.ConstraintLayout"),
            "constraint_layout"
        );
        assert_eq!(control_stem("TextView"), "text_view");
        assert_eq!(control_stem(""), "view");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("main-header"), "main_header");
        assert_eq!(sanitize_identifier("1st"), "_1st");
    }
}
