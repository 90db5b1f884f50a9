//! Tests for extension dispatch and phase ordering.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use tessera_dom::{DomTree, Snapshot, Viewport};
use tessera_layout::{
    Alignment, Application, BoxRegion, ContainerType, Controller, Extension, ExtensionResult, InsertionTable,
    LayoutContext, LayoutError, LayoutUnit, NodeId, NodeTree, OutputFile, Phase, RenderTemplate, ResourceStore,
    TemplateKind, TextMeasurer,
};

type Log = Rc<RefCell<Vec<String>>>;

fn dom(root: serde_json::Value) -> DomTree {
    let snapshot = json!({ "viewport": { "width": 400.0, "height": 300.0 }, "root": root });
    Snapshot::from_json(&snapshot.to_string())
        .and_then(Snapshot::into_tree)
        .expect("valid snapshot")
}

fn viewport() -> Viewport {
    Viewport {
        width: 400.0,
        height: 300.0,
    }
}

/// body > [div#header > "Hello", div#content, script]
fn page() -> DomTree {
    dom(json!({
        "tag": "body",
        "style": { "display": "block" },
        "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 300.0 },
        "children": [
            {
                "tag": "div",
                "attrs": { "id": "header" },
                "style": { "display": "block", "background-color": "rgb(255, 0, 0)" },
                "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 100.0 },
                "children": [
                    { "text": "Hello", "bounds": { "x": 8.0, "y": 8.0, "width": 40.0, "height": 20.0 } }
                ]
            },
            {
                "tag": "div",
                "attrs": { "id": "content" },
                "style": { "display": "block" },
                "declared": { "height": "200px" },
                "bounds": { "x": 0.0, "y": 100.0, "width": 400.0, "height": 200.0 }
            },
            { "tag": "script", "style": { "display": "none" } }
        ]
    }))
}

fn find(tree: &NodeTree, id_attr: &str) -> NodeId {
    tree.ids()
        .find(|&id| tree[id].attr("id") == Some(id_attr))
        .expect("node with id attribute")
}

#[derive(Default)]
struct TestController {
    insertions: InsertionTable,
    log: Log,
}

impl Controller for TestController {
    fn render_node(&mut self, tree: &mut NodeTree, unit: &LayoutUnit) -> RenderTemplate {
        let control_name = unit.container_type.to_string();
        let _ = tree.assign_document_id(unit.node, &control_name);
        RenderTemplate {
            kind: TemplateKind::Xml,
            node: unit.node,
            parent: unit.parent,
            control_name,
        }
    }

    fn insertions(&self) -> &InsertionTable {
        &self.insertions
    }

    fn insertions_mut(&mut self) -> &mut InsertionTable {
        &mut self.insertions
    }

    fn post_box_spacing(&mut self, _tree: &mut NodeTree, _resources: &mut ResourceStore) {
        self.log.borrow_mut().push("controller:box_spacing".to_string());
    }

    fn post_resources(&mut self, _tree: &mut NodeTree, _resources: &mut ResourceStore) {
        self.log.borrow_mut().push("controller:resources".to_string());
    }

    fn finalize(&mut self, tree: &NodeTree, _resources: &ResourceStore) -> Vec<OutputFile> {
        let names: Vec<&str> = tree
            .render_order()
            .into_iter()
            .map(|id| tree[id].control_name.as_str())
            .collect();
        vec![OutputFile::new("", "layout.txt", names.join(","))]
    }
}

/// Claims nodes carrying a given attribute and drops them.
struct Remover {
    name: &'static str,
    attribute: &'static str,
    log: Log,
}

impl Extension<TestController> for Remover {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].attr(self.attribute).is_some()
    }

    fn process_node(
        &mut self,
        ctx: &mut LayoutContext<'_, TestController>,
        node: NodeId,
        _parent: NodeId,
    ) -> Option<ExtensionResult> {
        self.log.borrow_mut().push(format!("{}:{}", self.name, ctx.tree[node].tag));
        Some(ExtensionResult::remove())
    }
}

/// Wraps claimed nodes and records post-phase callbacks.
struct Wrapper {
    log: Log,
}

impl Extension<TestController> for Wrapper {
    fn name(&self) -> &'static str {
        "wrap"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].attr("data-wrap").is_some()
    }

    fn process_node(
        &mut self,
        ctx: &mut LayoutContext<'_, TestController>,
        node: NodeId,
        _parent: NodeId,
    ) -> Option<ExtensionResult> {
        let wrapper = ctx.tree.create_wrapper(node);
        ctx.subscribe(wrapper);
        Some(ExtensionResult::render_as(wrapper, None))
    }

    fn post_box_spacing(&mut self, ctx: &mut LayoutContext<'_, TestController>, node: NodeId) {
        ctx.tree.modify_box(node, BoxRegion::PaddingTop, 4.0, false);
        self.log.borrow_mut().push("wrap:box_spacing".to_string());
    }

    fn post_resources(&mut self, _ctx: &mut LayoutContext<'_, TestController>, _node: NodeId) {
        self.log.borrow_mut().push("wrap:resources".to_string());
    }
}

/// Renders every child of a claimed list as text.
struct Lister;

impl Extension<TestController> for Lister {
    fn name(&self) -> &'static str {
        "list"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].tag == "ul"
    }

    fn process_node(
        &mut self,
        ctx: &mut LayoutContext<'_, TestController>,
        node: NodeId,
        _parent: NodeId,
    ) -> Option<ExtensionResult> {
        ctx.tree[node].render_extensions.push("list");
        Some(ExtensionResult::next())
    }

    fn process_child(
        &mut self,
        _ctx: &mut LayoutContext<'_, TestController>,
        node: NodeId,
        parent: NodeId,
    ) -> Option<ExtensionResult> {
        let unit = LayoutUnit::new(parent, node, Vec::new()).with_container(ContainerType::Text, Alignment::NONE);
        Some(ExtensionResult::output(unit))
    }
}

/// Lifts the children of a claimed node into its parent.
struct Unwrapper;

impl Extension<TestController> for Unwrapper {
    fn name(&self) -> &'static str {
        "unwrap"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].attr("data-unwrap").is_some()
    }

    fn process_node(
        &mut self,
        ctx: &mut LayoutContext<'_, TestController>,
        node: NodeId,
        parent: NodeId,
    ) -> Option<ExtensionResult> {
        let children = ctx.tree.visible_children(node);
        let index = ctx.tree.child_index(node).unwrap_or(0);
        for (offset, &child) in children.iter().enumerate() {
            ctx.tree.insert_child(parent, index + offset, child);
        }
        Some(ExtensionResult::replace_with(children))
    }
}

/// Renders claimed nodes directly under the root.
struct Hoister;

impl Extension<TestController> for Hoister {
    fn name(&self) -> &'static str {
        "hoist"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].attr("data-hoist").is_some()
    }

    fn process_node(
        &mut self,
        ctx: &mut LayoutContext<'_, TestController>,
        _node: NodeId,
        _parent: NodeId,
    ) -> Option<ExtensionResult> {
        Some(ExtensionResult::next().with_parent(ctx.tree.root()))
    }
}

/// Records what the configured measurer reports, then declines.
struct MeasureRecorder {
    log: Log,
}

impl Extension<TestController> for MeasureRecorder {
    fn name(&self) -> &'static str {
        "measure-recorder"
    }

    fn is(&self, tree: &NodeTree, node: NodeId) -> bool {
        tree[node].attr("id") == Some("header")
    }

    fn process_node(
        &mut self,
        ctx: &mut LayoutContext<'_, TestController>,
        _node: NodeId,
        _parent: NodeId,
    ) -> Option<ExtensionResult> {
        let width = ctx.measurer.text_width("abc", 10.0);
        self.log.borrow_mut().push(format!("{width}"));
        None
    }
}

struct Fixed;

impl TextMeasurer for Fixed {
    fn text_width(&self, _text: &str, _font_size: f32) -> f32 {
        7.0
    }

    fn line_height(&self, _font_size: f32) -> f32 {
        14.0
    }
}

// ========== default classification ==========

#[test]
fn test_default_layout_renders_in_document_order() {
    let mut app = Application::new(TestController::default());
    let (tree, files) = app.run(&page(), viewport()).expect("layout succeeds");

    let body = tree.root();
    let header = find(&tree, "header");
    let content = find(&tree, "content");
    assert_eq!(tree.render_children(body), &[header, content]);
    assert_eq!(tree[body].container_type, ContainerType::Linear);
    assert!(tree[body].alignment.contains(Alignment::VERTICAL));
    assert_eq!(tree[header].container_type, ContainerType::Text);
    assert_eq!(tree[content].container_type, ContainerType::Frame);
    assert_eq!(files[0].content, "linear,text,frame");
    assert_eq!(app.phase(), Phase::Finalized);
}

#[test]
fn test_document_ids_prefer_element_ids() {
    let mut app = Application::new(TestController::default());
    let tree = app.parse_document(&page(), viewport()).expect("layout succeeds");
    assert_eq!(tree[find(&tree, "header")].document_id(), Some("header"));
    assert_eq!(tree[tree.root()].document_id(), Some("linear_1"));
}

// ========== dispatch ==========

#[test]
fn test_first_matching_extension_claims_node() {
    let log = Log::default();
    let mut app = Application::new(TestController::default());
    app.register(Remover {
        name: "first",
        attribute: "id",
        log: Rc::clone(&log),
    });
    app.register(Remover {
        name: "second",
        attribute: "id",
        log: Rc::clone(&log),
    });
    let tree = app.parse_document(&page(), viewport()).expect("layout succeeds");

    assert_eq!(*log.borrow(), vec!["first:div", "first:div"]);
    let header = find(&tree, "header");
    assert!(tree[header].flags.excluded);
    assert!(tree.render_children(tree.root()).is_empty());
}

#[test]
fn test_disabled_extension_is_skipped() {
    let log = Log::default();
    let mut app = Application::new(TestController::default());
    app.register(Remover {
        name: "first",
        attribute: "id",
        log: Rc::clone(&log),
    });
    app.register(Remover {
        name: "second",
        attribute: "id",
        log: Rc::clone(&log),
    });
    assert!(app.registry_mut().set_enabled("first", false));
    let _ = app.parse_document(&page(), viewport()).expect("layout succeeds");
    assert_eq!(*log.borrow(), vec!["second:div", "second:div"]);
}

#[test]
fn test_render_as_wrapper_takes_node_place() {
    let log = Log::default();
    let document = dom(json!({
        "tag": "body",
        "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 300.0 },
        "children": [{
            "tag": "div",
            "attrs": { "id": "boxed", "data-wrap": "" },
            "style": { "margin-top": "12px", "background-color": "blue" },
            "bounds": { "x": 0.0, "y": 12.0, "width": 100.0, "height": 50.0 }
        }]
    }));
    let mut app = Application::new(TestController::default());
    app.register(Wrapper { log: Rc::clone(&log) });
    let tree = app.parse_document(&document, viewport()).expect("layout succeeds");

    let boxed = find(&tree, "boxed");
    let wrapper = tree.outer_wrapper(boxed).expect("wrapper created");
    assert_eq!(tree.render_parent(wrapper), Some(tree.root()));
    assert_eq!(tree.render_parent(boxed), Some(wrapper));
    assert!(tree[wrapper].alignment.contains(Alignment::SINGLE | Alignment::WRAPPER));
    assert_eq!(tree[boxed].container_type, ContainerType::Frame);

    // Margins moved to the wrapper.
    assert_eq!(tree.box_value(wrapper, BoxRegion::MarginTop), 12.0);
    assert_eq!(tree.box_value(boxed, BoxRegion::MarginTop), 0.0);
    // The subscribed wrapper got its post-phase callback.
    assert_eq!(tree.box_value(wrapper, BoxRegion::PaddingTop), 4.0);
    assert_eq!(app.registry().subscribers("wrap"), vec![wrapper]);
}

#[test]
fn test_post_phase_order() {
    let log = Log::default();
    let document = dom(json!({
        "tag": "body",
        "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 300.0 },
        "children": [{
            "tag": "div",
            "attrs": { "data-wrap": "" },
            "style": { "background-color": "blue" },
            "bounds": { "x": 0.0, "y": 0.0, "width": 100.0, "height": 50.0 }
        }]
    }));
    let controller = TestController {
        log: Rc::clone(&log),
        ..TestController::default()
    };
    let mut app = Application::new(controller);
    app.register(Wrapper { log: Rc::clone(&log) });
    let _ = app.parse_document(&document, viewport()).expect("layout succeeds");

    assert_eq!(
        *log.borrow(),
        vec![
            "wrap:box_spacing",
            "controller:box_spacing",
            "controller:resources",
            "wrap:resources",
        ]
    );
}

#[test]
fn test_child_hook_handles_list_items() {
    let document = dom(json!({
        "tag": "body",
        "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 300.0 },
        "children": [{
            "tag": "ul",
            "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 40.0 },
            "children": [
                { "tag": "li", "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 20.0 },
                  "children": [{ "text": "one", "bounds": { "x": 0.0, "y": 0.0, "width": 30.0, "height": 20.0 } }] },
                { "tag": "li", "bounds": { "x": 0.0, "y": 20.0, "width": 400.0, "height": 20.0 },
                  "children": [{ "text": "two", "bounds": { "x": 0.0, "y": 20.0, "width": 30.0, "height": 20.0 } }] }
            ]
        }]
    }));
    let mut app = Application::new(TestController::default());
    app.register(Lister);
    let tree = app.parse_document(&document, viewport()).expect("layout succeeds");

    let list = tree.children(tree.root())[0];
    assert_eq!(tree[list].container_type, ContainerType::Linear);
    for &item in tree.render_children(list) {
        assert_eq!(tree[item].container_type, ContainerType::Text);
        assert!(!tree[item].is_applied("list"));
    }
    assert_eq!(tree.render_children(list).len(), 2);
}

#[test]
fn test_replace_with_lays_out_replacements() {
    let document = dom(json!({
        "tag": "body",
        "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 300.0 },
        "children": [{
            "tag": "section",
            "attrs": { "data-unwrap": "" },
            "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 100.0 },
            "children": [
                { "tag": "div", "attrs": { "id": "a" }, "style": { "background-color": "red" },
                  "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 50.0 } },
                { "tag": "div", "attrs": { "id": "b" }, "style": { "background-color": "red" },
                  "bounds": { "x": 0.0, "y": 50.0, "width": 400.0, "height": 50.0 } }
            ]
        }]
    }));
    let mut app = Application::new(TestController::default());
    app.register(Unwrapper);
    let tree = app.parse_document(&document, viewport()).expect("layout succeeds");

    let (a, b) = (find(&tree, "a"), find(&tree, "b"));
    assert_eq!(tree.render_children(tree.root()), &[a, b]);
    let section = tree
        .ids()
        .find(|&id| tree[id].tag == "section")
        .expect("section imported");
    assert!(tree[section].flags.excluded);
}

#[test]
fn test_parent_override_moves_render_parent() {
    let document = dom(json!({
        "tag": "body",
        "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 300.0 },
        "children": [{
            "tag": "div",
            "attrs": { "id": "outer" },
            "style": { "background-color": "red" },
            "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 100.0 },
            "children": [{
                "tag": "div",
                "attrs": { "id": "inner", "data-hoist": "" },
                "style": { "background-color": "blue" },
                "bounds": { "x": 0.0, "y": 0.0, "width": 100.0, "height": 50.0 }
            }]
        }]
    }));
    let mut app = Application::new(TestController::default());
    app.register(Hoister);
    let tree = app.parse_document(&document, viewport()).expect("layout succeeds");

    let (outer, inner) = (find(&tree, "outer"), find(&tree, "inner"));
    assert_eq!(tree.parent(inner), Some(outer));
    assert_eq!(tree.render_parent(inner), Some(tree.root()));
    assert!(!tree.render_children(outer).contains(&inner));
}

#[test]
fn test_extensions_see_configured_measurer() {
    let log = Log::default();
    let mut app = Application::new(TestController::default()).with_measurer(Fixed);
    app.register(MeasureRecorder { log: Rc::clone(&log) });
    let tree = app.parse_document(&page(), viewport()).expect("layout succeeds");

    assert_eq!(*log.borrow(), vec!["7"]);
    assert!(tree[find(&tree, "header")].flags.rendered);
}

// ========== phases ==========

#[test]
fn test_second_finalize_is_rejected() {
    let mut app = Application::new(TestController::default());
    let tree = app.parse_document(&page(), viewport()).expect("layout succeeds");
    let _ = app.finalize(&tree).expect("first finalize succeeds");
    assert_eq!(
        app.finalize(&tree),
        Err(LayoutError::PhaseOrder {
            expected: Phase::Idle,
            found: Phase::Finalized
        })
    );
}

#[test]
fn test_phase_order_is_strict() {
    let mut gate = tessera_layout::PhaseGate::default();
    assert_eq!(
        gate.enter(Phase::BaseLayout),
        Err(LayoutError::PhaseOrder {
            expected: Phase::CachePopulated,
            found: Phase::BaseLayout
        })
    );
    gate.enter(Phase::CachePopulated).expect("next phase");
    assert_eq!(gate.current(), Phase::CachePopulated);
}

#[test]
fn test_hidden_body_cannot_finalize() {
    let document = dom(json!({
        "tag": "body",
        "style": { "display": "none" },
        "bounds": { "x": 0.0, "y": 0.0, "width": 400.0, "height": 300.0 }
    }));
    let mut app = Application::new(TestController::default());
    assert_eq!(
        app.run(&document, viewport()).map(|(_, files)| files),
        Err(LayoutError::UnableToFinalize)
    );
}

#[test]
fn test_missing_body_is_an_error() {
    let document = dom(json!({ "tag": "html", "children": [{ "tag": "head" }] }));
    let mut app = Application::new(TestController::default());
    assert!(matches!(
        app.parse_document(&document, viewport()),
        Err(LayoutError::UnableToFinalize)
    ));
}
