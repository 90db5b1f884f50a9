//! Target-independent layout translation for tessera.
//!
//! # Scope
//!
//! This crate implements:
//! - **Node model**: a mutable shadow tree built from the computed element
//!   tree, with render links, wrappers, box adjustments and extension records
//! - **Traversal**: ascend, descend and sibling queries with predicates
//! - **Extension dispatch**: the registry, per-node claiming and the
//!   post-phase subscriber model
//! - **Classification**: the default container decision for unclaimed nodes
//! - **Pipeline**: strictly ordered phases from base layout to finalize
//! - **Algorithms**: grid track sizing, content distribution, list markers
//!   and text column partitioning
//!
//! Targets plug in through [`Controller`] and their own [`Extension`]s.

/// Grid tracks, content distribution and list markers.
pub mod algorithms;
/// Phases and the base layout dispatcher.
pub mod application;
/// Rectangles, box regions and box adjustments.
pub mod box_model;
/// Default container classification.
pub mod classify;
/// The target seam.
pub mod controller;
/// Typed per-extension node records.
pub mod data;
/// Document-level errors.
pub mod error;
/// Extension trait, results and registry.
pub mod extension;
/// Layout descriptors.
pub mod layout_unit;
/// Shadow tree nodes.
pub mod node;
/// The shadow tree.
pub mod node_tree;
/// Generated files and sinks.
pub mod output;
/// Resource side-table.
pub mod resource;
/// Text measurement and word splitting.
pub mod text;
/// Tree traversal queries.
pub mod traverse;

pub use application::{Application, Phase, PhaseGate};
pub use box_model::{BoxAdjustment, BoxModel, BoxRegion, Edge, EdgeSizes, Rect, SetBox};
pub use classify::{classify, widget_type};
pub use controller::{Controller, InsertPosition, InsertionTable, RenderTemplate, TemplateKind};
pub use data::{DataKey, DataTable};
pub use error::LayoutError;
pub use extension::{Extension, ExtensionRegistry, ExtensionResult, LayoutContext};
pub use layout_unit::{Alignment, ContainerType, LayoutUnit};
pub use node::{Attributes, Float, Node, NodeFlags, NodeId, NodeKind, PositionType, SyntheticKind};
pub use node_tree::NodeTree;
pub use output::{MemorySink, OutputFile, OutputSink};
pub use resource::{ResourceStore, StyleResource, resource_name};
pub use text::{ApproximateTextMeasurer, TextMeasurer};
pub use traverse::{Direction, Link, TraverseOptions};
