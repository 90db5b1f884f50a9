//! Android target for tessera.
//!
//! # Scope
//!
//! This crate implements:
//! - **Controller**: control selection, ids, sizes and widget attributes,
//!   followed by the constraint, box spacing and resource passes
//! - **Extensions**: one per CSS concern, from grid and flexbox to
//!   positioning, lists, columns and text reflow
//! - **Writer**: layout XML, value tables and drawables as project files,
//!   produced through a small declarative template language
//!
//! Use [`framework`] for a pipeline with every extension registered.

/// Control names, namespaces and lookup tables.
pub mod constants;
/// The Android controller.
pub mod controller;
/// CSS feature extensions.
pub mod extensions;
/// Target settings.
pub mod settings;
/// Declarative XML templates.
pub mod template;
/// Project file serialisation.
pub mod writer;

use tessera_layout::Application;

pub use controller::AndroidController;
pub use settings::AndroidSettings;
pub use template::TemplateError;

/// A pipeline for `settings` with the built-in extensions registered.
#[must_use]
pub fn framework(settings: AndroidSettings) -> Application<AndroidController> {
    let mut app = Application::new(AndroidController::new(settings));
    extensions::register_all(&mut app);
    app
}
