//! Static web bundle target for tessera.
//!
//! # Scope
//!
//! This crate implements:
//! - **Asset extraction**: every file an element references, resolved
//!   against the document URL and mapped to a bundle path
//! - **Rules**: compression formats and transform commands attached by
//!   mime pattern
//! - **Serialisation**: the document as `index.html` with references
//!   rewritten to the bundled copies
//!
//! Fetching, compressing and transforming the files is left to the caller;
//! the [`Bundle`] only describes them.

pub mod asset;
pub mod bundler;
pub mod error;
pub mod html;
pub mod mime;
pub mod settings;

pub use asset::{Asset, Bundle};
pub use bundler::ChromeBundler;
pub use error::BundleError;
pub use settings::ChromeSettings;
