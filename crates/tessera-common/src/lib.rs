//! Common utilities for the tessera translators.
//!
//! This crate provides shared infrastructure used by every other crate:
//! - **Warning System** - deduplicated `log` warnings for unsupported input
//! - **Units** - CSS length / number parsing that degrades to zero instead of failing
//! - **Color** - computed color strings to platform hex notation
//! - **CSS URLs** - `url(...)` extraction and rewriting

pub mod color;
pub mod css_url;
pub mod units;
pub mod warning;
