//! Errors surfaced by the layout pipeline.
//!
//! Individual nodes never fail. Extensions decline, malformed values degrade to
//! zero, and unclassifiable nodes fall back to a plain container. Only the
//! document-level gates below produce an error.

use thiserror::Error;

use crate::application::Phase;

/// Document-level layout failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The element tree has no body or document element to lay out.
    #[error("unable to finalize document")]
    UnableToFinalize,
    /// A pipeline phase was entered out of order.
    #[error("layout phase {found} entered while {expected} was expected")]
    PhaseOrder {
        /// The phase the pipeline was ready for.
        expected: Phase,
        /// The phase that was requested.
        found: Phase,
    },
}
