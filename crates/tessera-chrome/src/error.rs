//! Errors surfaced by the bundler.

use thiserror::Error;

/// Bundle failures.
///
/// Individual references never fail the bundle: unparseable or unsupported
/// URLs are left as they are in the document and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    /// The document URL could not be parsed.
    #[error("invalid document url {url:?}: {source}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The element tree has no document element to serialise.
    #[error("document has no root element")]
    EmptyDocument,
}
