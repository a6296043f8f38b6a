//! Error types for GPX parsing and serialization.

use std::io;
use thiserror::Error;

/// Errors surfaced while reading or writing GPX documents.
///
/// Parse failures (`XmlParse`, the attribute/element variants, `InvalidTimestamp`,
/// `InvalidYear`) come from the decode path; `Io` is a propagated source or sink
/// failure from the read/write path.
#[derive(Debug, Error)]
pub enum GpxError {
    /// Malformed XML syntax
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// A structurally required attribute is absent
    #[error("missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// Attribute text that does not convert to its declared type
    #[error("invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// Element text that does not convert to its declared type
    #[error("invalid value '{value}' for element <{element}>")]
    InvalidElement {
        element: &'static str,
        value: String,
    },

    /// A timestamp field that is not RFC 3339
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    /// A copyright year with no leading digit run
    #[error("invalid year '{0}'")]
    InvalidYear(String),

    /// The document contains no <gpx> root element
    #[error("missing <gpx> root element")]
    MissingRoot,

    /// Propagated I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for GPX operations
pub type Result<T> = std::result::Result<T, GpxError>;
