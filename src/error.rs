//! Error types for the XML extractor.

use thiserror::Error;

/// Errors that can occur while extracting records.
///
/// Every error is fatal to the current pass over the document: the extractor
/// never skips an offending element or retries a read.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid construction parameters (missing file, bad tag path, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An element appeared where a pending root segment was expected
    #[error("Unspecified root tag found in document: {0}")]
    UnexpectedRootTag(String),

    /// A top-level element does not match the configured target tag
    #[error("Loaded tag ({found}) does not match expected tag ({expected})")]
    TagMismatch {
        /// The element name found in the document
        found: String,
        /// The target tag from the tag path
        expected: String,
    },

    /// Elements are nested deeper than the configured limit
    #[error("Element ({tag}) exceeds the maximum nesting depth of {limit}")]
    DepthLimitExceeded {
        /// The element that would exceed the limit
        tag: String,
        /// The configured limit
        limit: usize,
    },

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// XML attribute parsing error
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type alias for extractor operations.
pub type Result<T> = std::result::Result<T, Error>;
