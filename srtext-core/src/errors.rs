//! errors.rs - Custom error types for the srtext-core library.
//!
//! Only structural problems surface as errors: malformed annotation XML, a
//! document that does not follow the DICOM JSON model, a field the caller
//! explicitly required, or a ledger that no longer describes the document.
//! Spans that cannot be re-located are reported in the redaction result
//! instead.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `srtext-core` library.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SrTextError {
    #[error("Malformed annotation XML: {0}")]
    AnnotationXml(#[from] quick_xml::Error),

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Malformed document: {0}")]
    InvalidDocument(String),

    #[error("Unknown attribute keyword '{0}'")]
    UnknownKeyword(String),

    #[error("Required field '{0}' is missing from the document")]
    MissingField(String),

    #[error("Fragment {index} no longer matches the ledger: expected {expected:?}, found {found:?}")]
    LedgerMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: tempfile::PersistError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("An unexpected I/O error occurred: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SrTextError>;
