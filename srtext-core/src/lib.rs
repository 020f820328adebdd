// srtext-core/src/lib.rs
//! # srtext Core Library
//!
//! `srtext-core` turns DICOM Structured Reports (in the DICOM JSON model)
//! into plain text for an external annotator, and maps the annotator's spans
//! back onto the report so the annotated text can be redacted in place.
//!
//! The library does no I/O of its own apart from the explicit file helpers;
//! configuration is an immutable value passed by reference.
//!
//! ## Modules
//!
//! * `tags`: Tag, VR and keyword dictionary for the fields the tool reads.
//! * `document`: The in-memory report tree and its DICOM JSON codec.
//! * `decode`: Turns raw field values into readable text.
//! * `keys`: Header allow-list and the unexpected-field check.
//! * `config`: Layered YAML settings.
//! * `extract`: Text extraction with an offset ledger.
//! * `span`: Annotation spans and PII-safe logging helpers.
//! * `engine`: The `AlignmentEngine` trait.
//! * `engines`: Window (drift-tolerant) and exact alignment engines.
//! * `redactor`: Re-locates spans in the report and blanks them.
//! * `knowtator`: Knowtator XML reader and writer.
//! * `phi`: Reader for the annotator's PHI JSON list.
//! * `patterns`: Offline regex annotator and plain-text span blanking.
//! * `writeback`: Copies redacted text into another copy of a report.
//! * `headless`: One-shot helpers.
//!
//! ## Usage Example
//!
//! ```rust
//! use srtext_core::{extract, Dataset, Element, Keyword, Redactor, Span, SrTextConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = SrTextConfig::load_default()?;
//!     let report = Dataset::new()
//!         .with(Element::text(Keyword::StudyDate, "20050530"))
//!         .with(Element::text(Keyword::PatientName, "Walz^John"))
//!         .with(Element::text(Keyword::TextValue, "The patient has a cyst."));
//!
//!     let extraction = extract(&report, &config);
//!     assert!(extraction.text.contains("[[Patient Name]] John Walz\n"));
//!
//!     let spans = vec![Span::new(4, 11, "patient")];
//!     let result = Redactor::new(&config).redact(&report, &extraction.ledger, &spans)?;
//!     assert!(result.is_success());
//!     assert_eq!(
//!         result.document.text(Keyword::TextValue).as_deref(),
//!         Some("The XXXXXXX has a cyst.")
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Structural problems (malformed XML or JSON, a stale ledger) are returned as
//! [`SrTextError`]. Spans that cannot be re-located are not errors; they are
//! listed in [`RedactionReport::unresolved`] while every other span is still
//! applied.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod config;
pub mod decode;
pub mod document;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod extract;
pub mod headless;
pub mod keys;
pub mod knowtator;
pub mod patterns;
pub mod phi;
pub mod redactor;
pub mod span;
pub mod tags;
pub mod writeback;

pub use config::{
    AnnotateConfig, ExtractConfig, KeysConfig, LengthPolicy, MarkupConfig, PatternRule, RedactConfig,
    SpanOrigin, SrTextConfig, MAX_PATTERN_LENGTH,
};
pub use document::{Dataset, Element, FieldPath, PersonName, Value};
pub use engine::AlignmentEngine;
pub use engines::exact_engine::ExactEngine;
pub use engines::window_engine::WindowEngine;
pub use errors::SrTextError;
pub use extract::{extract, Extraction, Fragment, Ledger, ValueMapping};
pub use headless::{headless_redact, headless_redact_files, HeadlessEngineType};
pub use knowtator::{from_spans, to_spans, LabelMode};
pub use patterns::{apply_spans, PatternAnnotator};
pub use phi::spans_from_phi;
pub use redactor::{RedactionReport, Redactor, Resolution};
pub use span::{redact_sensitive, Concept, Span};
pub use tags::{Keyword, Tag, Vr};
pub use writeback::{sweep, write_back, write_back_file};
