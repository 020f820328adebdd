// srtext-markup/src/lib.rs
//! Markup handling for text pulled out of structured reports.
//!
//! Free-text fields in reports often carry a little embedded HTML. Text sent
//! to an annotator and text searched during redaction must agree char for
//! char, so the main entry point, [`normalize`], never changes the length of
//! its input. [`strip_markup`] is the reading-friendly variant and
//! [`normalize_lines`] keeps line terminators in place for consumers that
//! report `(line, column)` positions.

pub mod lines;
pub mod normalize;
pub mod strip;
pub mod vocabulary;

pub use lines::{normalize_lines, LineIndex, Position};
pub use normalize::{normalize, Normalizer, DEFAULT_FILL, DEFAULT_NEWLINE};
pub use strip::strip_markup;
pub use vocabulary::{contains_markup, TAG_VOCABULARY};
