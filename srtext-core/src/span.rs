// srtext-core/src/span.rs
//! The span model shared by the annotation bridge and the redactor, plus the
//! PII-safe logging helpers used wherever span text reaches a log line.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

lazy_static! {
    /// Whether span text may appear verbatim in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("SRTEXT_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// A `(preferred label, concept id)` pair attached by the annotator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Concept {
    pub preferred: String,
    pub concept_id: String,
}

impl Concept {
    pub fn new(preferred: impl Into<String>, concept_id: impl Into<String>) -> Self {
        Self {
            preferred: preferred.into(),
            concept_id: concept_id.into(),
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.preferred, self.concept_id)
    }
}

/// A character range of annotated text. Offsets count Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub text: String,
    #[serde(default)]
    pub concept: Option<Concept>,
}

impl Span {
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            concept: None,
        }
    }

    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concept = Some(concept);
        self
    }

    /// Empty spans need no work and always count as resolved.
    pub fn is_trivial(&self) -> bool {
        self.start == self.end || self.text.is_empty()
    }

    /// The same span moved by `delta` characters, or `None` if that would put
    /// it before the start of the text.
    pub fn shifted(&self, delta: isize) -> Option<Span> {
        let start = self.start.checked_add_signed(delta)?;
        let end = self.end.checked_add_signed(delta)?;
        Some(Span {
            start,
            end,
            ..self.clone()
        })
    }

    /// Stable identifier for logs that must not contain the span text.
    pub fn sample_hash(&self) -> String {
        canonical_sample_hash(&self.text)
    }
}

/// Stable, stateless sort by start offset.
pub fn sort_spans(spans: &mut [Span]) {
    spans.sort_by_key(|s| s.start);
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    let len = s.chars().count();
    if len <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", len)
    }
}

/// Span text as it may appear in a log line.
pub fn loggable(sensitive: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive.to_string()
    } else {
        redact_sensitive(sensitive)
    }
}

pub fn log_span_resolved_debug(module_path: &str, span: &Span, fragment: usize, delta: isize) {
    debug!(
        "{} Resolved span {}..{} '{}' in fragment {} (delta {:+})",
        module_path,
        span.start,
        span.end,
        loggable(&span.text),
        fragment,
        delta
    );
}

pub fn log_span_unresolved_debug(module_path: &str, span: &Span) {
    debug!(
        "{} Could not resolve span {}..{} '{}' [{}]",
        module_path,
        span.start,
        span.end,
        loggable(&span.text),
        &span.sample_hash()[..12]
    );
}

/// SHA-256 over whitespace-collapsed, lower-cased text.
pub fn canonical_sample_hash(snippet: &str) -> String {
    let normalized = snippet
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}
