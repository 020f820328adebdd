// srtext-core/src/headless.rs
//! One-shot wrappers for callers that just want a redacted report: extract,
//! redact against an annotation list, and optionally write the result into
//! another copy of the report.
//!
//! License: MIT OR APACHE 2.0

use log::{info, warn};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::SrTextConfig;
use crate::document::Dataset;
use crate::engine::AlignmentEngine;
use crate::engines::exact_engine::ExactEngine;
use crate::engines::window_engine::WindowEngine;
use crate::errors::{Result, SrTextError};
use crate::extract::extract;
use crate::knowtator;
use crate::redactor::{RedactionReport, Redactor};
use crate::span::Span;
use crate::writeback::{persist_json, write_back_with_fill};

/// Which alignment engine the one-shot helpers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadlessEngineType {
    #[default]
    Window,
    Exact,
}

impl HeadlessEngineType {
    pub fn build(self, config: &SrTextConfig) -> Box<dyn AlignmentEngine> {
        match self {
            HeadlessEngineType::Window => Box::new(WindowEngine::new(config.redact.window)),
            HeadlessEngineType::Exact => Box::new(ExactEngine),
        }
    }
}

impl fmt::Display for HeadlessEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeadlessEngineType::Window => "window",
            HeadlessEngineType::Exact => "exact",
        })
    }
}

impl FromStr for HeadlessEngineType {
    type Err = SrTextError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "window" => Ok(HeadlessEngineType::Window),
            "exact" => Ok(HeadlessEngineType::Exact),
            other => Err(SrTextError::Config(format!("Unknown engine '{}'", other))),
        }
    }
}

/// Extracts `document` and redacts it with `spans`.
pub fn headless_redact(
    document: &Dataset,
    spans: &[Span],
    config: &SrTextConfig,
    engine_type: HeadlessEngineType,
) -> Result<RedactionReport> {
    let extraction = extract(document, config);
    let redactor = Redactor::with_engine(config, engine_type.build(config));
    let report = redactor.redact(document, &extraction.ledger, spans)?;
    if !report.is_success() {
        warn!("{} of {} annotations could not be located", report.unresolved.len(), spans.len());
    }
    Ok(report)
}

/// Redacts the report at `source_path` with the Knowtator annotations at
/// `annotations_path`. With a `target_path`, the redacted text is written
/// into that existing report; otherwise nothing is written.
pub fn headless_redact_files(
    source_path: &Path,
    annotations_path: &Path,
    target_path: Option<&Path>,
    config: &SrTextConfig,
    engine_type: HeadlessEngineType,
) -> Result<RedactionReport> {
    let source = Dataset::read_json_file(source_path)?;
    let spans = knowtator::read_spans_file(annotations_path)?;
    let report = headless_redact(&source, &spans, config, engine_type)?;

    if let Some(target_path) = target_path {
        if !target_path.is_file() {
            return Err(SrTextError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("target document {} does not exist", target_path.display()),
            )));
        }
        let target = Dataset::read_json_file(target_path)?;
        let updated = write_back_with_fill(&target, &report.document, config.redact.redact_fill);
        persist_json(target_path, &updated)?;
        info!(
            "Redacted {} of {} annotations into {}",
            report.resolved.len(),
            spans.len(),
            target_path.display()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;
    use crate::tags::Keyword;

    #[test]
    fn test_engine_type_parsing() {
        assert_eq!("Window".parse::<HeadlessEngineType>().unwrap(), HeadlessEngineType::Window);
        assert_eq!("exact".parse::<HeadlessEngineType>().unwrap(), HeadlessEngineType::Exact);
        assert!("fuzzy".parse::<HeadlessEngineType>().is_err());
        assert_eq!(HeadlessEngineType::Exact.to_string(), "exact");
    }

    #[test]
    fn test_headless_redact_both_engines() {
        let config = SrTextConfig::default();
        let doc = Dataset::new().with(Element::text(Keyword::TextValue, "The patient has a cyst."));
        let spans = vec![Span::new(4, 11, "patient")];
        for engine in [HeadlessEngineType::Window, HeadlessEngineType::Exact] {
            let report = headless_redact(&doc, &spans, &config, engine).unwrap();
            assert!(report.is_success());
            assert_eq!(report.document.text(Keyword::TextValue).unwrap(), "The XXXXXXX has a cyst.");
        }
    }

    #[test]
    fn test_exact_engine_rejects_drift() {
        let config = SrTextConfig::default();
        let doc = Dataset::new().with(Element::text(Keyword::TextValue, "The patient has a cyst."));
        let spans = vec![Span::new(2, 9, "patient")];
        assert!(!headless_redact(&doc, &spans, &config, HeadlessEngineType::Exact).unwrap().is_success());
        assert!(headless_redact(&doc, &spans, &config, HeadlessEngineType::Window).unwrap().is_success());
    }
}
