// srtext-core/src/phi.rs
//! Reader for the annotator's PHI list: a JSON array of
//! `{"doc": "name.txt", "start": 34, "sent": "16 year old"}` records covering
//! many documents at once.
//!
//! License: MIT OR APACHE 2.0

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::errors::Result;
use crate::span::{sort_spans, Span};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PhiRecord {
    pub doc: String,
    pub start: usize,
    pub sent: String,
}

impl PhiRecord {
    pub fn to_span(&self) -> Span {
        Span::new(self.start, self.start + self.sent.chars().count(), self.sent.clone())
    }
}

pub fn parse_phi(json: &str) -> Result<Vec<PhiRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Spans recorded for `doc`, sorted by start. Unknown documents give none.
pub fn spans_from_phi(json: &str, doc: &str) -> Result<Vec<Span>> {
    let mut spans: Vec<Span> = parse_phi(json)?
        .iter()
        .filter(|record| record.doc == doc)
        .map(PhiRecord::to_span)
        .collect();
    sort_spans(&mut spans);
    Ok(spans)
}

/// Every document named in the list.
pub fn phi_documents(json: &str) -> Result<BTreeSet<String>> {
    Ok(parse_phi(json)?.into_iter().map(|record| record.doc).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SrTextError;

    const PHI: &str = r#"[
        {"doc": "b.txt", "start": 30, "sent": "Leeds", "type": "location"},
        {"doc": "a.txt", "start": 12, "sent": "Ærø"},
        {"doc": "a.txt", "start": 2, "sent": "Tom Smith"}
    ]"#;

    #[test]
    fn test_spans_for_one_document() {
        let spans = spans_from_phi(PHI, "a.txt").unwrap();
        assert_eq!(spans, vec![Span::new(2, 11, "Tom Smith"), Span::new(12, 15, "Ærø")]);
        assert!(spans_from_phi(PHI, "c.txt").unwrap().is_empty());
    }

    #[test]
    fn test_documents() {
        let docs: Vec<String> = phi_documents(PHI).unwrap().into_iter().collect();
        assert_eq!(docs, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(spans_from_phi("{", "a"), Err(SrTextError::Json(_))));
        assert!(matches!(spans_from_phi(r#"[{"doc": "a"}]"#, "a"), Err(SrTextError::Json(_))));
    }
}
