// srtext-core/src/redactor.rs
//! Span Redactor: applies annotator spans to the fields they came from.
//!
//! The document is walked again with the extractor's walk and the fresh
//! fragments must match the ledger. Each fragment then claims the unresolved
//! spans its alignment engine admits and can locate. Person names and dates
//! are blanked whether or not anything was annotated in them. Located ranges
//! are merged per fragment and written back into the raw field values.
//!
//! Spans that cannot be located are reported, never dropped. Everything that
//! was located stays redacted.
//!
//! License: MIT OR APACHE 2.0

use log::info;
use rand::Rng;
use std::ops::Range;

use crate::config::{LengthPolicy, RedactConfig, SpanOrigin, SrTextConfig};
use crate::document::{Dataset, VALUE_DELIMITER};
use crate::engine::AlignmentEngine;
use crate::engines::window_engine::WindowEngine;
use crate::errors::{Result, SrTextError};
use crate::extract::{collect_fragments, Fragment, Ledger, ValueMapping};
use crate::span::{log_span_resolved_debug, log_span_unresolved_debug, Span};
use crate::tags::{FormatClass, Vr};

/// Where one span ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub span: Span,
    /// Index of the fragment holding the span; `None` for trivial spans.
    pub fragment: Option<usize>,
    /// Offset correction that made the text match.
    pub delta: isize,
}

/// Outcome of one redaction run.
#[derive(Debug, Clone)]
pub struct RedactionReport {
    pub document: Dataset,
    /// The body with every redaction applied at fixed length.
    pub redacted_body: String,
    pub resolved: Vec<Resolution>,
    pub unresolved: Vec<Span>,
    /// Fragments blanked by the person-name and date rule.
    pub always_blanked: usize,
}

impl RedactionReport {
    pub fn is_success(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// One message per unresolved span.
    pub fn failures(&self) -> Vec<String> {
        self.unresolved
            .iter()
            .map(|s| format!("could not find annotation \"{}\" in document", s.text))
            .collect()
    }
}

/// Person names and dates are blanked in full even without an annotation.
pub fn always_blank(vr: Vr) -> bool {
    matches!(
        vr.format_class(),
        FormatClass::PersonName | FormatClass::Date
    )
}

/// The filler used for a field of this VR.
pub fn fill_char_for(vr: Vr, config: &RedactConfig) -> char {
    if vr.uses_digit_fill() {
        config.digit_fill
    } else {
        config.redact_fill
    }
}

pub struct Redactor<'a> {
    config: &'a SrTextConfig,
    engine: Box<dyn AlignmentEngine>,
}

impl<'a> Redactor<'a> {
    /// A redactor using the window engine sized from `config`.
    pub fn new(config: &'a SrTextConfig) -> Self {
        Self::with_engine(config, Box::new(WindowEngine::new(config.redact.window)))
    }

    pub fn with_engine(config: &'a SrTextConfig, engine: Box<dyn AlignmentEngine>) -> Self {
        Self { config, engine }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Redacts `document` using spans computed over the text described by
    /// `ledger`. Only a ledger that no longer matches the document is an
    /// error; unlocated spans are listed in the report.
    pub fn redact(&self, document: &Dataset, ledger: &Ledger, spans: &[Span]) -> Result<RedactionReport> {
        let fragments = collect_fragments(document, self.config);
        ledger.verify(&fragments)?;

        let mut states: Vec<SpanState> = spans
            .iter()
            .map(|span| {
                let body = match self.config.redact.span_origin {
                    SpanOrigin::Body => Some(span.clone()),
                    SpanOrigin::Extracted => ledger.rebase(span),
                };
                SpanState {
                    original: span,
                    body,
                    resolution: None,
                }
            })
            .collect();

        for state in states.iter_mut().filter(|s| s.original.is_trivial()) {
            state.resolution = Some(Resolution {
                span: state.original.clone(),
                fragment: None,
                delta: 0,
            });
        }

        let mut last_delta: isize = 0;
        let mut edits: Vec<FragmentEdit> = Vec::with_capacity(fragments.len());

        for (index, fragment) in fragments.iter().enumerate() {
            let range = fragment.body_range();
            let mut chars: Vec<char> = fragment.text.chars().collect();
            chars.push('\n');
            let mut pending: Vec<Range<usize>> = Vec::new();

            for state in states.iter_mut().filter(|s| s.resolution.is_none()) {
                let Some(body) = &state.body else { continue };
                if !self.engine.admits(body, last_delta, &range) {
                    continue;
                }
                let start = body.start as isize - range.start as isize;
                let end = body.end as isize - range.start as isize;
                if let Some(delta) = self.engine.locate(&chars, start, end, &body.text, last_delta) {
                    pending.push((start + delta) as usize..(end + delta) as usize);
                    log_span_resolved_debug(module_path!(), state.original, index, delta);
                    state.resolution = Some(Resolution {
                        span: state.original.clone(),
                        fragment: Some(index),
                        delta,
                    });
                    last_delta = delta;
                }
            }

            let blank_all = always_blank(fragment.vr);
            edits.push(FragmentEdit {
                ranges: merge_ranges(pending, fragment.char_len()),
                blank_all,
            });
        }

        let mut output = document.clone();
        let mut redacted_body = String::new();
        let mut always_blanked = 0;
        let mut rng = rand::rng();

        for (fragment, edit) in fragments.iter().zip(&edits) {
            let fill = fill_char_for(fragment.vr, &self.config.redact);
            let text_ranges = if edit.blank_all {
                vec![0..fragment.char_len()]
            } else {
                edit.ranges.clone()
            };
            redacted_body.push_str(&fill_ranges(&fragment.text, &text_ranges, fill, |r| r.len()));
            redacted_body.push('\n');

            let value_ranges = raw_ranges(fragment, edit);
            if value_ranges.is_empty() {
                continue;
            }
            if edit.blank_all {
                always_blanked += 1;
            }
            let policy = self.config.redact.length_policy;
            let new_raw = fill_ranges(&fragment.raw, &value_ranges, fill, |r| {
                replacement_len(r.len(), policy, &mut rng)
            });
            let element = output.element_at_mut(&fragment.path).ok_or_else(|| {
                SrTextError::InvalidDocument(format!("{} disappeared during redaction", fragment.path))
            })?;
            element.set_value_text(&new_raw);
        }

        let mut resolved = Vec::new();
        let mut unresolved = Vec::new();
        for state in states {
            match state.resolution {
                Some(resolution) => resolved.push(resolution),
                None => {
                    log_span_unresolved_debug(module_path!(), state.original);
                    unresolved.push(state.original.clone());
                }
            }
        }

        info!(
            "Redacted with {} engine: {} spans resolved, {} unresolved, {} fields always blanked",
            self.engine.name(),
            resolved.len(),
            unresolved.len(),
            always_blanked
        );

        Ok(RedactionReport {
            document: output,
            redacted_body,
            resolved,
            unresolved,
            always_blanked,
        })
    }
}

struct SpanState<'s> {
    original: &'s Span,
    body: Option<Span>,
    resolution: Option<Resolution>,
}

struct FragmentEdit {
    /// Fragment-relative char ranges, merged and sorted.
    ranges: Vec<Range<usize>>,
    blank_all: bool,
}

/// Sorts, clips to `len` and merges overlapping or touching ranges.
fn merge_ranges(mut ranges: Vec<Range<usize>>, len: usize) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<Range<usize>> = Vec::new();
    for r in ranges {
        let r = r.start.min(len)..r.end.min(len);
        if r.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if r.start <= last.end => last.end = last.end.max(r.end),
            _ => merged.push(r),
        }
    }
    merged
}

/// Maps fragment-text ranges onto the raw value. Whole-value blanking
/// covers each `\`-separated value but leaves the delimiters, so a
/// multi-valued field keeps its value count.
fn raw_ranges(fragment: &Fragment, edit: &FragmentEdit) -> Vec<Range<usize>> {
    if edit.blank_all {
        return value_ranges(&fragment.raw);
    }
    if edit.ranges.is_empty() {
        return Vec::new();
    }
    match fragment.mapping {
        ValueMapping::Opaque => value_ranges(&fragment.raw),
        ValueMapping::Identity => {
            let value = &fragment.value_range;
            edit.ranges
                .iter()
                .filter_map(|r| {
                    let start = r.start.max(value.start);
                    let end = r.end.min(value.end);
                    (start < end).then(|| start - value.start..end - value.start)
                })
                .collect()
        }
    }
}

/// Char ranges of the non-empty values in a `\`-joined raw value.
fn value_ranges(raw: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, c) in raw.chars().chain(std::iter::once(VALUE_DELIMITER)).enumerate() {
        if c == VALUE_DELIMITER {
            if i > start {
                ranges.push(start..i);
            }
            start = i + 1;
        }
    }
    ranges
}

fn replacement_len(len: usize, policy: LengthPolicy, rng: &mut impl Rng) -> usize {
    match policy {
        LengthPolicy::Fixed => len,
        LengthPolicy::Randomized => {
            let low = (len / 2).max(1);
            let high = len + len / 2;
            if high <= low {
                low
            } else {
                rng.random_range(low..=high)
            }
        }
    }
}

/// Replaces each range of `text` with a run of `fill`, applied from the
/// last range backwards so earlier offsets stay valid.
fn fill_ranges(
    text: &str,
    ranges: &[Range<usize>],
    fill: char,
    mut run_len: impl FnMut(&Range<usize>) -> usize,
) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    for r in ranges.iter().rev() {
        let end = r.end.min(chars.len());
        let start = r.start.min(end);
        let n = run_len(&(start..end));
        chars.splice(start..end, std::iter::repeat(fill).take(n));
    }
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Element, Value};
    use crate::engines::exact_engine::ExactEngine;
    use crate::extract::extract;
    use crate::tags::Keyword;

    fn text_report(text: &str) -> Dataset {
        Dataset::new().with(Element::text(Keyword::TextValue, text))
    }

    #[test]
    fn test_redacts_located_span() -> anyhow::Result<()> {
        let config = SrTextConfig::default();
        let doc = text_report("The patient has a cyst.");
        let extraction = extract(&doc, &config);
        let report = Redactor::new(&config).redact(&doc, &extraction.ledger, &[Span::new(4, 11, "patient")])?;
        assert!(report.is_success());
        assert_eq!(report.document.text(Keyword::TextValue).as_deref(), Some("The XXXXXXX has a cyst."));
        assert_eq!(report.redacted_body, "The XXXXXXX has a cyst.\n");
        assert_eq!(report.resolved[0].delta, 0);
        Ok(())
    }

    #[test]
    fn test_recovers_drift_from_markup() -> anyhow::Result<()> {
        let config = SrTextConfig::default();
        let doc = text_report("Seen <BR>today by Dr Who.");
        let extraction = extract(&doc, &config);
        // The annotator saw "Seen today ..." with the tag removed.
        let span = Span::new(17, 20, "Who");
        let report = Redactor::new(&config).redact(&doc, &extraction.ledger, &[span])?;
        assert!(report.is_success());
        assert_eq!(report.resolved[0].delta, 4);
        assert_eq!(report.document.text(Keyword::TextValue).as_deref(), Some("Seen <BR>today by Dr XXX."));
        Ok(())
    }

    #[test]
    fn test_partial_success_keeps_located_spans() -> anyhow::Result<()> {
        let config = SrTextConfig::default();
        let doc = text_report("The patient has a cyst.");
        let extraction = extract(&doc, &config);
        let spans = [Span::new(4, 11, "patient"), Span::new(18, 22, "wart")];
        let report = Redactor::new(&config).redact(&doc, &extraction.ledger, &spans)?;
        assert!(!report.is_success());
        assert_eq!(report.failures(), vec!["could not find annotation \"wart\" in document".to_string()]);
        assert_eq!(report.document.text(Keyword::TextValue).as_deref(), Some("The XXXXXXX has a cyst."));
        Ok(())
    }

    #[test]
    fn test_trivial_spans_resolve() -> anyhow::Result<()> {
        let config = SrTextConfig::default();
        let doc = text_report("abc");
        let extraction = extract(&doc, &config);
        let report = Redactor::new(&config).redact(&doc, &extraction.ledger, &[Span::new(1, 1, "")])?;
        assert!(report.is_success());
        assert_eq!(report.document, doc);
        Ok(())
    }

    #[test]
    fn test_always_blank_names_and_dates() -> anyhow::Result<()> {
        let config = SrTextConfig::default();
        let item = |vt: &str, e: Element| {
            Dataset::new().with(Element::text(Keyword::ValueType, vt)).with(e)
        };
        let doc = Dataset::new().with(Element::sequence(
            Keyword::ContentSequence,
            vec![
                item("PNAME", Element::text(Keyword::PersonName, "Walz^John")),
                item("DATE", Element::text(Keyword::Date, "20050530")),
            ],
        ));
        let extraction = extract(&doc, &config);
        let report = Redactor::new(&config).redact(&doc, &extraction.ledger, &[])?;
        assert_eq!(report.always_blanked, 2);
        assert_eq!(report.redacted_body, "XXXXXXXXX\n99999999\n");
        let items = report.document.items(Keyword::ContentSequence);
        assert_eq!(items[0].get(Keyword::PersonName).map(|e| e.value.clone()), Some(Value::Names(vec!["XXXXXXXXX".into()])));
        assert_eq!(items[1].text(Keyword::Date).as_deref(), Some("99999999"));
        Ok(())
    }

    #[test]
    fn test_always_blank_keeps_each_name_value() -> anyhow::Result<()> {
        use crate::document::PersonName;
        let config = SrTextConfig::default();
        let names = Element::new(
            Keyword::PersonName,
            Vr::PN,
            Value::Names(vec![
                PersonName {
                    alphabetic: "Walz^John".into(),
                    ideographic: Some("ワルツ^ジョン".into()),
                    phonetic: None,
                },
                "Doe^Jane".into(),
            ]),
        );
        let doc = Dataset::new().with(Element::sequence(
            Keyword::ContentSequence,
            vec![Dataset::new().with(Element::text(Keyword::ValueType, "PNAME")).with(names)],
        ));
        let extraction = extract(&doc, &config);
        let report = Redactor::new(&config).redact(&doc, &extraction.ledger, &[])?;
        let item = &report.document.items(Keyword::ContentSequence)[0];
        assert_eq!(
            item.get(Keyword::PersonName).map(|e| e.value.clone()),
            Some(Value::Names(vec!["XXXXXXXXX".into(), "XXXXXXXX".into()]))
        );
        Ok(())
    }

    #[test]
    fn test_value_ranges_skip_delimiters() {
        assert_eq!(value_ranges("Walz^John\\Doe"), vec![0..9, 10..13]);
        assert_eq!(value_ranges("\\ab\\"), vec![1..3]);
        assert!(value_ranges("").is_empty());
    }

    #[test]
    fn test_numbers_use_digit_fill_and_stay_numeric() -> anyhow::Result<()> {
        let config = SrTextConfig::default();
        let measured = Dataset::new().with(Element::new(
            Keyword::NumericValue,
            crate::tags::Vr::DS,
            Value::Numbers(vec![42.into()]),
        ));
        let doc = Dataset::new().with(Element::sequence(
            Keyword::ContentSequence,
            vec![Dataset::new()
                .with(Element::text(Keyword::ValueType, "NUM"))
                .with(Element::sequence(Keyword::MeasuredValueSequence, vec![measured]))],
        ));
        let extraction = extract(&doc, &config);
        assert_eq!(extraction.body(), "42 \n");
        let report = Redactor::new(&config).redact(&doc, &extraction.ledger, &[Span::new(0, 2, "42")])?;
        let item = &report.document.items(Keyword::ContentSequence)[0];
        let number = item.items(Keyword::MeasuredValueSequence)[0].get(Keyword::NumericValue).unwrap();
        assert_eq!(number.value, Value::Numbers(vec![99.into()]));
        Ok(())
    }

    #[test]
    fn test_exact_engine_refuses_drift() -> anyhow::Result<()> {
        let config = SrTextConfig::default();
        let doc = text_report("Seen <BR>today by Dr Who.");
        let extraction = extract(&doc, &config);
        let redactor = Redactor::with_engine(&config, Box::new(ExactEngine));
        let report = redactor.redact(&doc, &extraction.ledger, &[Span::new(17, 20, "Who")])?;
        assert_eq!(report.unresolved.len(), 1);
        assert_eq!(redactor.engine_name(), "exact");
        Ok(())
    }

    #[test]
    fn test_extracted_origin_rebases() -> anyhow::Result<()> {
        let mut config = SrTextConfig::default();
        config.redact.span_origin = SpanOrigin::Extracted;
        let doc = text_report("The patient has a cyst.").with(Element::text(Keyword::StudyDate, "20050530"));
        let extraction = extract(&doc, &config);
        let start = extraction.text.find("patient").unwrap();
        let spans = [Span::new(start, start + 7, "patient"), Span::new(0, 5, "[[Stu")];
        let report = Redactor::new(&config).redact(&doc, &extraction.ledger, &spans)?;
        assert_eq!(report.document.text(Keyword::TextValue).as_deref(), Some("The XXXXXXX has a cyst."));
        assert_eq!(report.unresolved, vec![Span::new(0, 5, "[[Stu")]);
        Ok(())
    }

    #[test]
    fn test_randomized_length_bounds() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let n = replacement_len(10, LengthPolicy::Randomized, &mut rng);
            assert!((5..=15).contains(&n));
        }
        assert_eq!(replacement_len(1, LengthPolicy::Randomized, &mut rng), 1);
        assert_eq!(replacement_len(7, LengthPolicy::Fixed, &mut rng), 7);
    }

    #[test]
    fn test_merge_ranges() {
        assert_eq!(merge_ranges(vec![5..8, 0..2, 1..3, 8..9, 20..30], 25), vec![0..3, 5..9, 20..25]);
    }

    #[test]
    fn test_ledger_mismatch_is_structural() {
        let config = SrTextConfig::default();
        let extraction = extract(&text_report("one"), &config);
        let err = Redactor::new(&config)
            .redact(&text_report("two"), &extraction.ledger, &[])
            .unwrap_err();
        assert!(matches!(err, SrTextError::LedgerMismatch { .. }));
    }
}
