// srtext-core/src/patterns.rs
//! Offline pattern annotator.
//!
//! Compiles the named regexes from `annotate.patterns` (plus any supplied on
//! the command line) and turns their matches into [`Span`]s with character
//! offsets, ready to be written as Knowtator XML. Also hosts
//! [`apply_spans`], which blanks spans in plain text.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::config::{AnnotateConfig, PatternRule, MAX_PATTERN_LENGTH};
use crate::errors::{Result, SrTextError};
use crate::span::{sort_spans, Span};

const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

#[derive(Debug)]
pub struct CompiledPattern {
    pub name: String,
    pub regex: Regex,
}

#[derive(Debug, Default)]
pub struct PatternAnnotator {
    patterns: Vec<CompiledPattern>,
}

impl PatternAnnotator {
    /// Compiles every rule, reporting all failures together.
    pub fn compile(rules: &[PatternRule]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(rules.len());
        let mut errors = Vec::new();

        for rule in rules {
            if rule.pattern.len() > MAX_PATTERN_LENGTH {
                errors.push(format!(
                    "Pattern '{}' is {} characters long, the maximum is {}.",
                    rule.name,
                    rule.pattern.len(),
                    MAX_PATTERN_LENGTH
                ));
                continue;
            }
            let built = RegexBuilder::new(&rule.pattern)
                .case_insensitive(rule.case_insensitive)
                .multi_line(rule.multiline)
                .dot_matches_new_line(rule.dot_matches_new_line)
                .size_limit(REGEX_SIZE_LIMIT)
                .build();
            match built {
                Ok(regex) => {
                    debug!("Pattern '{}' compiled.", rule.name);
                    patterns.push(CompiledPattern {
                        name: rule.name.clone(),
                        regex,
                    });
                }
                Err(e) => errors.push(format!("Pattern '{}' failed to compile: {}", rule.name, e)),
            }
        }

        if errors.is_empty() {
            Ok(Self { patterns })
        } else {
            Err(SrTextError::Config(errors.join("\n")))
        }
    }

    pub fn from_config(config: &AnnotateConfig) -> Result<Self> {
        Self::compile(&config.patterns)
    }

    pub fn names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Every non-empty match of every pattern, sorted by start. A range
    /// matched by several patterns is reported once.
    pub fn annotate(&self, text: &str) -> Vec<Span> {
        let boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        let to_char = |byte: usize| boundaries.partition_point(|&b| b < byte);

        let mut spans = Vec::new();
        for pattern in &self.patterns {
            let before = spans.len();
            for m in pattern.regex.find_iter(text) {
                if m.start() == m.end() {
                    continue;
                }
                spans.push(Span::new(to_char(m.start()), to_char(m.end()), m.as_str()));
            }
            debug!("Pattern '{}' matched {} times.", pattern.name, spans.len() - before);
        }
        sort_spans(&mut spans);
        spans.dedup_by(|a, b| a.start == b.start && a.end == b.end);
        spans
    }
}

/// Overwrites each span's characters with `fill`. Offsets past the end of
/// `text` are clipped; the result always has the same character count.
pub fn apply_spans(text: &str, spans: &[Span], fill: char) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    for span in spans {
        let end = span.end.min(len);
        if span.start < end {
            chars[span.start..end].iter_mut().for_each(|c| *c = fill);
        }
    }
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SrTextConfig;

    #[test]
    fn test_char_offsets_after_multibyte_text() {
        let annotator = PatternAnnotator::compile(&[PatternRule::new("leeds", "Leeds")]).unwrap();
        let spans = annotator.annotate("Zoë in Leeds");
        assert_eq!(spans, vec![Span::new(7, 12, "Leeds")]);
    }

    #[test]
    fn test_overlapping_patterns_sorted_and_deduplicated() {
        let rules = vec![
            PatternRule::new("word", r"\bcyst\b"),
            PatternRule::new("any", "cyst|patient"),
        ];
        let spans = PatternAnnotator::compile(&rules).unwrap().annotate("The patient has a cyst.");
        assert_eq!(spans, vec![Span::new(4, 11, "patient"), Span::new(18, 22, "cyst")]);
    }

    #[test]
    fn test_case_insensitive_flag() {
        let mut rule = PatternRule::new("dr", "dr [a-z]+");
        rule.case_insensitive = true;
        let spans = PatternAnnotator::compile(&[rule]).unwrap().annotate("Seen by Dr Who");
        assert_eq!(spans, vec![Span::new(8, 14, "Dr Who")]);
    }

    #[test]
    fn test_compile_errors_are_collected() {
        let rules = vec![
            PatternRule::new("bad", "(unclosed"),
            PatternRule::new("long", "a".repeat(MAX_PATTERN_LENGTH + 1)),
        ];
        match PatternAnnotator::compile(&rules) {
            Err(SrTextError::Config(msg)) => {
                assert!(msg.contains("'bad'"));
                assert!(msg.contains("'long'"));
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_patterns_find_nhs_number_and_email() {
        let config = SrTextConfig::load_default().unwrap();
        let annotator = PatternAnnotator::from_config(&config.annotate).unwrap();
        let text = "NHS 943 476 5919, contact jo@example.org";
        let found: Vec<String> = annotator.annotate(text).into_iter().map(|s| s.text).collect();
        assert!(found.iter().any(|t| t == "943 476 5919"));
        assert!(found.iter().any(|t| t == "jo@example.org"));
    }

    #[test]
    fn test_apply_spans() {
        let spans = vec![Span::new(4, 11, "patient"), Span::new(20, 99, "st.")];
        assert_eq!(apply_spans("The patient has a cyst.", &spans, 'X'), "The XXXXXXX has a cyXXX");
        assert_eq!(apply_spans("abc", &[Span::new(5, 7, "")], 'X'), "abc");
    }
}
