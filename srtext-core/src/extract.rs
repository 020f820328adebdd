// srtext-core/src/extract.rs
//! Extractor: renders a report as annotator-ready text and records where each
//! piece of text came from.
//!
//! The walk in [`collect_fragments`] is the single source of truth for which
//! fields produce text and in what order. Extraction lays its fragments out
//! between header lines and section markers; the redactor calls the same walk
//! again and lays the fragments out back to back, one per line, as the *body*.
//! Span offsets are body offsets unless configured otherwise, in which case
//! [`Ledger::rebase`] translates them.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, warn};
use std::collections::BTreeSet;
use std::ops::Range;

use srtext_markup::Normalizer;

use crate::config::SrTextConfig;
use crate::decode::{self, Decoder};
use crate::document::{Dataset, Element, FieldPath};
use crate::errors::{Result, SrTextError};
use crate::keys::{self, HEADER_FIELDS};
use crate::span::{loggable, Span};
use crate::tags::{Keyword, Tag, Vr};

pub const TEXT_START: &str = "[[Text]]";
pub const TEXT_END: &str = "[[EndText]]";
pub const CONTENT_START: &str = "[[ContentSequence]]";
pub const CONTENT_END: &str = "[[EndContentSequence]]";
pub const OTHER_NAMES_LABEL: &str = "Other Names";

/// How a fragment's text lines up with the raw field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMapping {
    /// `value_range` of the text is the raw value, char for char.
    Identity,
    /// The text is a decoded rendering; any redaction inside it replaces the
    /// whole raw value.
    Opaque,
}

/// One piece of emitted text and the field it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub path: FieldPath,
    pub vr: Vr,
    /// Normalized text as emitted, without its line terminator.
    pub text: String,
    /// Chars of `text` that correspond to the raw value.
    pub value_range: Range<usize>,
    pub mapping: ValueMapping,
    pub raw: String,
    /// Offset of `text` in the extracted text.
    pub extracted_offset: usize,
    /// Offset of `text` in the body buffer.
    pub body_offset: usize,
}

impl Fragment {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Body range of the fragment including its line terminator.
    pub fn body_range(&self) -> Range<usize> {
        self.body_offset..self.body_offset + self.char_len() + 1
    }

    pub fn extracted_range(&self) -> Range<usize> {
        self.extracted_offset..self.extracted_offset + self.char_len() + 1
    }
}

/// The ordered fragments of one extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    fragments: Vec<Fragment>,
}

impl Ledger {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Every fragment followed by a newline: the text span offsets refer to.
    pub fn body(&self) -> String {
        let mut body = String::new();
        for f in &self.fragments {
            body.push_str(&f.text);
            body.push('\n');
        }
        body
    }

    /// Moves a span from extracted-text coordinates into body coordinates.
    /// Spans that start outside every fragment (header lines, markers) have
    /// no body position.
    pub fn rebase(&self, span: &Span) -> Option<Span> {
        let fragment = self
            .fragments
            .iter()
            .find(|f| f.extracted_range().contains(&span.start))?;
        let delta = fragment.body_offset as isize - fragment.extracted_offset as isize;
        span.shifted(delta)
    }

    /// Fails unless `fresh` lists the same fields with the same text.
    pub fn verify(&self, fresh: &[Fragment]) -> Result<()> {
        let count = self.fragments.len().max(fresh.len());
        for index in 0..count {
            let expected = self.fragments.get(index);
            let found = fresh.get(index);
            let same = match (expected, found) {
                (Some(e), Some(f)) => e.path == f.path && e.text == f.text,
                _ => false,
            };
            if !same {
                let describe = |f: Option<&Fragment>| match f {
                    Some(f) => format!("{} = {}", f.path, loggable(&f.text)),
                    None => "<none>".to_string(),
                };
                return Err(SrTextError::LedgerMismatch {
                    index,
                    expected: describe(expected),
                    found: describe(found),
                });
            }
        }
        Ok(())
    }
}

/// Result of [`extract`].
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub ledger: Ledger,
    /// Top-level fields that are neither extracted nor deny-listed, in tag
    /// order. Tags the dictionary lacks are included.
    pub unexpected: Vec<Tag>,
}

impl Extraction {
    pub fn body(&self) -> String {
        self.ledger.body()
    }
}

/// Renders `document` as text for the annotator.
pub fn extract(document: &Dataset, config: &SrTextConfig) -> Extraction {
    let mut out = TextBuffer::default();
    let mut unexpected = Vec::new();

    if config.extract.include_header {
        for field in HEADER_FIELDS {
            if let Some(element) = document.get(field.keyword) {
                out.line(field.label, &field.decoder.decode(element));
            }
        }
        if config.extract.include_other_names {
            for name in other_names(document) {
                out.line(OTHER_NAMES_LABEL, &name);
            }
        }
        for element in document.iter() {
            let Some(tag) = keys::is_unexpected(element, &config.keys) else {
                continue;
            };
            let label = tag.label();
            let value = element.value_text();
            if config.extract.warn_unexpected_tags {
                warn!(
                    "{} unexpected field {} = '{}'",
                    if config.extract.include_unexpected_tags { "Including" } else { "Ignoring" },
                    label,
                    loggable(&value)
                );
            }
            if config.extract.include_unexpected_tags {
                out.line(&label, &value);
            }
            unexpected.push(tag);
        }
    }

    let mut fragments = collect_fragments(document, config);
    let mut pending = fragments.iter_mut().peekable();

    if document.contains(Keyword::TextValue) {
        out.push(TEXT_START);
        out.push("\n");
        if let Some(f) = pending.next_if(|f| f.path.depth() == 0) {
            f.extracted_offset = out.chars;
            out.push(&f.text);
        }
        out.push("\n");
        out.push(TEXT_END);
        out.push("\n");
    }

    if document.contains(Keyword::ContentSequence) {
        out.push(CONTENT_START);
        out.push("\n");
        for f in pending {
            f.extracted_offset = out.chars;
            out.push(&f.text);
            out.push("\n");
        }
        out.push(CONTENT_END);
        out.push("\n");
    }

    debug!(
        "Extracted {} chars in {} fragments ({} unexpected fields)",
        out.chars,
        fragments.len(),
        unexpected.len()
    );
    Extraction {
        text: out.text,
        ledger: Ledger::new(fragments),
        unexpected,
    }
}

/// The fragments of `document` in walk order, with body offsets assigned.
///
/// The free-text field comes first, then the content tree depth-first.
pub fn collect_fragments(document: &Dataset, config: &SrTextConfig) -> Vec<Fragment> {
    let mut walker = Walker::new(config);
    if let Some(element) = document.get(Keyword::TextValue) {
        walker.identity(FieldPath::root(Keyword::TextValue.tag()), element, "", "");
    }
    walker.walk_items(document.items(Keyword::ContentSequence), &[], Keyword::ContentSequence);
    walker.fragments
}

/// Distinct decoded person names anywhere in the document, sorted.
pub fn other_names(document: &Dataset) -> Vec<String> {
    let mut names = BTreeSet::new();
    document.walk(&mut |e| {
        if e.vr != Vr::PN {
            return;
        }
        for raw in e.value.string_values() {
            let name = decode::person_name(raw);
            if !name.is_empty() {
                names.insert(name);
            }
        }
    });
    names.into_iter().collect()
}

#[derive(Default)]
struct TextBuffer {
    text: String,
    chars: usize,
}

impl TextBuffer {
    fn push(&mut self, s: &str) {
        self.chars += s.chars().count();
        self.text.push_str(s);
    }

    fn line(&mut self, label: &str, value: &str) {
        let value = value.replace(|c: char| c == '\r' || c == '\n', " ");
        self.push(&format!("[[{}]] {}\n", label, value));
    }
}

struct Walker<'a> {
    config: &'a SrTextConfig,
    normalizer: Normalizer,
    fragments: Vec<Fragment>,
    body_len: usize,
}

impl<'a> Walker<'a> {
    fn new(config: &'a SrTextConfig) -> Self {
        Self {
            config,
            normalizer: Normalizer::new(config.markup.fill_char, config.markup.newline_char),
            fragments: Vec::new(),
            body_len: 0,
        }
    }

    fn emit(
        &mut self,
        path: FieldPath,
        vr: Vr,
        raw: String,
        text: String,
        value_range: Range<usize>,
        mapping: ValueMapping,
    ) {
        let text = if self.config.markup.replace_markup {
            self.normalizer.apply(&text)
        } else {
            text
        };
        let body_offset = self.body_len;
        self.body_len += text.chars().count() + 1;
        self.fragments.push(Fragment {
            path,
            vr,
            text,
            value_range,
            mapping,
            raw,
            extracted_offset: 0,
            body_offset,
        });
    }

    /// Emits `prefix + value + suffix` with the value mapped char for char.
    fn identity(&mut self, path: FieldPath, element: &Element, prefix: &str, suffix: &str) {
        let raw = element.value_text();
        let start = prefix.chars().count();
        let range = start..start + raw.chars().count();
        let text = format!("{}{}{}", prefix, raw, suffix);
        self.emit(path, element.vr, raw, text, range, ValueMapping::Identity);
    }

    fn walk_items(&mut self, items: &[Dataset], hops: &[(Tag, usize)], sequence: Keyword) {
        for (index, item) in items.iter().enumerate() {
            let mut item_hops = hops.to_vec();
            item_hops.push((sequence.tag(), index));
            self.walk_item(item, &item_hops);
        }
    }

    /// A leaf inside the first item of `sequence` within the current item.
    fn nested_leaf<'d>(
        item: &'d Dataset,
        hops: &[(Tag, usize)],
        sequence: Keyword,
        leaf: Keyword,
    ) -> Option<(FieldPath, &'d Element)> {
        let element = item.items(sequence).first()?.get(leaf)?;
        let mut path_hops = hops.to_vec();
        path_hops.push((sequence.tag(), 0));
        Some((FieldPath::new(path_hops, leaf.tag()), element))
    }

    fn direct_leaf<'d>(
        item: &'d Dataset,
        hops: &[(Tag, usize)],
        leaf: Keyword,
    ) -> Option<(FieldPath, &'d Element)> {
        let element = item.get(leaf)?;
        Some((FieldPath::new(hops.to_vec(), leaf.tag()), element))
    }

    fn walk_item(&mut self, item: &Dataset, hops: &[(Tag, usize)]) {
        if let Some((path, meaning)) =
            Self::nested_leaf(item, hops, Keyword::ConceptNameCodeSequence, Keyword::CodeMeaning)
        {
            self.identity(path, meaning, "# ", "");
        }

        let value_type = item.text(Keyword::ValueType).map(|v| v.trim().to_ascii_uppercase());
        match value_type.as_deref() {
            Some("TEXT") => self.plain(Self::direct_leaf(item, hops, Keyword::TextValue)),
            Some("DATE") => self.plain(Self::direct_leaf(item, hops, Keyword::Date)),
            Some("DATETIME") => self.plain(Self::direct_leaf(item, hops, Keyword::DateTime)),
            Some("PNAME") => {
                if let Some((path, element)) = Self::direct_leaf(item, hops, Keyword::PersonName) {
                    let text = Decoder::PersonName.decode(element);
                    let range = 0..text.chars().count();
                    self.emit(path, element.vr, element.value_text(), text, range, ValueMapping::Opaque);
                }
            }
            Some("NUM") => {
                let leaf = Self::nested_leaf(
                    item,
                    hops,
                    Keyword::MeasuredValueSequence,
                    Keyword::NumericValue,
                );
                if let (Some((path, element)), Some((_, units))) =
                    (leaf, decode::measurement_parts(item))
                {
                    self.identity(path, element, "", &format!(" {}", units));
                }
            }
            Some("CODE") => {
                if let Some((path, meaning)) =
                    Self::nested_leaf(item, hops, Keyword::ConceptCodeSequence, Keyword::CodeMeaning)
                {
                    self.identity(path, meaning, "# ", "");
                }
            }
            Some("UIDREF") if self.config.extract.include_references => {
                self.plain(Self::direct_leaf(item, hops, Keyword::UID))
            }
            Some("IMAGE") if self.config.extract.include_references => self.plain(Self::nested_leaf(
                item,
                hops,
                Keyword::ReferencedSOPSequence,
                Keyword::ReferencedSOPInstanceUID,
            )),
            Some(
                "UIDREF" | "IMAGE" | "CONTAINER" | "TIME" | "SCOORD" | "SCOORD3D" | "TCOORD"
                | "WAVEFORM" | "COMPOSITE",
            ) => {}
            Some(other) => warn!(
                "Skipping content item with unknown value type '{}' at {}",
                other,
                FieldPath::new(hops.to_vec(), Keyword::ValueType.tag())
            ),
            None => warn!(
                "Skipping content item without a value type at {}",
                FieldPath::new(hops.to_vec(), Keyword::ValueType.tag())
            ),
        }

        let nested = item.items(Keyword::ContentSequence);
        if !nested.is_empty() {
            self.walk_items(nested, hops, Keyword::ContentSequence);
        }
    }

    fn plain(&mut self, leaf: Option<(FieldPath, &Element)>) {
        if let Some((path, element)) = leaf {
            self.identity(path, element, "", "");
        }
    }
}
