// srtext-core/src/document/mod.rs
//! The in-memory report tree.
//!
//! A [`Dataset`] is an ordered map from [`Tag`] to [`Element`]; sequence
//! elements hold nested datasets. Iteration is always in ascending tag order,
//! which makes every walk over the same instance visit fields in the same
//! order.
//!
//! License: MIT OR APACHE 2.0

pub mod json;
pub mod path;

use std::collections::BTreeMap;

use crate::tags::{Keyword, Tag, Vr};

pub use path::FieldPath;

/// Multi-valued strings are joined with this delimiter when rendered as text.
pub const VALUE_DELIMITER: char = '\\';

/// The value held by one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Strings(Vec<String>),
    /// Person names, one per value.
    Names(Vec<PersonName>),
    Numbers(Vec<serde_json::Number>),
    Items(Vec<Dataset>),
    InlineBinary(String),
    BulkDataUri(String),
}

impl Value {
    /// The textual values, one entry per value. Person names contribute
    /// their alphabetic group.
    pub fn string_values(&self) -> Vec<&str> {
        match self {
            Value::Strings(v) => v.iter().map(String::as_str).collect(),
            Value::Names(v) => v.iter().map(|n| n.alphabetic.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// One person name value in `Family^Given^Middle^Prefix^Suffix` form, with
/// the optional ideographic and phonetic spellings carried alongside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonName {
    pub alphabetic: String,
    pub ideographic: Option<String>,
    pub phonetic: Option<String>,
}

impl PersonName {
    pub fn new(alphabetic: impl Into<String>) -> Self {
        Self {
            alphabetic: alphabetic.into(),
            ..Self::default()
        }
    }

    /// Every group present, alphabetic first.
    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut String> {
        std::iter::once(&mut self.alphabetic)
            .chain(self.ideographic.as_mut())
            .chain(self.phonetic.as_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.alphabetic.is_empty()
            && self.ideographic.as_deref().map_or(true, str::is_empty)
            && self.phonetic.as_deref().map_or(true, str::is_empty)
    }
}

impl From<&str> for PersonName {
    fn from(alphabetic: &str) -> Self {
        Self::new(alphabetic)
    }
}

impl From<String> for PersonName {
    fn from(alphabetic: String) -> Self {
        Self::new(alphabetic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub vr: Vr,
    pub value: Value,
}

impl Element {
    pub fn new(tag: impl Into<Tag>, vr: Vr, value: Value) -> Self {
        Self {
            tag: tag.into(),
            vr,
            value,
        }
    }

    /// A single-valued text element.
    pub fn text(keyword: Keyword, value: impl Into<String>) -> Self {
        let value = value.into();
        let value = match keyword.vr() {
            Vr::PN => Value::Names(vec![PersonName::new(value)]),
            _ => Value::Strings(vec![value]),
        };
        Self::new(keyword, keyword.vr(), value)
    }

    pub fn sequence(keyword: Keyword, items: Vec<Dataset>) -> Self {
        Self::new(keyword, Vr::SQ, Value::Items(items))
    }

    pub fn keyword(&self) -> Option<Keyword> {
        self.tag.keyword()
    }

    /// The value rendered as one string. Multiple values are joined with `\`;
    /// sequences and binary payloads render as nothing.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::Strings(_) | Value::Names(_) => self.value.string_values().join(&VALUE_DELIMITER.to_string()),
            Value::Numbers(v) => v
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(&VALUE_DELIMITER.to_string()),
            _ => String::new(),
        }
    }

    /// Replaces a textual value with `text`, split back into values on `\`.
    ///
    /// Numeric elements stay numeric when every part still parses as a
    /// number; otherwise they fall back to string values. A person name whose
    /// alphabetic group changes loses its ideographic and phonetic groups,
    /// which spell the same name.
    pub fn set_value_text(&mut self, text: &str) {
        let parts: Vec<String> = text.split(VALUE_DELIMITER).map(str::to_string).collect();
        self.value = match &self.value {
            Value::Names(old) => Value::Names(
                parts
                    .into_iter()
                    .enumerate()
                    .map(|(i, part)| match old.get(i) {
                        Some(name) if name.alphabetic == part => name.clone(),
                        _ => PersonName::new(part),
                    })
                    .collect(),
            ),
            Value::Numbers(_) | Value::Empty if self.vr.is_json_number() => {
                let numbers: Option<Vec<serde_json::Number>> =
                    parts.iter().map(|p| parse_number(p)).collect();
                match numbers {
                    Some(n) => Value::Numbers(n),
                    None => Value::Strings(parts),
                }
            }
            _ if self.vr == Vr::PN => Value::Names(parts.into_iter().map(PersonName::new).collect()),
            _ => Value::Strings(parts),
        };
    }

    pub fn items(&self) -> &[Dataset] {
        match &self.value {
            Value::Items(items) => items,
            _ => &[],
        }
    }

    pub fn items_mut(&mut self) -> Option<&mut Vec<Dataset>> {
        match &mut self.value {
            Value::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.value {
            Value::Empty => true,
            Value::Strings(v) => v.iter().all(String::is_empty),
            Value::Names(v) => v.iter().all(PersonName::is_empty),
            Value::Numbers(v) => v.is_empty(),
            Value::Items(v) => v.is_empty(),
            Value::InlineBinary(s) | Value::BulkDataUri(s) => s.is_empty(),
        }
    }
}

fn parse_number(text: &str) -> Option<serde_json::Number> {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(i.into());
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return Some(u.into());
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
}

/// An ordered collection of elements; one level of the report tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    elements: BTreeMap<Tag, Element>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, element: Element) -> Option<Element> {
        self.elements.insert(element.tag, element)
    }

    pub fn with(mut self, element: Element) -> Self {
        self.insert(element);
        self
    }

    pub fn remove(&mut self, tag: impl Into<Tag>) -> Option<Element> {
        self.elements.remove(&tag.into())
    }

    pub fn get(&self, tag: impl Into<Tag>) -> Option<&Element> {
        self.elements.get(&tag.into())
    }

    pub fn get_mut(&mut self, tag: impl Into<Tag>) -> Option<&mut Element> {
        self.elements.get_mut(&tag.into())
    }

    pub fn contains(&self, tag: impl Into<Tag>) -> bool {
        self.elements.contains_key(&tag.into())
    }

    /// Text of a field, or `None` when it is absent.
    pub fn text(&self, tag: impl Into<Tag>) -> Option<String> {
        self.get(tag).map(Element::value_text)
    }

    /// Like [`Dataset::text`] but for callers that cannot continue without it.
    pub fn require_text(&self, keyword: Keyword) -> crate::errors::Result<String> {
        self.text(keyword)
            .ok_or_else(|| crate::errors::SrTextError::MissingField(keyword.name().to_string()))
    }

    pub fn items(&self, tag: impl Into<Tag>) -> &[Dataset] {
        self.get(tag).map(Element::items).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Visits every element depth-first, items in order.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        for element in self.elements.values() {
            visit(element);
            for item in element.items() {
                item.walk(visit);
            }
        }
    }

    /// Mutable depth-first visit; the callback sees a sequence element before
    /// its items.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut Element)) {
        for element in self.elements.values_mut() {
            visit(element);
            if let Some(items) = element.items_mut() {
                for item in items.iter_mut() {
                    item.walk_mut(visit);
                }
            }
        }
    }

    pub fn element_at(&self, path: &FieldPath) -> Option<&Element> {
        let mut current = self;
        for (sequence, index) in path.hops() {
            current = current.items(*sequence).get(*index)?;
        }
        current.get(path.leaf())
    }

    pub fn element_at_mut(&mut self, path: &FieldPath) -> Option<&mut Element> {
        let mut current = self;
        for (sequence, index) in path.hops() {
            current = current.get_mut(*sequence)?.items_mut()?.get_mut(*index)?;
        }
        current.get_mut(path.leaf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(meaning: &str, text: &str) -> Dataset {
        Dataset::new()
            .with(Element::sequence(
                Keyword::ConceptNameCodeSequence,
                vec![Dataset::new().with(Element::text(Keyword::CodeMeaning, meaning))],
            ))
            .with(Element::text(Keyword::TextValue, text))
    }

    #[test]
    fn test_iteration_is_in_tag_order() {
        let ds = Dataset::new()
            .with(Element::text(Keyword::PatientName, "Walz^John"))
            .with(Element::text(Keyword::StudyDate, "20050530"));
        let tags: Vec<Tag> = ds.iter().map(|e| e.tag).collect();
        assert_eq!(tags, vec![Keyword::StudyDate.tag(), Keyword::PatientName.tag()]);
    }

    #[test]
    fn test_path_lookup_reaches_nested_items() {
        let ds = Dataset::new().with(Element::sequence(
            Keyword::ContentSequence,
            vec![item("History", "first"), item("Finding", "second")],
        ));
        let path = FieldPath::root(Keyword::ContentSequence.tag())
            .item(1)
            .then(Keyword::TextValue.tag());
        assert_eq!(ds.element_at(&path).map(Element::value_text), Some("second".to_string()));
    }

    #[test]
    fn test_set_value_text_keeps_numbers_numeric() {
        let mut e = Element::new(Keyword::NumericValue, Vr::DS, Value::Numbers(vec![23.into()]));
        e.set_value_text("99");
        assert_eq!(e.value, Value::Numbers(vec![99.into()]));
        e.set_value_text("X9");
        assert_eq!(e.value, Value::Strings(vec!["X9".to_string()]));
    }

    #[test]
    fn test_multi_values_join_and_split() {
        let mut e = Element::new(
            Keyword::OtherPatientIDs,
            Vr::LO,
            Value::Strings(vec!["A1".into(), "B2".into()]),
        );
        assert_eq!(e.value_text(), "A1\\B2");
        e.set_value_text("XX\\B2");
        assert_eq!(e.value, Value::Strings(vec!["XX".into(), "B2".into()]));
    }

    #[test]
    fn test_name_groups_follow_the_alphabetic_value() {
        let walz = PersonName {
            alphabetic: "Walz^John".into(),
            ideographic: Some("ワルツ^ジョン".into()),
            phonetic: None,
        };
        let mut e = Element::new(Keyword::PatientName, Vr::PN, Value::Names(vec![walz.clone(), "Doe^Jane".into()]));
        assert_eq!(e.value_text(), "Walz^John\\Doe^Jane");

        e.set_value_text("Walz^John\\XXXXXXXX");
        assert_eq!(e.value, Value::Names(vec![walz, "XXXXXXXX".into()]));
        e.set_value_text("XXXXXXXXX\\XXXXXXXX");
        assert_eq!(e.value, Value::Names(vec!["XXXXXXXXX".into(), "XXXXXXXX".into()]));
        assert!(PersonName::default().is_empty());
    }

    #[test]
    fn test_walk_visits_nested_elements() {
        let ds = Dataset::new().with(Element::sequence(
            Keyword::ContentSequence,
            vec![item("History", "first")],
        ));
        let mut seen = Vec::new();
        ds.walk(&mut |e| seen.push(e.tag));
        assert_eq!(
            seen,
            vec![
                Keyword::ContentSequence.tag(),
                Keyword::ConceptNameCodeSequence.tag(),
                Keyword::CodeMeaning.tag(),
                Keyword::TextValue.tag(),
            ]
        );
    }

    #[test]
    fn test_require_text_reports_missing_field() {
        let ds = Dataset::new();
        let err = ds.require_text(Keyword::SOPInstanceUID).unwrap_err();
        assert!(err.to_string().contains("SOPInstanceUID"));
    }
}
