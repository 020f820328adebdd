// srtext-core/src/decode.rs
//! Field Decoder: turns raw field values into readable text.
//!
//! Every function here is total. Missing pieces decode to empty strings, so
//! extraction never fails on a sparse or partly anonymised document.
//!
//! License: MIT OR APACHE 2.0

use crate::document::{Dataset, Element, Value, VALUE_DELIMITER};
use crate::tags::{Keyword, Vr};

/// How a header field is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    Plain,
    PersonName,
    Date,
}

impl Decoder {
    /// The decoder a field of this VR gets when nothing more specific is known.
    pub fn for_vr(vr: Vr) -> Self {
        match vr {
            Vr::PN => Decoder::PersonName,
            Vr::DA | Vr::DT => Decoder::Date,
            _ => Decoder::Plain,
        }
    }

    pub fn decode(self, element: &Element) -> String {
        match (self, &element.value) {
            (Decoder::PersonName, value @ (Value::Names(_) | Value::Strings(_))) => value
                .string_values()
                .into_iter()
                .map(person_name)
                .collect::<Vec<_>>()
                .join(&VALUE_DELIMITER.to_string()),
            _ => element.value_text(),
        }
    }
}

/// Reorders `Family^Given^Middle^Prefix^Suffix` into reading order.
///
/// ```
/// use srtext_core::decode::person_name;
/// assert_eq!(person_name("Fukuda^Katherine M.^^^M. D."), "Katherine M. Fukuda M. D.");
/// ```
pub fn person_name(raw: &str) -> String {
    let parts: Vec<&str> = raw.split('^').collect();
    [3usize, 1, 2, 0, 4]
        .iter()
        .filter_map(|&i| parts.get(i))
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// CodeMeaning of the first item of `sequence`, or an empty string.
pub fn first_code_meaning(item: &Dataset, sequence: Keyword) -> String {
    item.items(sequence)
        .first()
        .and_then(|code| code.text(Keyword::CodeMeaning))
        .unwrap_or_default()
}

pub fn concept_name(item: &Dataset) -> String {
    first_code_meaning(item, Keyword::ConceptNameCodeSequence)
}

pub fn coded_concept(item: &Dataset) -> String {
    first_code_meaning(item, Keyword::ConceptCodeSequence)
}

/// The numeric value and unit code of the first measured value, or `None`
/// when the item has no measured value at all.
pub fn measurement_parts(item: &Dataset) -> Option<(String, String)> {
    let measured = item.items(Keyword::MeasuredValueSequence).first()?;
    let number = measured.text(Keyword::NumericValue).unwrap_or_default();
    let units = measured
        .items(Keyword::MeasurementUnitsCodeSequence)
        .first()
        .and_then(|u| u.text(Keyword::CodeValue))
        .unwrap_or_default();
    Some((number, units))
}

/// `"<number> <units>"` for a NUM item.
pub fn measurement(item: &Dataset) -> String {
    measurement_parts(item)
        .map(|(number, units)| format!("{} {}", number, units))
        .unwrap_or_default()
}

pub fn cross_reference(item: &Dataset) -> String {
    item.items(Keyword::ReferencedSOPSequence)
        .first()
        .and_then(|r| r.text(Keyword::ReferencedSOPInstanceUID))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;

    fn coded(sequence: Keyword, meaning: &str) -> Dataset {
        Dataset::new().with(Element::sequence(
            sequence,
            vec![Dataset::new().with(Element::text(Keyword::CodeMeaning, meaning))],
        ))
    }

    #[test]
    fn test_person_name_reordering() {
        assert_eq!(person_name("Walz^John"), "John Walz");
        assert_eq!(person_name("Fukuda^Katherine M.^^^M. D."), "Katherine M. Fukuda M. D.");
        assert_eq!(person_name("Dr^^^"), "Dr");
        assert_eq!(person_name(""), "");
    }

    #[test]
    fn test_decoder_joins_multiple_names() {
        let e = Element::new(
            Keyword::OtherPatientNames,
            Vr::PN,
            Value::Names(vec!["Walz^John".into(), "Doe^Jane".into()]),
        );
        assert_eq!(Decoder::PersonName.decode(&e), "John Walz\\Jane Doe");
        assert_eq!(Decoder::Plain.decode(&e), "Walz^John\\Doe^Jane");
    }

    #[test]
    fn test_dates_pass_through() {
        let e = Element::text(Keyword::StudyDate, "20050530");
        assert_eq!(Decoder::for_vr(Vr::DA).decode(&e), "20050530");
    }

    #[test]
    fn test_code_meanings() {
        assert_eq!(concept_name(&coded(Keyword::ConceptNameCodeSequence, "Finding")), "Finding");
        assert_eq!(coded_concept(&coded(Keyword::ConceptCodeSequence, "Cyst")), "Cyst");
        assert_eq!(concept_name(&Dataset::new()), "");
    }

    #[test]
    fn test_measurement_and_reference() {
        let item = Dataset::new().with(Element::sequence(
            Keyword::MeasuredValueSequence,
            vec![Dataset::new()
                .with(Element::new(Keyword::NumericValue, Vr::DS, Value::Numbers(vec![23.into()])))
                .with(Element::sequence(
                    Keyword::MeasurementUnitsCodeSequence,
                    vec![Dataset::new().with(Element::text(Keyword::CodeValue, "mm"))],
                ))],
        ));
        assert_eq!(measurement(&item), "23 mm");
        assert_eq!(measurement(&Dataset::new()), "");

        let reference = Dataset::new().with(Element::sequence(
            Keyword::ReferencedSOPSequence,
            vec![Dataset::new().with(Element::text(Keyword::ReferencedSOPInstanceUID, "1.2.3"))],
        ));
        assert_eq!(cross_reference(&reference), "1.2.3");
    }
}
