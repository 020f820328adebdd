// srtext-core/src/keys.rs
//! Which top-level fields become header lines, and which are reported as
//! unexpected.
//!
//! License: MIT OR APACHE 2.0

use crate::config::KeysConfig;
use crate::decode::Decoder;
use crate::document::Element;
use crate::tags::{Keyword, Tag};

/// One allow-listed header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderField {
    pub label: &'static str,
    pub keyword: Keyword,
    pub decoder: Decoder,
}

const fn field(label: &'static str, keyword: Keyword, decoder: Decoder) -> HeaderField {
    HeaderField {
        label,
        keyword,
        decoder,
    }
}

/// Header fields in output order.
pub const HEADER_FIELDS: &[HeaderField] = &[
    field("Study Description", Keyword::StudyDescription, Decoder::Plain),
    field("Study Date", Keyword::StudyDate, Decoder::Date),
    field("Series Description", Keyword::SeriesDescription, Decoder::Plain),
    field("Series Date", Keyword::SeriesDate, Decoder::Date),
    field(
        "Performed Procedure Step Description",
        Keyword::PerformedProcedureStepDescription,
        Decoder::Plain,
    ),
    field("ProtocolName", Keyword::ProtocolName, Decoder::Plain),
    field("StudyComments", Keyword::StudyComments, Decoder::Plain),
    field("Content Date", Keyword::ContentDate, Decoder::Date),
    field("Patient ID", Keyword::PatientID, Decoder::Plain),
    field("Patient Name", Keyword::PatientName, Decoder::PersonName),
    field("Patient Birth Date", Keyword::PatientBirthDate, Decoder::Date),
    field("Patient Sex", Keyword::PatientSex, Decoder::Plain),
    field("Patient Age", Keyword::PatientAge, Decoder::Plain),
    field("Patient Weight", Keyword::PatientWeight, Decoder::Plain),
    field("Medical Alerts", Keyword::MedicalAlerts, Decoder::Plain),
    field("Allergies", Keyword::Allergies, Decoder::Plain),
    field("Ethnic Group", Keyword::EthnicGroup, Decoder::Plain),
    field(
        "Referring Physician Name",
        Keyword::ReferringPhysicianName,
        Decoder::PersonName,
    ),
];

/// Fields handled by dedicated extraction steps rather than the header.
pub const BODY_FIELDS: &[Keyword] = &[Keyword::TextValue, Keyword::ContentSequence];

pub fn is_allow_listed(keyword: Keyword) -> bool {
    HEADER_FIELDS.iter().any(|f| f.keyword == keyword) || BODY_FIELDS.contains(&keyword)
}

/// A top-level field that nothing extracts and nothing explicitly ignores.
///
/// Sequences, private tags and group lengths are never reported; the
/// allow-list wins over the deny-list. A standard tag missing from the
/// dictionary can be on neither list, so it is always reported.
pub fn is_unexpected(element: &Element, keys: &KeysConfig) -> Option<Tag> {
    let tag: Tag = element.tag;
    if element.vr == crate::tags::Vr::SQ || tag.is_private() || tag.is_group_length() {
        return None;
    }
    match tag.keyword() {
        Some(keyword) if is_allow_listed(keyword) || keys.is_denied(keyword) => None,
        _ => Some(tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Value;
    use crate::tags::Vr;

    fn deny(keys: &[&str]) -> KeysConfig {
        KeysConfig {
            deny: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn test_allow_list_order_and_labels() {
        assert_eq!(HEADER_FIELDS.len(), 18);
        assert_eq!(HEADER_FIELDS[0].label, "Study Description");
        assert_eq!(HEADER_FIELDS[9].decoder, Decoder::PersonName);
        assert!(is_allow_listed(Keyword::TextValue));
    }

    #[test]
    fn test_unexpected_classification() {
        let keys = deny(&["Modality", "ReferringPhysicianName"]);
        let modality = Element::text(Keyword::Modality, "SR");
        let comments = Element::text(Keyword::ImageComments, "note");
        let physician = Element::text(Keyword::ReferringPhysicianName, "Who^Dr");
        let private = Element::new(Tag::new(0x0029, 0x1010), Vr::LO, Value::Strings(vec!["x".into()]));
        let sequence = Element::sequence(Keyword::ReferencedStudySequence, vec![]);

        assert_eq!(is_unexpected(&modality, &keys), None);
        assert_eq!(is_unexpected(&comments, &keys), Some(Keyword::ImageComments.tag()));
        assert_eq!(is_unexpected(&physician, &keys), None);
        assert_eq!(is_unexpected(&private, &keys), None);
        assert_eq!(is_unexpected(&sequence, &keys), None);
    }

    #[test]
    fn test_tags_outside_the_dictionary_are_unexpected() {
        let keys = deny(&["Modality"]);
        let view_position = Element::new(Tag::new(0x0018, 0x5101), Vr::CS, Value::Strings(vec!["PA".into()]));
        let group_length = Element::new(Tag::new(0x0018, 0x0000), Vr::UL, Value::Numbers(vec![4.into()]));
        assert_eq!(is_unexpected(&view_position, &keys), Some(Tag::new(0x0018, 0x5101)));
        assert_eq!(is_unexpected(&group_length, &keys), None);
    }
}
