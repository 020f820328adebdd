// srtext-core/src/knowtator.rs
//! Annotation Bridge for the Knowtator XML dialect spoken by the annotator.
//!
//! ```xml
//! <annotations>
//!  <annotation>
//!   <mention id="srtext-1"/>
//!   <annotator id="semehr">semehr</annotator>
//!   <span start="34" end="44"/>
//!   <spannedText>16 year old</spannedText>
//!   <creationDate>Wed November 11 13:04:51 2020</creationDate>
//!  </annotation>
//!  <classMention id="srtext-1">
//!   <mentionClass id="semehr_sensitive_info">16 year old</mentionClass>
//!  </classMention>
//! </annotations>
//! ```
//!
//! A `classMention` labels the `annotation` that precedes it.
//!
//! License: MIT OR APACHE 2.0

use chrono::Local;
use log::debug;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use std::path::Path;

use crate::errors::{Result, SrTextError};
use crate::span::{sort_spans, Concept, Span};

pub const SENSITIVE_LABEL: &str = "semehr_sensitive_info";
pub const CORRECT_LABEL: &str = "semehr_correct_annotation";
const ANNOTATOR: &str = "semehr";
const CREATION_DATE_FORMAT: &str = "%a %B %d %H:%M:%S %Y";

static CONCEPT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*)\(([^()]*)\)$").expect("concept label regex must compile"));

/// Which sentinel label unlabeled spans are written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelMode {
    /// Text that must be redacted.
    #[default]
    Sensitive,
    /// Annotations a reviewer confirmed as correct.
    Correct,
}

impl LabelMode {
    pub fn sentinel(self) -> &'static str {
        match self {
            LabelMode::Sensitive => SENSITIVE_LABEL,
            LabelMode::Correct => CORRECT_LABEL,
        }
    }
}

/// Interprets a `mentionClass` id. Sentinels carry no concept.
pub fn parse_label(label: &str) -> Option<Concept> {
    if label == SENSITIVE_LABEL || label == CORRECT_LABEL || label.is_empty() {
        return None;
    }
    match CONCEPT_LABEL.captures(label) {
        Some(caps) => Some(Concept::new(&caps[1], &caps[2])),
        None => Some(Concept::new(label, "")),
    }
}

fn invalid(e: impl std::fmt::Display) -> SrTextError {
    SrTextError::InvalidAnnotation(e.to_string())
}

#[derive(Default)]
struct PendingAnnotation {
    bounds: Option<(usize, usize)>,
    text: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Capture {
    SpannedText,
    MentionClass,
}

fn attribute(element: &BytesStart, name: &str) -> Result<Option<String>> {
    match element.try_get_attribute(name).map_err(invalid)? {
        Some(attr) => Ok(Some(attr.unescape_value().map_err(invalid)?.into_owned())),
        None => Ok(None),
    }
}

fn offset_attribute(element: &BytesStart, name: &str) -> Result<usize> {
    let value = attribute(element, name)?
        .ok_or_else(|| invalid(format!("<span> is missing the `{}` attribute", name)))?;
    value
        .trim()
        .parse()
        .map_err(|_| invalid(format!("<span {}=\"{}\"> is not an offset", name, value)))
}

/// Reads every annotation in `xml`, sorted by start offset.
pub fn to_spans(xml: &str) -> Result<Vec<Span>> {
    let mut reader = Reader::from_str(xml);
    let mut spans: Vec<Span> = Vec::new();
    let mut seen_root = false;
    let mut annotation: Option<PendingAnnotation> = None;
    let mut capture: Option<(Capture, String)> = None;
    let mut label: Option<String> = None;

    loop {
        let event = reader.read_event()?;
        let (element, closes) = match &event {
            Event::Start(e) => (Some(e.clone()), false),
            Event::Empty(e) => (Some(e.clone()), true),
            _ => (None, false),
        };

        if let Some(element) = element {
            let name = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
            if !seen_root {
                if name != "annotations" {
                    return Err(invalid(format!("expected <annotations>, found <{}>", name)));
                }
                seen_root = true;
                continue;
            }
            match name.as_str() {
                "annotation" => annotation = Some(PendingAnnotation::default()),
                "span" => {
                    if let Some(pending) = annotation.as_mut() {
                        let start = offset_attribute(&element, "start")?;
                        let end = offset_attribute(&element, "end")?;
                        if start > end {
                            return Err(invalid(format!("span start {} is after end {}", start, end)));
                        }
                        pending.bounds = Some((start, end));
                    }
                }
                "spannedText" if annotation.is_some() => {
                    capture = Some((Capture::SpannedText, String::new()));
                }
                "mentionClass" => {
                    label = attribute(&element, "id")?;
                    capture = Some((Capture::MentionClass, String::new()));
                }
                _ => {}
            }
            if closes {
                finish(&name, &mut annotation, &mut capture, &mut label, &mut spans)?;
            }
            continue;
        }

        match event {
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                finish(&name, &mut annotation, &mut capture, &mut label, &mut spans)?;
            }
            Event::Text(t) => {
                if let Some((_, buf)) = capture.as_mut() {
                    buf.push_str(&t.decode().map_err(invalid)?);
                }
            }
            Event::CData(c) => {
                if let Some((_, buf)) = capture.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::GeneralRef(r) => {
                if let Some((_, buf)) = capture.as_mut() {
                    match r.resolve_char_ref().map_err(invalid)? {
                        Some(ch) => buf.push(ch),
                        None => {
                            let entity = r.decode().map_err(invalid)?;
                            let resolved = quick_xml::escape::resolve_predefined_entity(&entity)
                                .ok_or_else(|| invalid(format!("unknown entity &{};", entity)))?;
                            buf.push_str(resolved);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(invalid("document has no <annotations> element"));
    }
    if annotation.is_some() {
        return Err(invalid("unterminated <annotation>"));
    }
    sort_spans(&mut spans);
    debug!("Read {} annotations", spans.len());
    Ok(spans)
}

fn finish(
    name: &str,
    annotation: &mut Option<PendingAnnotation>,
    capture: &mut Option<(Capture, String)>,
    label: &mut Option<String>,
    spans: &mut Vec<Span>,
) -> Result<()> {
    match name {
        "spannedText" => {
            if let (Some((Capture::SpannedText, text)), Some(pending)) = (capture.take(), annotation.as_mut()) {
                pending.text = text;
            }
        }
        "mentionClass" => {
            capture.take();
        }
        "annotation" => {
            if let Some(pending) = annotation.take() {
                let (start, end) = pending
                    .bounds
                    .ok_or_else(|| invalid("<annotation> without a <span>"))?;
                spans.push(Span::new(start, end, pending.text));
            }
        }
        "classMention" => {
            if let (Some(id), Some(last)) = (label.take(), spans.last_mut()) {
                last.concept = parse_label(&id);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Writes `spans` in the annotator's dialect, sorted by start.
pub fn from_spans(spans: &[Span], mode: LabelMode) -> Result<String> {
    write_annotations(spans, mode, None)
}

/// Like [`from_spans`], recording the annotated file as `textSource`.
pub fn write_annotations(spans: &[Span], mode: LabelMode, text_source: Option<&str>) -> Result<String> {
    let mut sorted = spans.to_vec();
    sort_spans(&mut sorted);
    let created = Local::now().format(CREATION_DATE_FORMAT).to_string();
    let id_prefix = text_source.unwrap_or("srtext");

    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 1);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("annotations");
    if let Some(source) = text_source {
        root.push_attribute(("textSource", source));
    }
    if sorted.is_empty() {
        xml.write_event(Event::Empty(root))?;
    } else {
        xml.write_event(Event::Start(root))?;
        for (i, span) in sorted.iter().enumerate() {
            let id = format!("{}-{}", id_prefix, i + 1);
            let label = match &span.concept {
                Some(concept) => concept.to_string(),
                None => mode.sentinel().to_string(),
            };

            xml.write_event(Event::Start(BytesStart::new("annotation")))?;
            let mut mention = BytesStart::new("mention");
            mention.push_attribute(("id", id.as_str()));
            xml.write_event(Event::Empty(mention))?;
            text_element(&mut xml, "annotator", Some(("id", ANNOTATOR)), ANNOTATOR)?;
            let mut bounds = BytesStart::new("span");
            bounds.push_attribute(("start", span.start.to_string().as_str()));
            bounds.push_attribute(("end", span.end.to_string().as_str()));
            xml.write_event(Event::Empty(bounds))?;
            text_element(&mut xml, "spannedText", None, &span.text)?;
            text_element(&mut xml, "creationDate", None, &created)?;
            xml.write_event(Event::End(BytesEnd::new("annotation")))?;

            let mut class_mention = BytesStart::new("classMention");
            class_mention.push_attribute(("id", id.as_str()));
            xml.write_event(Event::Start(class_mention))?;
            text_element(&mut xml, "mentionClass", Some(("id", label.as_str())), &span.text)?;
            xml.write_event(Event::End(BytesEnd::new("classMention")))?;
        }
        xml.write_event(Event::End(BytesEnd::new("annotations")))?;
    }

    let mut out = String::from_utf8(xml.into_inner()).map_err(invalid)?;
    out.push('\n');
    Ok(out)
}

fn text_element(
    xml: &mut Writer<Vec<u8>>,
    name: &str,
    attr: Option<(&str, &str)>,
    text: &str,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    if let Some(attr) = attr {
        start.push_attribute(attr);
    }
    xml.write_event(Event::Start(start))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub fn read_spans_file<P: AsRef<Path>>(path: P) -> Result<Vec<Span>> {
    let xml = std::fs::read_to_string(path.as_ref())?;
    to_spans(&xml)
}

pub fn write_spans_file<P: AsRef<Path>>(path: P, spans: &[Span], mode: LabelMode) -> Result<()> {
    let source = path.as_ref().file_name().and_then(|n| n.to_str()).map(str::to_string);
    let xml = write_annotations(spans, mode, source.as_deref())?;
    std::fs::write(path.as_ref(), xml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" ?>
<annotations>
 <annotation>
  <mention id="filename-1"/>
  <annotator id="filename-1">semehr</annotator>
  <span end="17" start="15"/>
  <spannedText>nonsense</spannedText>
  <creationDate>Wed November 11 13:04:51 2020</creationDate>
 </annotation>
 <classMention id="filename-1">
  <mentionClass id="semehr_sensitive_info">nonsense</mentionClass>
 </classMention>
 <annotation>
  <mention id="filename-2"/>
  <span end="7" start="5"/>
  <spannedText>stuff</spannedText>
 </annotation>
 <classMention id="filename-2">
  <mentionClass id="Cyst(C0010709)">stuff</mentionClass>
 </classMention>
</annotations>
"#;

    #[test]
    fn test_reads_sample_sorted_with_labels() {
        let spans = to_spans(SAMPLE).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end, spans[0].text.as_str()), (5, 7, "stuff"));
        assert_eq!(spans[0].concept, Some(Concept::new("Cyst", "C0010709")));
        assert_eq!((spans[1].start, spans[1].text.as_str()), (15, "nonsense"));
        assert_eq!(spans[1].concept, None);
    }

    #[test]
    fn test_round_trip_unlabeled_and_labeled() {
        let plain = vec![Span::new(0, 3, "Tom"), Span::new(10, 25, "a < b & \"c\" 'd'")];
        assert_eq!(to_spans(&from_spans(&plain, LabelMode::Sensitive).unwrap()).unwrap(), plain);

        let labeled = vec![
            Span::new(2, 6, "Leeds").with_concept(Concept::new("Location", "L1")),
            Span::new(8, 9, "x").with_concept(Concept::new("Thing (general)", "T-9")),
        ];
        assert_eq!(to_spans(&from_spans(&labeled, LabelMode::Correct).unwrap()).unwrap(), labeled);
    }

    #[test]
    fn test_writer_layout() {
        let xml = from_spans(&[Span::new(5, 7, "stuff")], LabelMode::Correct).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains("<span start=\"5\" end=\"7\"/>"));
        assert!(xml.contains("<mentionClass id=\"semehr_correct_annotation\">stuff</mentionClass>"));
        assert!(xml.contains("<creationDate>"));
    }

    #[test]
    fn test_empty_list_round_trip() {
        let xml = from_spans(&[], LabelMode::Sensitive).unwrap();
        assert!(xml.contains("<annotations/>"));
        assert!(to_spans(&xml).unwrap().is_empty());
        assert!(to_spans("<annotations></annotations>").unwrap().is_empty());
    }

    #[test]
    fn test_empty_spanned_text() {
        let spans = to_spans(r#"<annotations><annotation><span start="3" end="3"/><spannedText/></annotation></annotations>"#).unwrap();
        assert_eq!(spans, vec![Span::new(3, 3, "")]);
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(to_spans("<annotations><annotation>"), Err(_)));
        assert!(matches!(to_spans("<other/>"), Err(SrTextError::InvalidAnnotation(_))));
        assert!(matches!(
            to_spans(r#"<annotations><annotation><span start="9" end="2"/></annotation></annotations>"#),
            Err(SrTextError::InvalidAnnotation(_))
        ));
        assert!(matches!(
            to_spans(r#"<annotations><annotation><span start="x" end="2"/></annotation></annotations>"#),
            Err(SrTextError::InvalidAnnotation(_))
        ));
        assert!(matches!(
            to_spans(r#"<annotations><annotation><spannedText>a</spannedText></annotation></annotations>"#),
            Err(SrTextError::InvalidAnnotation(_))
        ));
        assert!(to_spans("").is_err());
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label(SENSITIVE_LABEL), None);
        assert_eq!(parse_label(CORRECT_LABEL), None);
        assert_eq!(parse_label("Cyst(C0010709)"), Some(Concept::new("Cyst", "C0010709")));
        assert_eq!(parse_label("Thing (general)(T-9)"), Some(Concept::new("Thing (general)", "T-9")));
    }
}
