// srtext-core/tests/redaction_scenarios.rs
use anyhow::Result;
use test_log::test;

use srtext_core::document::Value;
use srtext_core::{
    extract, from_spans, headless_redact_files, sweep, to_spans, write_back, Dataset, Element,
    HeadlessEngineType, Keyword, LabelMode, Redactor, Span, SrTextConfig, Vr,
};

fn scenario_report() -> Dataset {
    Dataset::new()
        .with(Element::text(Keyword::StudyDate, "20050530"))
        .with(Element::text(Keyword::PatientName, "Walz^John"))
        .with(Element::text(Keyword::TextValue, "The patient has a cyst."))
}

fn content_item(value_type: &str, meaning: &str) -> Dataset {
    Dataset::new()
        .with(Element::text(Keyword::ValueType, value_type))
        .with(Element::sequence(
            Keyword::ConceptNameCodeSequence,
            vec![Dataset::new().with(Element::text(Keyword::CodeMeaning, meaning))],
        ))
}

#[test]
fn extraction_redaction_and_write_back_of_a_simple_report() -> Result<()> {
    let config = SrTextConfig::load_default()?;
    let report = scenario_report();

    let extraction = extract(&report, &config);
    assert!(extraction.text.contains("[[Study Date]] 20050530\n"));
    assert!(extraction.text.contains("[[Patient Name]] John Walz\n"));
    assert!(extraction.text.contains("[[Text]]\nThe patient has a cyst.\n[[EndText]]"));

    let spans = vec![Span::new(4, 11, "patient")];
    let result = Redactor::new(&config).redact(&report, &extraction.ledger, &spans)?;
    assert!(result.is_success());
    assert_eq!(result.redacted_body, "The XXXXXXX has a cyst.\n");

    let written = write_back(&report, &result.document);
    assert_eq!(written.text(Keyword::TextValue).as_deref(), Some("The XXXXXXX has a cyst."));
    let name = written.text(Keyword::PatientName).unwrap_or_default();
    assert_eq!(name.chars().count(), "Walz^John".chars().count());
    assert!(name.chars().all(|c| c == 'X'));
    Ok(())
}

#[test]
fn markup_drift_is_recovered() -> Result<()> {
    let config = SrTextConfig::load_default()?;
    let report = Dataset::new().with(Element::text(Keyword::TextValue, "Seen <BR>today by Dr Who."));
    let extraction = extract(&report, &config);
    assert_eq!(extraction.body(), "Seen ....today by Dr Who.\n");

    let result = Redactor::new(&config).redact(&report, &extraction.ledger, &[Span::new(17, 20, "Who")])?;
    assert!(result.is_success());
    assert_eq!(result.resolved[0].delta, 4);
    assert_eq!(
        result.document.text(Keyword::TextValue).as_deref(),
        Some("Seen <BR>today by Dr XXX.")
    );
    Ok(())
}

#[test]
fn drift_from_a_tag_right_before_the_word_is_recovered() -> Result<()> {
    let config = SrTextConfig::load_default()?;
    let report = Dataset::new().with(Element::text(Keyword::TextValue, "Seen by <BR>Dr Who today."));
    let extraction = extract(&report, &config);
    assert_eq!(extraction.body(), "Seen by ....Dr Who today.\n");

    // The annotator saw "Seen by Dr Who today." and put "Dr" at 8.
    let result = Redactor::new(&config).redact(&report, &extraction.ledger, &[Span::new(8, 10, "Dr")])?;
    assert!(result.is_success());
    assert_eq!(result.resolved[0].delta, 4);
    assert_eq!(
        result.document.text(Keyword::TextValue).as_deref(),
        Some("Seen by <BR>XX Who today.")
    );
    Ok(())
}

#[test]
fn drift_from_a_script_block_is_recovered() -> Result<()> {
    let config = SrTextConfig::load_default()?;
    let report = Dataset::new().with(Element::text(
        Keyword::TextValue,
        "<script>var a=1;</script>Dr Who attended.",
    ));
    let extraction = extract(&report, &config);
    assert_eq!(extraction.body(), format!("{}Dr Who attended.\n", ".".repeat(25)));

    let result = Redactor::new(&config).redact(&report, &extraction.ledger, &[Span::new(3, 6, "Who")])?;
    assert!(result.is_success());
    assert_eq!(result.resolved[0].delta, 25);
    assert_eq!(
        result.document.text(Keyword::TextValue).as_deref(),
        Some("<script>var a=1;</script>Dr XXX attended.")
    );
    Ok(())
}

#[test]
fn unterminated_style_block_hides_the_rest_of_the_text() -> Result<()> {
    let config = SrTextConfig::load_default()?;
    let raw = "Seen by Dr Who. <style>td {color: red}";
    let report = Dataset::new().with(Element::text(Keyword::TextValue, raw));
    let extraction = extract(&report, &config);
    assert_eq!(extraction.body(), format!("Seen by Dr Who. {}\n", ".".repeat(22)));

    let spans = vec![Span::new(11, 14, "Who"), Span::new(23, 25, "td")];
    let result = Redactor::new(&config).redact(&report, &extraction.ledger, &spans)?;
    assert_eq!(result.unresolved, vec![Span::new(23, 25, "td")]);
    assert_eq!(
        result.document.text(Keyword::TextValue).as_deref(),
        Some("Seen by Dr XXX. <style>td {color: red}")
    );
    Ok(())
}

#[test]
fn stale_annotation_is_reported_and_others_still_apply() -> Result<()> {
    let config = SrTextConfig::load_default()?;
    let report = scenario_report();
    let extraction = extract(&report, &config);
    let spans = vec![Span::new(4, 11, "patient"), Span::new(18, 23, "tumor")];

    let result = Redactor::new(&config).redact(&report, &extraction.ledger, &spans)?;
    assert!(!result.is_success());
    assert_eq!(result.failures(), vec!["could not find annotation \"tumor\" in document".to_string()]);
    assert_eq!(
        result.document.text(Keyword::TextValue).as_deref(),
        Some("The XXXXXXX has a cyst.")
    );
    Ok(())
}

#[test]
fn empty_annotation_document_round_trips() -> Result<()> {
    let xml = from_spans(&[], LabelMode::Sensitive)?;
    assert!(to_spans(&xml)?.is_empty());
    Ok(())
}

#[test]
fn knowtator_annotations_redact_the_content_tree() -> Result<()> {
    let config = SrTextConfig::load_default()?;
    let report = Dataset::new().with(Element::sequence(
        Keyword::ContentSequence,
        vec![
            content_item("TEXT", "Finding").with(Element::text(Keyword::TextValue, "Cyst seen by Dr Who.")),
            content_item("DATE", "Seen").with(Element::new(
                Keyword::Date,
                Vr::DA,
                Value::Strings(vec!["20200101".into()]),
            )),
        ],
    ));
    let extraction = extract(&report, &config);
    let body = extraction.body();
    let byte = body.find("Who").expect("body mentions Who");
    let start = body[..byte].chars().count();
    let xml = from_spans(&[Span::new(start, start + 3, "Who")], LabelMode::Sensitive)?;

    let result = Redactor::new(&config).redact(&report, &extraction.ledger, &to_spans(&xml)?)?;
    assert!(result.is_success());
    let items = result.document.items(Keyword::ContentSequence);
    assert_eq!(items[0].text(Keyword::TextValue).as_deref(), Some("Cyst seen by Dr XXX."));
    assert_eq!(items[1].text(Keyword::Date).as_deref(), Some("99999999"));
    Ok(())
}

#[test]
fn alignment_is_deterministic() -> Result<()> {
    let config = SrTextConfig::load_default()?;
    let report = Dataset::new().with(Element::text(
        Keyword::TextValue,
        "<p>Dr Who saw Dr Who</p> and <b>Dr Who</b>",
    ));
    let extraction = extract(&report, &config);
    let spans = vec![Span::new(3, 9, "Dr Who"), Span::new(30, 36, "Dr Who")];

    let first = Redactor::new(&config).redact(&report, &extraction.ledger, &spans)?;
    let second = Redactor::new(&config).redact(&report, &extraction.ledger, &spans)?;
    assert_eq!(first.document, second.document);
    assert_eq!(first.redacted_body, second.redacted_body);
    let deltas: Vec<isize> = first.resolved.iter().map(|r| r.delta).collect();
    let again: Vec<isize> = second.resolved.iter().map(|r| r.delta).collect();
    assert_eq!(deltas, again);
    Ok(())
}

#[test]
fn sweep_is_idempotent_on_a_whole_report() {
    let mut once = scenario_report().with(Element::sequence(
        Keyword::ContentSequence,
        vec![content_item("PNAME", "Observer").with(Element::text(Keyword::PersonName, "Who^Dr"))],
    ));
    sweep(&mut once, 'X');
    let mut twice = once.clone();
    sweep(&mut twice, 'X');
    assert_eq!(once, twice);
}

#[test]
fn file_round_trip_through_headless_helpers() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source.json");
    let target = dir.path().join("target.json");
    let annotations = dir.path().join("spans.xml");

    std::fs::write(&source, scenario_report().to_json_string()?)?;
    std::fs::write(&target, scenario_report().to_json_string()?)?;
    std::fs::write(&annotations, from_spans(&[Span::new(4, 11, "patient")], LabelMode::Sensitive)?)?;

    let config = SrTextConfig::load_default()?;
    let report = headless_redact_files(&source, &annotations, Some(&target), &config, HeadlessEngineType::Window)?;
    assert!(report.is_success());

    let written = Dataset::read_json_file(&target)?;
    assert_eq!(written.text(Keyword::TextValue).as_deref(), Some("The XXXXXXX has a cyst."));
    assert_eq!(written.text(Keyword::StudyDate).as_deref(), Some("19000101"));
    assert_eq!(
        Dataset::read_json_file(&source)?.text(Keyword::TextValue).as_deref(),
        Some("The patient has a cyst.")
    );
    Ok(())
}

#[test]
fn missing_target_is_an_error_and_nothing_is_created() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source.json");
    let annotations = dir.path().join("spans.xml");
    let target = dir.path().join("absent.json");
    std::fs::write(&source, scenario_report().to_json_string()?)?;
    std::fs::write(&annotations, from_spans(&[], LabelMode::Sensitive)?)?;

    let config = SrTextConfig::load_default()?;
    assert!(headless_redact_files(&source, &annotations, Some(&target), &config, HeadlessEngineType::Window).is_err());
    assert!(!target.exists());
    Ok(())
}
