// srtext/src/ui/redaction_summary.rs
//! The table printed after a `redact` run.
//! License: MIT OR APACHE 2.0

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use std::io::{self, Write};

use srtext_core::RedactionReport;

use super::output_format::{print_error_message, write_styled};
use super::theme::{ThemeEntry, ThemeMap};

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// Builds the summary table. Colors are left to the caller's stream.
pub fn summary_table(report: &RedactionReport, engine: &str, total: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .force_no_tty()
        .set_header(vec![
            header_cell("Annotations"),
            header_cell("Located"),
            header_cell("Not located"),
            header_cell("Names/dates blanked"),
            header_cell("Engine"),
        ]);
    table.add_row(vec![
        Cell::new(total),
        Cell::new(report.resolved.len()),
        Cell::new(report.unresolved.len()),
        Cell::new(report.always_blanked),
        Cell::new(engine),
    ]);
    for column in 0..4 {
        if let Some(col) = table.column_mut(column) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

/// Prints the table followed by one line per annotation that was not
/// located, quoting its text.
pub fn print_summary<W: Write + ?Sized>(
    report: &RedactionReport,
    engine: &str,
    total: usize,
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    write_styled(writer, "Redaction Summary:", ThemeEntry::Header, theme, supports_color)?;
    writeln!(writer)?;
    writeln!(writer, "{}", summary_table(report, engine, total))?;
    if report.is_success() {
        write_styled(writer, "All annotations located.", ThemeEntry::Resolved, theme, supports_color)?;
        writeln!(writer)?;
    } else {
        for failure in report.failures() {
            print_error_message(writer, &failure, theme, supports_color)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::build_theme_map;
    use srtext_core::{Dataset, Span};

    fn report(unresolved: Vec<Span>) -> RedactionReport {
        RedactionReport {
            document: Dataset::new(),
            redacted_body: String::new(),
            resolved: Vec::new(),
            unresolved,
            always_blanked: 1,
        }
    }

    #[test]
    fn summary_lists_unlocated_text() {
        let theme = build_theme_map(None).unwrap();
        let mut out = Vec::new();
        print_summary(&report(vec![Span::new(3, 8, "tumor")]), "window", 1, &mut out, &theme, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Not located"));
        assert!(text.contains("window"));
        assert!(text.contains("could not find annotation \"tumor\" in document"));
    }

    #[test]
    fn summary_reports_success() {
        let theme = build_theme_map(None).unwrap();
        let mut out = Vec::new();
        print_summary(&report(Vec::new()), "exact", 0, &mut out, &theme, false).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("All annotations located."));
    }
}
