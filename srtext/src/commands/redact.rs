// srtext/src/commands/redact.rs
//! `srtext redact`: applies Knowtator annotations to a report and writes the
//! redacted text into a target report.
//! License: MIT OR APACHE 2.0

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io;

use srtext_core::knowtator::read_spans_file;
use srtext_core::writeback::{write_back_file, write_back_with_fill};
use srtext_core::{headless_redact, Dataset, HeadlessEngineType, SrTextConfig};

use super::{error_msg, success_msg, write_output};
use crate::cli::RedactCommand;
use crate::ui::redaction_summary;
use crate::ui::theme::ThemeMap;

pub fn run_redact(cmd: &RedactCommand, config: &SrTextConfig, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let mut config = config.clone();
    if let Some(window) = cmd.window {
        config.redact.window = window;
    }
    config.validate()?;

    let source = Dataset::read_json_file(&cmd.input)
        .with_context(|| format!("Failed to read report {}", cmd.input.display()))?;
    let spans = read_spans_file(&cmd.annotations)
        .with_context(|| format!("Failed to read annotations {}", cmd.annotations.display()))?;
    let engine = HeadlessEngineType::from(cmd.engine);
    debug!("Redacting with {} annotations using the {} engine", spans.len(), engine);

    let report = headless_redact(&source, &spans, &config, engine)?;

    match &cmd.output {
        Some(target) => {
            write_back_file(target, &report.document, config.redact.redact_fill)
                .with_context(|| format!("Failed to write redacted text into {}", target.display()))?;
            info!("Updated {}", target.display());
            if !quiet {
                success_msg(format!("Redacted text written into {}", target.display()), theme);
            }
        }
        None => {
            let swept = write_back_with_fill(&source, &report.document, config.redact.redact_fill);
            let mut json = swept.to_json_string()?;
            json.push('\n');
            write_output(None, &json)?;
        }
    }

    if let Some(path) = &cmd.redacted_text {
        fs::write(path, &report.redacted_body)
            .with_context(|| format!("Failed to write redacted text to {}", path.display()))?;
    }

    if !cmd.no_summary && !quiet {
        let stderr_supports_color = io::stderr().is_terminal();
        redaction_summary::print_summary(
            &report,
            &engine.to_string(),
            spans.len(),
            &mut io::stderr(),
            theme,
            stderr_supports_color,
        )?;
    } else {
        for failure in report.failures() {
            error_msg(failure, theme);
        }
    }

    if cmd.strict && !report.is_success() {
        bail!(
            "{} of {} annotations could not be located",
            report.unresolved.len(),
            spans.len()
        );
    }
    Ok(())
}
