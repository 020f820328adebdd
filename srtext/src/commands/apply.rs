// srtext/src/commands/apply.rs
//! `srtext apply`: blanks annotated spans in a plain text file, the way the
//! annotator's own output is finished off.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};

use srtext_core::knowtator::read_spans_file;
use srtext_core::{apply_spans, SrTextConfig};

use super::{info_msg, read_text, write_output};
use crate::cli::ApplyCommand;
use crate::ui::theme::ThemeMap;

pub fn run_apply(cmd: &ApplyCommand, config: &SrTextConfig, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let text = read_text(&cmd.input)?;
    let spans = read_spans_file(&cmd.annotations)
        .with_context(|| format!("Failed to read annotations {}", cmd.annotations.display()))?;
    let fill = cmd.fill.unwrap_or(config.redact.redact_fill);

    let redacted = apply_spans(&text, &spans, fill);
    write_output(cmd.output.as_deref(), &redacted)?;
    if !quiet {
        info_msg(format!("Blanked {} spans.", spans.len()), theme);
    }
    Ok(())
}
