// srtext/src/commands/extract.rs
//! `srtext extract`: writes the annotatable text of one report.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use srtext_core::{extract, Dataset, Keyword, SrTextConfig};

use super::{info_msg, warn_msg, write_output};
use crate::cli::ExtractCommand;
use crate::ui::theme::ThemeMap;

/// Applies the command-line switches on top of the loaded settings.
pub fn effective_config(cmd: &ExtractCommand, config: &SrTextConfig) -> SrTextConfig {
    let mut config = config.clone();
    if cmd.no_header {
        config.extract.include_header = false;
    }
    if cmd.other_names {
        config.extract.include_other_names = true;
    }
    if cmd.references {
        config.extract.include_references = true;
    }
    if cmd.unexpected {
        config.extract.include_unexpected_tags = true;
    }
    config
}

/// Where the text goes: a file, `<SOPInstanceUID>.txt` in a directory, or
/// stdout.
pub fn output_path(cmd: &ExtractCommand, document: &Dataset) -> Result<Option<PathBuf>> {
    match &cmd.output {
        Some(dir) if dir.is_dir() => {
            let uid = document
                .require_text(Keyword::SOPInstanceUID)
                .context("Cannot name the output file")?;
            Ok(Some(dir.join(format!("{}.txt", uid))))
        }
        Some(path) => Ok(Some(path.clone())),
        None => Ok(None),
    }
}

pub fn run_extract(cmd: &ExtractCommand, config: &SrTextConfig, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let config = effective_config(cmd, config);
    let document = Dataset::read_json_file(&cmd.input)
        .with_context(|| format!("Failed to read report {}", cmd.input.display()))?;

    let extraction = extract(&document, &config);
    info!(
        "Extracted {} characters in {} fragments from {}",
        extraction.text.chars().count(),
        extraction.ledger.len(),
        cmd.input.display()
    );

    if !quiet && !extraction.unexpected.is_empty() && !config.extract.include_unexpected_tags {
        let names: Vec<String> = extraction.unexpected.iter().map(|t| t.label()).collect();
        warn_msg(format!("Fields not extracted: {}", names.join(", ")), theme);
    }

    let path = output_path(cmd, &document)?;
    write_output(path.as_deref(), &extraction.text)?;
    if let (Some(path), false) = (&path, quiet) {
        info_msg(format!("Wrote extracted text to {}", path.display()), theme);
    }
    Ok(())
}
