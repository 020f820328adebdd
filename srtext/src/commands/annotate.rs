// srtext/src/commands/annotate.rs
//! `srtext annotate`: turns pattern matches, or one document's entries in a
//! PHI list, into Knowtator XML.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::debug;

use srtext_core::knowtator::write_annotations;
use srtext_core::{spans_from_phi, LabelMode, PatternAnnotator, PatternRule, Span, SrTextConfig};

use super::{info_msg, read_text, warn_msg, write_output};
use crate::cli::AnnotateCommand;
use crate::ui::theme::ThemeMap;

/// Configured patterns (after enable/disable) plus those given with `-p`.
pub fn build_annotator(cmd: &AnnotateCommand, config: &SrTextConfig) -> Result<PatternAnnotator> {
    let mut rules: Vec<PatternRule> = if cmd.only_cli_patterns {
        Vec::new()
    } else {
        let mut annotate = config.annotate.clone();
        annotate.set_active_patterns(&cmd.enable, &cmd.disable);
        annotate.patterns
    };
    rules.extend(
        cmd.patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| PatternRule::new(format!("cli_{}", i + 1), pattern.clone())),
    );
    PatternAnnotator::compile(&rules).context("Invalid annotation pattern")
}

fn collect_spans(cmd: &AnnotateCommand, config: &SrTextConfig, theme: &ThemeMap, quiet: bool) -> Result<(Vec<Span>, Option<String>)> {
    if let Some(phi) = &cmd.phi {
        let doc = cmd.doc.as_deref().context("--phi needs --doc to pick a document")?;
        let json = read_text(phi)?;
        let spans = spans_from_phi(&json, doc)
            .with_context(|| format!("Failed to read PHI list {}", phi.display()))?;
        return Ok((spans, Some(doc.to_string())));
    }

    let input = cmd.input.as_ref().context("An input text file is required")?;
    let text = read_text(input)?;
    let annotator = build_annotator(cmd, config)?;
    if annotator.is_empty() && !quiet {
        warn_msg("No annotation patterns are active.", theme);
    }
    debug!("Annotating with patterns: {}", annotator.names().join(", "));
    let name = input.file_name().and_then(|n| n.to_str()).map(str::to_string);
    Ok((annotator.annotate(&text), name))
}

pub fn run_annotate(cmd: &AnnotateCommand, config: &SrTextConfig, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let (spans, source) = collect_spans(cmd, config, theme, quiet)?;
    let mode = LabelMode::from(cmd.mode);
    let xml = write_annotations(&spans, mode, source.as_deref())?;
    write_output(cmd.output.as_deref(), &xml)?;
    if !quiet {
        info_msg(format!("Wrote {} annotations.", spans.len()), theme);
    }
    Ok(())
}
