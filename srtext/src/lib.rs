// srtext/src/lib.rs
//! # srtext CLI Application
//!
//! Command-line front end for `srtext-core`: extracts report text for an
//! annotator, converts annotations, and redacts reports in place.
//! License: MIT OR APACHE 2.0

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

use anyhow::{Context, Result};
use log::debug;

use srtext_core::SrTextConfig;

use crate::cli::{Cli, Commands};
use crate::ui::theme::build_theme_map;

/// Runs one parsed invocation. The logger must already be initialized.
pub fn run(cli: Cli) -> Result<()> {
    let theme = build_theme_map(cli.theme.as_deref()).context("Theme error")?;
    let config = SrTextConfig::load(cli.config.as_deref()).context("Failed to load settings")?;
    debug!("Settings loaded; running {:?}", cli.command);

    match &cli.command {
        Commands::Extract(cmd) => commands::extract::run_extract(cmd, &config, &theme, cli.quiet),
        Commands::Redact(cmd) => commands::redact::run_redact(cmd, &config, &theme, cli.quiet),
        Commands::Annotate(cmd) => commands::annotate::run_annotate(cmd, &config, &theme, cli.quiet),
        Commands::Apply(cmd) => commands::apply::run_apply(cmd, &config, &theme, cli.quiet),
    }
}
