// srtext/src/cli.rs
//! This file defines the command-line interface (CLI) for the srtext application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use srtext_core::{HeadlessEngineType, LabelMode};

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "srtext",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Extract, annotate and redact the text of DICOM Structured Reports",
    long_about = "srtext pulls the free text out of DICOM Structured Reports (DICOM JSON), hands it to an annotator as plain text, and maps the annotator's spans back onto the report so they can be redacted in place, even when the annotator saw text with markup removed.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging for the srtext crates
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Path to a settings file merged over the built-in defaults.
    #[arg(long = "config", value_name = "FILE", global = true, help = "Path to a custom settings file (YAML).")]
    pub config: Option<PathBuf>,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `srtext` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Extracts the annotatable text of a report.")]
    Extract(ExtractCommand),

    #[command(about = "Redacts a report using Knowtator annotations and writes it into a target report.")]
    Redact(RedactCommand),

    #[command(about = "Produces Knowtator annotations from patterns or from a PHI list.")]
    Annotate(AnnotateCommand),

    #[command(about = "Blanks annotated spans in a plain text file.")]
    Apply(ApplyCommand),
}

/// Arguments for the `extract` command.
#[derive(Parser, Debug)]
pub struct ExtractCommand {
    #[arg(long, short = 'i', value_name = "FILE", help = "The report to read (DICOM JSON).")]
    pub input: PathBuf,

    #[arg(long, short = 'o', value_name = "PATH", help = "Write the text to this file, or to <SOPInstanceUID>.txt inside this directory. Defaults to stdout.")]
    pub output: Option<PathBuf>,

    #[arg(long = "no-header", help = "Leave out the [[Label]] header lines.")]
    pub no_header: bool,

    #[arg(long = "other-names", help = "Add an [[Other Names]] line for every person name in the report.")]
    pub other_names: bool,

    #[arg(long = "references", help = "Include UIDREF and IMAGE items from the content tree.")]
    pub references: bool,

    #[arg(long = "unexpected", help = "Include fields that are neither allow-listed nor deny-listed.")]
    pub unexpected: bool,
}

/// Arguments for the `redact` command.
#[derive(Parser, Debug)]
pub struct RedactCommand {
    #[arg(long, short = 'i', value_name = "FILE", help = "The report the annotations were made against (DICOM JSON).")]
    pub input: PathBuf,

    #[arg(long = "annotations", short = 'x', value_name = "FILE", help = "Knowtator XML annotations.")]
    pub annotations: PathBuf,

    #[arg(long, short = 'o', value_name = "FILE", help = "An existing report to write the redacted text into. Without it the redacted report is printed.")]
    pub output: Option<PathBuf>,

    #[arg(long = "engine", value_enum, default_value_t = EngineChoice::Window, help = "How annotation offsets are matched against the report.")]
    pub engine: EngineChoice,

    #[arg(long = "window", value_name = "N", help = "Largest offset correction the window engine tries.")]
    pub window: Option<usize>,

    #[arg(long = "strict", help = "Exit with an error if any annotation could not be located.")]
    pub strict: bool,

    #[arg(long = "redacted-text", value_name = "FILE", help = "Also write the redacted text to this file.")]
    pub redacted_text: Option<PathBuf>,

    #[arg(long = "no-redaction-summary", help = "Suppress the redaction summary.")]
    pub no_summary: bool,
}

/// Arguments for the `annotate` command.
#[derive(Parser, Debug)]
pub struct AnnotateCommand {
    #[arg(long, short = 'i', value_name = "FILE", required_unless_present = "phi", help = "Plain text to annotate with patterns.")]
    pub input: Option<PathBuf>,

    #[arg(long = "pattern", short = 'p', value_name = "REGEX", help = "An extra pattern to annotate with. May be repeated.")]
    pub patterns: Vec<String>,

    #[arg(long, short = 'e', value_delimiter = ',', help = "Enable these configured patterns, including opt-in ones (comma-separated).")]
    pub enable: Vec<String>,

    #[arg(long = "disable", value_delimiter = ',', help = "Disable these configured patterns (comma-separated).")]
    pub disable: Vec<String>,

    #[arg(long = "only-cli-patterns", help = "Ignore configured patterns and use only those given with -p.")]
    pub only_cli_patterns: bool,

    #[arg(long = "mode", value_enum, default_value_t = ModeChoice::Sensitive, help = "Label written for spans without a concept.")]
    pub mode: ModeChoice,

    #[arg(long = "phi", value_name = "FILE", requires = "doc", conflicts_with = "input", help = "Convert this PHI JSON list instead of running patterns.")]
    pub phi: Option<PathBuf>,

    #[arg(long = "doc", value_name = "NAME", requires = "phi", help = "The document in the PHI list to convert.")]
    pub doc: Option<String>,

    #[arg(long, short = 'o', value_name = "FILE", help = "Write the XML to this file instead of stdout.")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `apply` command.
#[derive(Parser, Debug)]
pub struct ApplyCommand {
    #[arg(long, short = 'i', value_name = "FILE", help = "Plain text to redact.")]
    pub input: PathBuf,

    #[arg(long = "annotations", short = 'x', value_name = "FILE", help = "Knowtator XML annotations.")]
    pub annotations: PathBuf,

    #[arg(long, short = 'o', value_name = "FILE", help = "Write the result to this file instead of stdout.")]
    pub output: Option<PathBuf>,

    #[arg(long = "fill", value_name = "CHAR", help = "Replacement character. Defaults to redact.redact_fill.")]
    pub fill: Option<char>,
}

/// Represents the available alignment engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineChoice {
    /// Searches a window around the stated offsets.
    Window,
    /// Accepts annotations only at their exact offsets.
    Exact,
}

impl From<EngineChoice> for HeadlessEngineType {
    fn from(choice: EngineChoice) -> Self {
        match choice {
            EngineChoice::Window => HeadlessEngineType::Window,
            EngineChoice::Exact => HeadlessEngineType::Exact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeChoice {
    Sensitive,
    Correct,
}

impl From<ModeChoice> for LabelMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Sensitive => LabelMode::Sensitive,
            ModeChoice::Correct => LabelMode::Correct,
        }
    }
}
