// srtext/src/ui/mod.rs
//! Terminal presentation: themes, status lines and the redaction summary.

pub mod output_format;
pub mod redaction_summary;
pub mod theme;
