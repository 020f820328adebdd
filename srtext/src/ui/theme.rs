// srtext/src/ui/theme.rs
//! Colors for terminal output.
//!
//! A theme maps each [`ThemeEntry`] to an optional 16-color ANSI foreground.
//! Themes load from YAML; entries the file leaves out keep their defaults.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub type ThemeMap = HashMap<ThemeEntry, ThemeStyle>;

/// The different logical parts of the output that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    Header,
    Success,
    Info,
    Warn,
    Error,
    /// Counts of located annotations in the summary.
    Resolved,
    /// Counts and texts of annotations that could not be located.
    Unresolved,
    SummaryLabel,
}

const ALL_ENTRIES: [ThemeEntry; 8] = [
    ThemeEntry::Header,
    ThemeEntry::Success,
    ThemeEntry::Info,
    ThemeEntry::Warn,
    ThemeEntry::Error,
    ThemeEntry::Resolved,
    ThemeEntry::Unresolved,
    ThemeEntry::SummaryLabel,
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ThemeColor {
    /// A named ANSI color (e.g., "red", "brightgreen").
    Named(String),
}

#[derive(Debug, Clone)]
pub struct ParseThemeColorError;

impl fmt::Display for ParseThemeColorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid theme color; expected a 16-color ANSI name such as red, brightgreen or white."
        )
    }
}

impl std::error::Error for ParseThemeColorError {}

const COLOR_NAMES: [(&str, AnsiColors); 16] = [
    ("black", AnsiColors::Black),
    ("red", AnsiColors::Red),
    ("green", AnsiColors::Green),
    ("yellow", AnsiColors::Yellow),
    ("blue", AnsiColors::Blue),
    ("magenta", AnsiColors::Magenta),
    ("cyan", AnsiColors::Cyan),
    ("white", AnsiColors::White),
    ("brightblack", AnsiColors::BrightBlack),
    ("brightred", AnsiColors::BrightRed),
    ("brightgreen", AnsiColors::BrightGreen),
    ("brightyellow", AnsiColors::BrightYellow),
    ("brightblue", AnsiColors::BrightBlue),
    ("brightmagenta", AnsiColors::BrightMagenta),
    ("brightcyan", AnsiColors::BrightCyan),
    ("brightwhite", AnsiColors::BrightWhite),
];

impl FromStr for ThemeColor {
    type Err = ParseThemeColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if COLOR_NAMES.iter().any(|(name, _)| *name == lower) {
            Ok(ThemeColor::Named(lower))
        } else {
            Err(ParseThemeColorError)
        }
    }
}

impl ThemeColor {
    /// Unknown names render as white.
    pub fn to_ansi_color(&self) -> AnsiColors {
        let ThemeColor::Named(name) = self;
        let lower = name.to_lowercase();
        COLOR_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == lower)
            .map(|(_, color)| *color)
            .unwrap_or(AnsiColors::White)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeStyle {
    pub fg: Option<ThemeColor>,
}

impl ThemeStyle {
    fn named(color: &str) -> Self {
        ThemeStyle {
            fg: Some(ThemeColor::Named(color.to_string())),
        }
    }

    /// Loads a theme from YAML and fills the gaps from the default theme.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ThemeMap> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        let mut custom: ThemeMap = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse theme file {}", path.display()))?;
        for (entry, style) in Self::default_theme_map() {
            custom.entry(entry).or_insert(style);
        }
        Ok(custom)
    }

    pub fn default_theme_map() -> ThemeMap {
        let mut theme = HashMap::new();
        theme.insert(ThemeEntry::Success, Self::named("green"));
        theme.insert(ThemeEntry::Warn, Self::named("yellow"));
        theme.insert(ThemeEntry::Error, Self::named("red"));
        theme.insert(ThemeEntry::Resolved, Self::named("green"));
        theme.insert(ThemeEntry::Unresolved, Self::named("brightred"));
        theme.insert(ThemeEntry::Header, Self::named("cyan"));
        for entry in ALL_ENTRIES {
            theme.entry(entry).or_insert_with(|| Self::named("white"));
        }
        theme
    }
}

/// Loads the theme at `theme_path`, or the default theme.
pub fn build_theme_map(theme_path: Option<&Path>) -> Result<ThemeMap> {
    match theme_path {
        Some(path) => ThemeStyle::load_from_file(path),
        None => Ok(ThemeStyle::default_theme_map()),
    }
}

/// The ANSI color for `entry`, if the theme gives one.
pub fn color_for(theme: &ThemeMap, entry: ThemeEntry) -> Option<AnsiColors> {
    theme
        .get(&entry)
        .and_then(|style| style.fg.as_ref())
        .map(ThemeColor::to_ansi_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_named_colors() {
        assert!("red".parse::<ThemeColor>().is_ok());
        assert!("BrightGreen".parse::<ThemeColor>().is_ok());
        assert!("unknown".parse::<ThemeColor>().is_err());
    }

    #[test]
    fn default_theme_covers_every_entry() {
        let theme = build_theme_map(None).unwrap();
        for entry in ALL_ENTRIES {
            assert!(color_for(&theme, entry).is_some());
        }
        assert_eq!(color_for(&theme, ThemeEntry::Unresolved), Some(AnsiColors::BrightRed));
    }

    #[test]
    fn theme_file_overrides_and_keeps_defaults() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "error:\n  fg: blue")?;
        let theme = build_theme_map(Some(file.path()))?;
        assert_eq!(color_for(&theme, ThemeEntry::Error), Some(AnsiColors::Blue));
        assert_eq!(color_for(&theme, ThemeEntry::Success), Some(AnsiColors::Green));
        Ok(())
    }
}
