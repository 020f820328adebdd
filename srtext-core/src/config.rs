//! Configuration management for `srtext-core`.
//!
//! Settings live in YAML. The embedded defaults (`config/default_settings.yaml`)
//! are always loaded first and a user file is merged over them: mappings merge
//! key by key, `annotate.patterns` merges by pattern name, `keys.deny` is
//! extended, and any other value is replaced. The result is an immutable
//! [`SrTextConfig`] that callers pass by reference.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yml::Value as Yaml;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::errors::SrTextError;
use crate::tags::Keyword;

/// Maximum allowed length for an annotator pattern.
pub const MAX_PATTERN_LENGTH: usize = 500;

const DEFAULT_SETTINGS: &str = include_str!("../config/default_settings.yaml");

/// One section of the embedded defaults, read as plain YAML so that the
/// `Default` impls below never deserialize a whole settings tree.
fn embedded_section<T: serde::de::DeserializeOwned>(section: &str, key: &str) -> Option<T> {
    let settings: Yaml = serde_yml::from_str(DEFAULT_SETTINGS).ok()?;
    let value = settings.get(section)?.get(key)?.clone();
    serde_yml::from_value(value).ok()
}

static DEFAULT_DENY: Lazy<Vec<String>> =
    Lazy::new(|| embedded_section("keys", "deny").unwrap_or_default());

static DEFAULT_PATTERNS: Lazy<Vec<PatternRule>> =
    Lazy::new(|| embedded_section("annotate", "patterns").unwrap_or_default());

/// What the extractor emits besides the free text and content tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub include_header: bool,
    pub include_unexpected_tags: bool,
    pub warn_unexpected_tags: bool,
    /// Adds one `[[Other Names]]` line per distinct person name in the document.
    pub include_other_names: bool,
    /// Emits UIDREF and IMAGE references from the content tree.
    pub include_references: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            include_header: true,
            include_unexpected_tags: false,
            warn_unexpected_tags: false,
            include_other_names: false,
            include_references: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub replace_markup: bool,
    pub fill_char: char,
    pub newline_char: char,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            replace_markup: true,
            fill_char: srtext_markup::DEFAULT_FILL,
            newline_char: srtext_markup::DEFAULT_NEWLINE,
        }
    }
}

/// How long a replacement run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// Same number of characters as the replaced text.
    #[default]
    Fixed,
    /// A random length between half and one and a half times the original.
    Randomized,
}

/// Which coordinate system incoming span offsets use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanOrigin {
    /// Offsets into the body buffer (fragments only, one per line).
    #[default]
    Body,
    /// Offsets into the full extracted text, headers and markers included.
    Extracted,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RedactConfig {
    pub redact_fill: char,
    pub digit_fill: char,
    pub length_policy: LengthPolicy,
    /// Largest offset correction the drift search tries, in characters.
    pub window: usize,
    pub span_origin: SpanOrigin,
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            redact_fill: 'X',
            digit_fill: '9',
            length_policy: LengthPolicy::Fixed,
            window: 32,
            span_origin: SpanOrigin::Body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Keywords of top-level fields that are neither extracted nor reported.
    pub deny: Vec<String>,
}

impl Default for KeysConfig {
    /// The deny list from the embedded defaults.
    fn default() -> Self {
        Self {
            deny: DEFAULT_DENY.clone(),
        }
    }
}

impl KeysConfig {
    pub fn is_denied(&self, keyword: Keyword) -> bool {
        self.deny.iter().any(|k| k == keyword.name())
    }
}

/// A named pattern for the offline annotator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternRule {
    pub name: String,
    pub description: Option<String>,
    pub pattern: String,
    pub case_insensitive: bool,
    pub multiline: bool,
    pub dot_matches_new_line: bool,
    /// Disabled unless enabled by name.
    pub opt_in: bool,
}

impl Default for PatternRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            pattern: String::new(),
            case_insensitive: false,
            multiline: false,
            dot_matches_new_line: false,
            opt_in: false,
        }
    }
}

impl PatternRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnnotateConfig {
    pub patterns: Vec<PatternRule>,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.clone(),
        }
    }
}

impl AnnotateConfig {
    /// Keeps the patterns that should run: everything not disabled, minus
    /// opt-in patterns that were not enabled by name.
    pub fn set_active_patterns(&mut self, enable: &[String], disable: &[String]) {
        let enable_set: HashSet<&str> = enable.iter().map(String::as_str).collect();
        let disable_set: HashSet<&str> = disable.iter().map(String::as_str).collect();
        let known: HashSet<&str> = self.patterns.iter().map(|p| p.name.as_str()).collect();

        for name in enable_set.union(&disable_set) {
            if !known.contains(name) {
                warn!("Pattern '{}' does not exist.", name);
            }
        }

        self.patterns.retain(|p| {
            let name = p.name.as_str();
            !disable_set.contains(name) && (!p.opt_in || enable_set.contains(name))
        });
        debug!("{} annotator patterns active.", self.patterns.len());
    }
}

/// The complete settings tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SrTextConfig {
    pub extract: ExtractConfig,
    pub markup: MarkupConfig,
    pub redact: RedactConfig,
    pub keys: KeysConfig,
    pub annotate: AnnotateConfig,
}

impl SrTextConfig {
    /// The embedded defaults.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default settings from embedded string...");
        let config: SrTextConfig =
            serde_yml::from_str(DEFAULT_SETTINGS).context("Failed to parse default settings")?;
        debug!(
            "Loaded {} deny-listed keys and {} patterns.",
            config.keys.deny.len(),
            config.annotate.patterns.len()
        );
        Ok(config)
    }

    /// The embedded defaults with the YAML file at `path` merged over them.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading settings from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::load_with_overrides(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Merges a YAML document over the embedded defaults and validates the result.
    pub fn load_with_overrides(user_yaml: &str) -> Result<Self> {
        let mut base: Yaml =
            serde_yml::from_str(DEFAULT_SETTINGS).context("Failed to parse default settings")?;
        if !user_yaml.trim().is_empty() {
            let overlay: Yaml = serde_yml::from_str(user_yaml)?;
            if !overlay.is_null() {
                merge_settings(&mut base, overlay, "");
            }
        }
        let config: SrTextConfig = serde_yml::from_value(base)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `explicit` if given, else the user file in the platform config
    /// directory when one exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => match user_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::load_from_file(path),
                None => Self::load_default(),
            },
        }
    }

    /// Checks the settings for values that cannot work, collecting every
    /// problem before failing.
    pub fn validate(&self) -> std::result::Result<(), SrTextError> {
        let mut errors = Vec::new();

        for (name, c) in [
            ("markup.fill_char", self.markup.fill_char),
            ("redact.redact_fill", self.redact.redact_fill),
            ("redact.digit_fill", self.redact.digit_fill),
        ] {
            if c == '\r' || c == '\n' {
                errors.push(format!("`{}` must not be a line terminator.", name));
            }
        }
        if self.redact.window == 0 {
            errors.push("`redact.window` must be at least 1.".to_string());
        }

        let mut names = HashSet::new();
        for rule in &self.annotate.patterns {
            if rule.name.is_empty() {
                errors.push("A pattern has an empty `name` field.".to_string());
            } else if !names.insert(rule.name.as_str()) {
                errors.push(format!("Duplicate pattern name found: '{}'.", rule.name));
            }
            if rule.pattern.is_empty() {
                errors.push(format!("Pattern '{}' has an empty `pattern` field.", rule.name));
            } else if rule.pattern.len() > MAX_PATTERN_LENGTH {
                errors.push(format!(
                    "Pattern '{}' is longer than {} characters.",
                    rule.name, MAX_PATTERN_LENGTH
                ));
            } else if let Err(e) = Regex::new(&rule.pattern) {
                errors.push(format!("Pattern '{}' is not a valid regex: {}", rule.name, e));
            }
        }

        for key in &self.keys.deny {
            if Keyword::from_name(key).is_none() {
                debug!("Deny-listed key '{}' is not in the tag dictionary.", key);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SrTextError::Config(format!(
                "Settings validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}

/// `<config dir>/srtext/config.yaml`, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("srtext").join("config.yaml"))
}

fn merge_settings(base: &mut Yaml, overlay: Yaml, path: &str) {
    match (base, overlay) {
        (Yaml::Mapping(base_map), Yaml::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                let child = match key.as_str() {
                    Some(k) if path.is_empty() => k.to_string(),
                    Some(k) => format!("{}.{}", path, k),
                    None => path.to_string(),
                };
                match base_map.get_mut(&key) {
                    Some(existing) => merge_settings(existing, value, &child),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (Yaml::Sequence(base_seq), Yaml::Sequence(overlay_seq)) if path == "annotate.patterns" => {
            for rule in overlay_seq {
                let name = rule.get("name").and_then(Yaml::as_str).map(str::to_string);
                let existing = base_seq.iter_mut().find(|r| {
                    r.get("name").and_then(Yaml::as_str) == name.as_deref() && name.is_some()
                });
                match existing {
                    Some(slot) => {
                        debug!("Overriding pattern {:?}", name);
                        *slot = rule;
                    }
                    None => base_seq.push(rule),
                }
            }
        }
        (Yaml::Sequence(base_seq), Yaml::Sequence(overlay_seq)) if path == "keys.deny" => {
            for key in overlay_seq {
                if !base_seq.contains(&key) {
                    base_seq.push(key);
                }
            }
        }
        (slot, value) => {
            debug!("Overriding setting '{}'", path);
            *slot = value;
        }
    }
}
