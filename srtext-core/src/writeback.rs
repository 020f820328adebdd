// srtext-core/src/writeback.rs
//! Copies redacted report text onto another copy of the same report and
//! sweeps the result for person names and dates that header
//! de-identification may have missed.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::document::{Dataset, Value};
use crate::errors::{Result, SrTextError};
use crate::keys::BODY_FIELDS;
use crate::tags::Vr;

/// Replacement for every non-empty date value.
pub const SWEPT_DATE: &str = "19000101";

/// Blanks every person name with `fill` at its own length and pins every
/// date to [`SWEPT_DATE`]. Each name group (alphabetic, ideographic and
/// phonetic) is blanked on its own. Applying it twice changes nothing further.
pub fn sweep(document: &mut Dataset, fill: char) -> usize {
    let mut touched = 0;
    document.walk_mut(&mut |element| {
        if element.is_empty() {
            return;
        }
        match (&mut element.value, element.vr) {
            (Value::Names(names), Vr::PN) => {
                for group in names.iter_mut().flat_map(|n| n.groups_mut()) {
                    blank(group, fill);
                }
            }
            (Value::Strings(values), Vr::PN) => values.iter_mut().for_each(|v| blank(v, fill)),
            (Value::Strings(values), Vr::DA | Vr::DT) => {
                for value in values.iter_mut().filter(|v| !v.is_empty()) {
                    *value = SWEPT_DATE.to_string();
                }
            }
            _ => return,
        }
        touched += 1;
    });
    debug!("Sweep blanked {} name and date fields", touched);
    touched
}

fn blank(value: &mut String, fill: char) {
    *value = std::iter::repeat(fill).take(value.chars().count()).collect();
}

/// [`write_back_with_fill`] using `X` for names.
pub fn write_back(target: &Dataset, redacted_source: &Dataset) -> Dataset {
    write_back_with_fill(target, redacted_source, 'X')
}

/// Returns `target` with the source's body fields copied over, then swept.
/// Body fields absent from the source are left as they are in the target.
pub fn write_back_with_fill(target: &Dataset, redacted_source: &Dataset, fill: char) -> Dataset {
    let mut out = target.clone();
    for keyword in BODY_FIELDS {
        if let Some(element) = redacted_source.get(*keyword) {
            out.insert(element.clone());
        }
    }
    sweep(&mut out, fill);
    out
}

/// Rewrites the report at `target_path` in place. The file must already
/// exist; it is replaced atomically, so a failure leaves it untouched.
pub fn write_back_file<P: AsRef<Path>>(target_path: P, redacted_source: &Dataset, fill: char) -> Result<Dataset> {
    let target_path = target_path.as_ref();
    if !target_path.is_file() {
        return Err(SrTextError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("target document {} does not exist", target_path.display()),
        )));
    }
    let target = Dataset::read_json_file(target_path)?;
    let updated = write_back_with_fill(&target, redacted_source, fill);
    persist_json(target_path, &updated)?;
    info!("Wrote redacted text into {}", target_path.display());
    Ok(updated)
}

/// Writes `document` to a temporary sibling of `path`, then renames it over
/// `path`.
pub fn persist_json(path: &Path, document: &Dataset) -> Result<()> {
    let json = document.to_json_string()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| SrTextError::Persist {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
