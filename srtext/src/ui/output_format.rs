// srtext/src/ui/output_format.rs
//! Themed status lines written to a terminal or a plain stream.
//! License: MIT OR APACHE 2.0

use owo_colors::OwoColorize;
use std::io::{self, Write};

use super::theme::{color_for, ThemeEntry, ThemeMap};

/// Writes `text` in the theme color for `entry` when color is supported.
pub fn write_styled<W: Write + ?Sized>(
    writer: &mut W,
    text: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    match color_for(theme, entry) {
        Some(color) if supports_color => write!(writer, "{}", text.color(color)),
        _ => write!(writer, "{}", text),
    }
}

fn print_prefixed<W: Write + ?Sized>(
    writer: &mut W,
    prefix: &str,
    message: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    write_styled(writer, &format!("{}{}", prefix, message), entry, theme, supports_color)?;
    writeln!(writer)
}

pub fn print_info_message<W: Write + ?Sized>(writer: &mut W, message: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_prefixed(writer, "", message, ThemeEntry::Info, theme, supports_color)
}

pub fn print_success_message<W: Write + ?Sized>(writer: &mut W, message: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_prefixed(writer, "", message, ThemeEntry::Success, theme, supports_color)
}

pub fn print_warn_message<W: Write + ?Sized>(writer: &mut W, message: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_prefixed(writer, "Warning: ", message, ThemeEntry::Warn, theme, supports_color)
}

pub fn print_error_message<W: Write + ?Sized>(writer: &mut W, message: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_prefixed(writer, "Error: ", message, ThemeEntry::Error, theme, supports_color)
}
