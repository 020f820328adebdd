// srtext-markup/src/strip/mod.rs
//! Display-only markup removal.
//!
//! Output of this module is meant for people reading a report. It changes the
//! length of the text and must never feed an offset-sensitive path.

use crate::vocabulary::{
    LINE_BREAK_TAG, NBSP_ENTITY, SCRIPT_BLOCK, SELF_CLOSING_SCRIPT, SELF_CLOSING_STYLE,
    STYLE_BLOCK, VOCABULARY_TAG,
};

/// Removes markup from `text`, turning break-like tags into newlines and the
/// `&nbsp;` entity into a single space. `\r\n` and lone `\r` become `\n`.
pub fn strip_markup(text: &str) -> String {
    let text = SELF_CLOSING_SCRIPT.replace_all(text, "");
    let text = SELF_CLOSING_STYLE.replace_all(&text, "");
    let text = text.replace(NBSP_ENTITY, " ");
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = SCRIPT_BLOCK.replace_all(&text, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = LINE_BREAK_TAG.replace_all(&text, "\n");
    VOCABULARY_TAG.replace_all(&text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_tags_and_blocks() {
        let src = "<html><style>p{}</style><p>Knee<BR>pain&nbsp;noted</p></html>";
        assert_eq!(strip_markup(src), "Knee\npain noted\n");
    }

    #[test]
    fn test_strip_normalizes_line_endings() {
        assert_eq!(strip_markup("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_strip_keeps_angle_comparisons() {
        assert_eq!(strip_markup("age <1 month"), "age <1 month");
    }
}
