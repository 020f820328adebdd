// srtext-markup/src/normalize/mod.rs
//! The length-preserving normalizer.
//!
//! Every recognised piece of markup is overwritten with a run of the fill
//! character of the same length (counted in chars), so any char offset into
//! the output is a valid offset into the input.

use regex::{Captures, Regex};

use crate::vocabulary::{
    NBSP_ENTITY, SCRIPT_BLOCK, SELF_CLOSING_SCRIPT, SELF_CLOSING_STYLE, STYLE_BLOCK,
    VOCABULARY_TAG,
};

/// Default character written over markup.
pub const DEFAULT_FILL: char = '.';
/// Default character written over `\r` and `\n`.
pub const DEFAULT_NEWLINE: char = '\n';

const NBSP_SPACES: &str = "      ";

/// An immutable normalizer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    pub fill: char,
    pub newline: char,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL,
            newline: DEFAULT_NEWLINE,
        }
    }
}

impl Normalizer {
    pub fn new(fill: char, newline: char) -> Self {
        Self { fill, newline }
    }

    /// Normalizes `text`. The output has exactly as many chars as the input.
    pub fn apply(&self, text: &str) -> String {
        normalize(text, self.fill, self.newline)
    }
}

/// Replaces markup in `text` with runs of `fill` and every line terminator
/// with `newline`.
///
/// The passes run in a fixed order: self-closing script/style elements, the
/// `&nbsp;` entity, line terminators, paired script/style blocks, then the
/// tag vocabulary. Malformed markup never fails; an unterminated block is
/// filled to the end of the input.
pub fn normalize(text: &str, fill: char, newline: char) -> String {
    let text = fill_matches(&SELF_CLOSING_SCRIPT, text, fill);
    let text = fill_matches(&SELF_CLOSING_STYLE, &text, fill);
    let text = text.replace(NBSP_ENTITY, NBSP_SPACES);
    let text: String = text
        .chars()
        .map(|c| if c == '\r' || c == '\n' { newline } else { c })
        .collect();
    let text = fill_matches(&SCRIPT_BLOCK, &text, fill);
    let text = fill_matches(&STYLE_BLOCK, &text, fill);
    fill_matches(&VOCABULARY_TAG, &text, fill)
}

pub(crate) fn fill_matches(re: &Regex, text: &str, fill: char) -> String {
    re.replace_all(text, |caps: &Captures| {
        std::iter::repeat(fill).take(caps[0].chars().count()).collect::<String>()
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dots(n: usize) -> String {
        ".".repeat(n)
    }

    #[test]
    fn test_mixed_markup_is_filled() {
        let src = "<script src=\"s.js\"/> <SCRIPT lang=\"js\"> script1\n </script> text1 <1 month\r\n<BR>text2 <script> script2 </script> text3&nbsp;</p>";
        let expected = format!(
            "{} {} text1 <1 month\n\n{}text2 {} text3      {}",
            dots(20),
            dots(37),
            dots(4),
            dots(26),
            dots(4)
        );
        let out = normalize(src, '.', '\n');
        assert_eq!(out, expected);
        assert_eq!(out.chars().count(), src.chars().count());
    }

    #[test]
    fn test_newline_substitution() {
        let out = normalize("a\r\nb<br>c", ' ', ' ');
        assert_eq!(out, "a  b    c");
    }

    #[test]
    fn test_style_block_spanning_lines() {
        let src = "<html>\n<style>\nP { color: red; }\n</style>\n<P><BR><P>\nThere is";
        let out = normalize(src, '.', '\n');
        assert_eq!(out, format!("{}\n{}\n{}\nThere is", dots(6), dots(34), dots(10)));
    }

    #[test]
    fn test_unterminated_block_is_over_redacted() {
        let out = normalize("keep <style> p { x } and the rest", '.', '\n');
        assert_eq!(out, format!("keep {}", dots(28)));
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let src = "The patient has a cyst.";
        assert_eq!(Normalizer::default().apply(src), src);
    }

    #[test]
    fn test_multibyte_text_preserves_char_count() {
        let src = "Ärztin <b>Zoë</b> – bestätigt";
        let out = normalize(src, '·', '\n');
        assert_eq!(out.chars().count(), src.chars().count());
        assert_eq!(out, "Ärztin ···Zoë···· – bestätigt");
    }
}
