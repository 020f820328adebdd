// srtext-markup/src/lines/mod.rs
//! Line/column-stable normalization.
//!
//! Some consumers report positions as `(line, column)` rather than as a flat
//! offset. For those, markup is filled like [`crate::normalize`] does, but
//! every `\r` and `\n` is copied through untouched, even inside a blanked
//! block, so a position computed on the output is valid on the input.

use regex::{Captures, Regex};

use crate::vocabulary::{
    NBSP_ENTITY, SCRIPT_BLOCK, SELF_CLOSING_SCRIPT, SELF_CLOSING_STYLE, STYLE_BLOCK,
    VOCABULARY_TAG,
};

/// A 1-based line and column. Columns count chars, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Fills markup with `fill` while keeping every line terminator in place.
pub fn normalize_lines(text: &str, fill: char) -> String {
    let text = fill_keeping_breaks(&SELF_CLOSING_SCRIPT, text, fill);
    let text = fill_keeping_breaks(&SELF_CLOSING_STYLE, &text, fill);
    let text = text.replace(NBSP_ENTITY, "      ");
    let text = fill_keeping_breaks(&SCRIPT_BLOCK, &text, fill);
    let text = fill_keeping_breaks(&STYLE_BLOCK, &text, fill);
    fill_keeping_breaks(&VOCABULARY_TAG, &text, fill)
}

fn fill_keeping_breaks(re: &Regex, text: &str, fill: char) -> String {
    re.replace_all(text, |caps: &Captures| {
        caps[0]
            .chars()
            .map(|c| if c == '\r' || c == '\n' { c } else { fill })
            .collect::<String>()
    })
    .into_owned()
}

/// Maps char offsets to line/column positions and back.
///
/// `\n`, `\r\n` and a lone `\r` each end one line.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        let mut chars = text.chars().peekable();
        let mut offset = 0;
        while let Some(c) = chars.next() {
            offset += 1;
            match c {
                '\n' => starts.push(offset),
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                        offset += 1;
                    }
                    starts.push(offset);
                }
                _ => {}
            }
        }
        Self { starts, len: offset }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Position of the char at `offset`; `offset == len` names the end of input.
    pub fn position(&self, offset: usize) -> Option<Position> {
        if offset > self.len {
            return None;
        }
        let line = match self.starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        Some(Position {
            line: line + 1,
            column: offset - self.starts[line] + 1,
        })
    }

    /// Char offset of `pos`, if the position exists in the text.
    pub fn offset(&self, pos: Position) -> Option<usize> {
        if pos.line == 0 || pos.column == 0 {
            return None;
        }
        let start = *self.starts.get(pos.line - 1)?;
        let offset = start + pos.column - 1;
        let limit = match self.starts.get(pos.line) {
            Some(next) => *next,
            None => self.len + 1,
        };
        (offset < limit).then_some(offset)
    }
}
