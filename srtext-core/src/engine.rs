// srtext-core/src/engine.rs
//! Defines the `AlignmentEngine` trait used by the span redactor.
//!
//! An annotator may have reflowed or decoded the text before computing its
//! offsets, so a span's start can sit a few characters away from where its
//! text now appears. An engine decides which fragments a span may belong to
//! and which offset corrections to try, in order. The first correction under
//! which the fragment text equals the span text wins.
//!
//! License: MIT OR APACHE 2.0

use std::ops::Range;

use crate::span::Span;

/// Strategy for re-locating spans whose offsets drifted.
pub trait AlignmentEngine: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Whether `span` is close enough to the fragment occupying `body` (body
    /// coordinates, line terminator included) to be searched for in it.
    fn admits(&self, span: &Span, last_delta: isize, body: &Range<usize>) -> bool;

    /// Offset corrections to try, most likely first.
    fn candidates(&self, last_delta: isize) -> Vec<isize>;

    /// Finds the correction under which `fragment[start + Δ .. end + Δ]`
    /// equals `text`. `start` and `end` are relative to the fragment and may
    /// be negative; candidates that fall outside the fragment never match.
    fn locate(
        &self,
        fragment: &[char],
        start: isize,
        end: isize,
        text: &str,
        last_delta: isize,
    ) -> Option<isize> {
        let wanted: Vec<char> = text.chars().collect();
        self.candidates(last_delta).into_iter().find(|delta| {
            let (Some(from), Some(to)) = (start.checked_add(*delta), end.checked_add(*delta)) else {
                return false;
            };
            if from < 0 || to < from || to as usize > fragment.len() {
                return false;
            }
            same_ignoring_line_breaks(&fragment[from as usize..to as usize], &wanted)
        })
    }
}

/// Compares text treating `\r` and `\n` as spaces on both sides.
pub fn same_ignoring_line_breaks(a: &[char], b: &[char]) -> bool {
    let fold = |c: &char| match c {
        '\r' | '\n' => ' ',
        other => *other,
    };
    a.len() == b.len() && a.iter().map(fold).eq(b.iter().map(fold))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_breaks_compare_as_spaces() {
        let a: Vec<char> = "a\nb".chars().collect();
        let b: Vec<char> = "a b".chars().collect();
        let c: Vec<char> = "a\rb".chars().collect();
        assert!(same_ignoring_line_breaks(&a, &b));
        assert!(same_ignoring_line_breaks(&c, &a));
        assert!(!same_ignoring_line_breaks(&a, &b[..2]));
    }
}
