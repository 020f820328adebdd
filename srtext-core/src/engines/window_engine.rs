// srtext-core/src/engines/window_engine.rs
//! An `AlignmentEngine` that searches a symmetric window of offset
//! corrections around the last correction that worked.
//!
//! This is a heuristic. Text that recurs verbatim within the window can be
//! matched at the wrong occurrence, and drift larger than the window is never
//! recovered; both outcomes are bounded by the window size.
//!
//! License: MIT OR APACHE 2.0

use std::ops::Range;

use crate::engine::AlignmentEngine;
use crate::span::Span;

pub const DEFAULT_WINDOW: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEngine {
    window: isize,
}

impl WindowEngine {
    /// `window` is clamped to at least one character.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.clamp(1, isize::MAX as usize) as isize,
        }
    }

    pub fn window(&self) -> usize {
        self.window as usize
    }
}

impl Default for WindowEngine {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl AlignmentEngine for WindowEngine {
    fn name(&self) -> &'static str {
        "window"
    }

    fn admits(&self, span: &Span, last_delta: isize, body: &Range<usize>) -> bool {
        let anchor = span.start as isize + last_delta;
        anchor >= body.start as isize - self.window && anchor < body.end as isize + self.window
    }

    /// `last_delta`, then `0, -1, +1, -2, +2, ...` up to `-window`.
    fn candidates(&self, last_delta: isize) -> Vec<isize> {
        let mut out = Vec::with_capacity(2 * self.window as usize + 1);
        out.push(last_delta);
        let mut push = |d: isize| {
            if d != last_delta {
                out.push(d);
            }
        };
        push(0);
        for step in 1..self.window {
            push(-step);
            push(step);
        }
        push(-self.window);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_candidate_order() {
        let engine = WindowEngine::new(3);
        assert_eq!(engine.candidates(0), vec![0, -1, 1, -2, 2, -3]);
        assert_eq!(engine.candidates(2), vec![2, 0, -1, 1, -2, -3]);
        assert_eq!(engine.candidates(7), vec![7, 0, -1, 1, -2, 2, -3]);
    }

    #[test]
    fn test_admission_window() {
        let engine = WindowEngine::new(4);
        let body = 10..20;
        assert!(engine.admits(&Span::new(6, 8, "ab"), 0, &body));
        assert!(!engine.admits(&Span::new(5, 8, "abc"), 0, &body));
        assert!(engine.admits(&Span::new(23, 25, "ab"), 0, &body));
        assert!(!engine.admits(&Span::new(24, 25, "a"), 0, &body));
        assert!(engine.admits(&Span::new(24, 25, "a"), -1, &body));
    }

    #[test]
    fn test_locates_drifted_text() {
        let engine = WindowEngine::default();
        let fragment = chars("....The patient has a cyst.\n");
        assert_eq!(engine.locate(&fragment, 0, 3, "The", 0), Some(4));
        assert_eq!(engine.locate(&fragment, 8, 15, "patient", 0), Some(0));
        assert_eq!(engine.locate(&fragment, 0, 5, "tumor", 0), None);
    }

    #[test]
    fn test_out_of_bounds_candidates_never_match() {
        let engine = WindowEngine::new(2);
        let fragment = chars("abc\n");
        assert_eq!(engine.locate(&fragment, -5, -4, "a", 0), None);
        assert_eq!(engine.locate(&fragment, -1, 0, "a", 0), Some(1));
        assert_eq!(engine.locate(&fragment, 3, 5, "c\n", 0), Some(-1));
    }
}
