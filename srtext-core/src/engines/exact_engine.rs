// srtext-core/src/engines/exact_engine.rs
//! An `AlignmentEngine` that trusts span offsets completely: a span must lie
//! inside one fragment and match at the stated position.
//!
//! License: MIT OR APACHE 2.0

use std::ops::Range;

use crate::engine::AlignmentEngine;
use crate::span::Span;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactEngine;

impl AlignmentEngine for ExactEngine {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn admits(&self, span: &Span, _last_delta: isize, body: &Range<usize>) -> bool {
        body.contains(&span.start)
    }

    fn candidates(&self, _last_delta: isize) -> Vec<isize> {
        vec![0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_zero_offset() {
        let fragment: Vec<char> = "xxThe cyst\n".chars().collect();
        assert_eq!(ExactEngine.locate(&fragment, 2, 5, "The", 3), Some(0));
        assert_eq!(ExactEngine.locate(&fragment, 0, 3, "The", 2), None);
        assert!(ExactEngine.admits(&Span::new(4, 6, "ab"), 0, &(0..5)));
        assert!(!ExactEngine.admits(&Span::new(5, 6, "a"), 0, &(0..5)));
    }
}
