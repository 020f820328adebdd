// srtext-core/src/engines/mod.rs
//! Alignment engine implementations.
//!
//! Each engine is a separate file within this directory and implements the
//! `AlignmentEngine` trait.
//!
//! License: MIT OR APACHE 2.0

pub mod exact_engine;
pub mod window_engine;
