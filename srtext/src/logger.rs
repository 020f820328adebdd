// srtext/src/logger.rs
//! Logger setup for the srtext binary.
//!
//! `--debug` turns on debug output for the srtext crates only, `--quiet`
//! silences everything, and otherwise `RUST_LOG` applies with `warn` as the
//! fallback. Span text in debug lines stays masked unless
//! `SRTEXT_ALLOW_DEBUG_PII=true`.
//! License: MIT OR APACHE 2.0

use env_logger::{Builder, Env};
use log::LevelFilter;

const OWN_CRATES: [&str; 3] = ["srtext", "srtext_core", "srtext_markup"];

/// The level override implied by the global flags, if any.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

/// Initializes `env_logger`. Calling it twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    match level {
        Some(LevelFilter::Off) => {
            builder.filter_level(LevelFilter::Off);
        }
        Some(level) => {
            for name in OWN_CRATES {
                builder.filter_module(name, level);
            }
        }
        None => {}
    }
    builder.format_timestamp(None).format_target(true);
    let _ = builder.try_init();
}
