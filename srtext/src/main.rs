// srtext/src/main.rs
//! srtext entry point: parses arguments, sets up logging and dispatches.

use anyhow::Result;
use clap::Parser;

use srtext::cli::Cli;
use srtext::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug));
    srtext::run(cli)
}
