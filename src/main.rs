//! `repoinv` command-line entry point.

use anyhow::Context;
use clap::Parser;
use repoinv::cli::{self, Args};
use std::process;
use tracing::debug;

fn main() {
    let args = Args::parse();
    cli::setup_logging(&args);

    let result =
        cli::run(&args).with_context(|| format!("Failed to process {}", args.file.display()));

    match result {
        Ok(summary) => {
            debug!(
                skipped = summary.skipped,
                lines = summary.lines_written,
                "done"
            );
        },
        Err(error) => {
            eprintln!("Error: {error:#}");
            process::exit(1);
        },
    }
}
