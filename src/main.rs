//! bst-equiv - Concurrent grouping of binary search trees
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use bst_equiv::config::{CliArgs, RunConfig};
use bst_equiv::pipeline::{measure_hash_timing, Pipeline};
use bst_equiv::report;
use bst_equiv::tree::load_trees;
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate worker counts before anything runs
    let config = RunConfig::from_args(args).context("Invalid configuration")?;

    let trees = load_trees(&config.input_path)
        .with_context(|| format!("Failed to load trees from {}", config.input_path.display()))?;
    info!(trees = trees.len(), "Loaded trees");

    if config.show_header {
        report::print_header(&config, trees.len());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if config.print_trees {
        report::write_trees(&mut out, &trees)?;
    }

    if config.hash_timing {
        let timings = measure_hash_timing(&trees, config.hash_workers)
            .context("Hash timing failed")?;
        report::write_hash_timings(&mut out, &timings)?;
    }

    let result = Pipeline::new(config.pipeline)
        .run(&trees)
        .context("Pipeline failed")?;

    report::write_result(&mut out, &result)?;
    out.flush()?;
    drop(out);

    if config.show_header {
        report::print_summary(&result);
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("bst_equiv=debug,warn")
    } else {
        EnvFilter::new("bst_equiv=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
