//! Configuration types for bst-equiv
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Pipeline configuration with validation
//!
//! Worker counts are checked here, before any phase starts. A zero hash
//! worker count would divide by zero when partitioning, and a zero-capacity
//! queue could never be drained.

use crate::compare::CompareStrategy;
use crate::error::ConfigError;
use crate::hashing::HashStrategy;
use clap::Parser;
use std::path::PathBuf;

/// Maximum reasonable worker count for any phase
pub const MAX_WORKERS: usize = 4096;

/// Group binary search trees by identical in-order sequence
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bst-equiv",
    version,
    about = "Group binary search trees by identical in-order sequence",
    long_about = "Reads one tree per line (whitespace-separated integers, first is the root),\n\
                  hashes every tree, and optionally confirms same-hash trees pairwise.\n\n\
                  Hashing: --hash-workers 1 is sequential; otherwise --data-workers 1 funnels\n\
                  results through a channel to one aggregator, and anything else inserts\n\
                  under a shared lock.\n\n\
                  Comparison: --comp-workers 0 skips it, 1 is sequential, more uses a\n\
                  worker pool behind a bounded queue.",
    after_help = "EXAMPLES:\n    \
        bst-equiv --input trees.txt\n    \
        bst-equiv --input trees.txt --hash-workers 8 --data-workers 1\n    \
        bst-equiv --input trees.txt --hash-workers 8 --data-workers 8 --comp-workers 4\n    \
        bst-equiv --input trees.txt --comp-workers 4 --spawn-per-pair"
)]
pub struct CliArgs {
    /// Input file, one tree per line
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Threads computing hashes
    #[arg(long, default_value_t = 1, value_name = "NUM")]
    pub hash_workers: usize,

    /// Threads inserting into the hash map (1 = channel to a single aggregator)
    #[arg(long, default_value_t = 1, value_name = "NUM")]
    pub data_workers: usize,

    /// Threads comparing trees (0 = skip comparison)
    #[arg(long, default_value_t = 0, value_name = "NUM")]
    pub comp_workers: usize,

    /// Worker pool queue capacity (defaults to --comp-workers)
    #[arg(long, value_name = "NUM")]
    pub queue_size: Option<usize>,

    /// Compare with one thread per candidate pair instead of a worker pool
    #[arg(long)]
    pub spawn_per_pair: bool,

    /// Also time hashing alone: one thread per tree vs --hash-workers threads
    #[arg(long)]
    pub hash_timing: bool,

    /// Print every tree's in-order sequence after loading
    #[arg(long)]
    pub print_trees: bool,

    /// Quiet mode - suppress the run header
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated strategy selection for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Hashing strategy
    pub hash_strategy: HashStrategy,

    /// Comparison strategy; `None` skips the comparison phase
    pub compare_strategy: Option<CompareStrategy>,
}

impl PipelineConfig {
    /// Validate worker counts and select strategies
    ///
    /// `hash_workers` and `data_workers` must be at least 1; `comp_workers`
    /// may be 0 to skip comparison.
    pub fn new(
        hash_workers: usize,
        data_workers: usize,
        comp_workers: usize,
    ) -> Result<Self, ConfigError> {
        check_upper("hash worker", hash_workers)?;
        check_upper("data worker", data_workers)?;
        check_upper("comparison worker", comp_workers)?;

        Ok(Self {
            hash_strategy: HashStrategy::select(hash_workers, data_workers)?,
            compare_strategy: CompareStrategy::select(comp_workers, false, None)?,
        })
    }

    /// Replace the comparison strategy
    pub fn with_compare_strategy(mut self, strategy: Option<CompareStrategy>) -> Self {
        self.compare_strategy = strategy;
        self
    }
}

fn check_upper(role: &'static str, count: usize) -> Result<(), ConfigError> {
    if count > MAX_WORKERS {
        return Err(ConfigError::TooManyWorkers {
            role,
            count,
            max: MAX_WORKERS,
        });
    }
    Ok(())
}

/// Validated runtime configuration for the CLI
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Input file
    pub input_path: PathBuf,

    /// Strategies for the pipeline
    pub pipeline: PipelineConfig,

    /// Configured hash worker count (used by hash timing)
    pub hash_workers: usize,

    /// Run the standalone hash timing comparison
    pub hash_timing: bool,

    /// Print trees after loading
    pub print_trees: bool,

    /// Show run header
    pub show_header: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl RunConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if !args.input.is_file() {
            return Err(ConfigError::InvalidInputPath {
                path: args.input.clone(),
                reason: "not a readable file".to_string(),
            });
        }

        let pipeline = PipelineConfig::new(args.hash_workers, args.data_workers, args.comp_workers)?;
        let compare_strategy =
            CompareStrategy::select(args.comp_workers, args.spawn_per_pair, args.queue_size)?;

        Ok(Self {
            input_path: args.input,
            pipeline: pipeline.with_compare_strategy(compare_strategy),
            hash_workers: args.hash_workers,
            hash_timing: args.hash_timing,
            print_trees: args.print_trees,
            show_header: !args.quiet,
            verbose: args.verbose,
        })
    }
}
