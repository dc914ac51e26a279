//! Pipeline coordinator - runs hashing then comparison
//!
//! The coordinator is responsible for:
//! - Running the hashing phase with the configured strategy
//! - Running the comparison phase when one is configured
//! - Timing each phase
//!
//! Each phase completes before its results are read. A configuration error
//! is raised before either phase starts.

use crate::compare::{compare_trees, ComparisonOutcome};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::hashing::{compute_hashes, group_trees, HashOutcome};
use crate::tree::Bst;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Hash buckets and hashing time
    pub hash: HashOutcome,

    /// Wall time for the whole hashing phase, including aggregation
    pub hash_group_time: Duration,

    /// Comparison output; `None` when comparison is disabled
    pub comparison: Option<ComparisonOutcome>,
}

/// Runs the phases for a fixed configuration
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline from validated configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Hash and group `trees`, then compare candidates if enabled
    pub fn run(&self, trees: &[Bst]) -> Result<PipelineResult> {
        info!(
            trees = trees.len(),
            hashing = %self.config.hash_strategy,
            hash_threads = self.config.hash_strategy.workers(),
            "Starting pipeline"
        );

        let start = Instant::now();
        let hash = group_trees(trees, self.config.hash_strategy)?;
        let hash_group_time = start.elapsed();

        let comparison = match self.config.compare_strategy {
            Some(strategy) => Some(compare_trees(trees, &hash.groups, strategy)?),
            None => {
                debug!("Comparison disabled");
                None
            }
        };

        Ok(PipelineResult {
            hash,
            hash_group_time,
            comparison,
        })
    }
}

/// Hash-only timings for one thread per tree vs a fixed partition count
#[derive(Debug, Clone)]
pub struct HashTimings {
    /// One thread per tree
    pub per_tree: Duration,

    /// Number of partitioned workers
    pub workers: usize,

    /// `workers` partitions
    pub partitioned: Duration,
}

/// Time [`compute_hashes`] with one thread per tree and with `workers` threads
pub fn measure_hash_timing(trees: &[Bst], workers: usize) -> Result<HashTimings> {
    let start = Instant::now();
    compute_hashes(trees, trees.len().max(1))?;
    let per_tree = start.elapsed();

    let start = Instant::now();
    compute_hashes(trees, workers)?;
    let partitioned = start.elapsed();

    debug!(
        per_tree_us = per_tree.as_micros() as u64,
        partitioned_us = partitioned.as_micros() as u64,
        workers = workers,
        "Hash timing complete"
    );

    Ok(HashTimings {
        per_tree,
        workers,
        partitioned,
    })
}
