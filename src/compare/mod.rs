//! Pairwise confirmation of hash-bucket candidates
//!
//! Trees sharing a hash are only candidates; this module compares their
//! in-order sequences and turns confirmed matches into equivalence groups.
//!
//! # Architecture (worker pool)
//!
//! ```text
//!  ┌──────────────────────┐
//!  │  Producer thread     │  every in-bucket pair, then W × Shutdown
//!  └──────────┬───────────┘
//!             │ push (blocks while full)
//!             ▼
//!  ┌──────────────────────┐
//!  │    BoundedQueue      │  Mutex + not_empty / not_full
//!  │  + EquivalenceRecord │  (result writes share the queue lock)
//!  └──────────┬───────────┘
//!             │ pop (blocks while empty)
//!    ┌────────┼────────┐
//!    ▼        ▼        ▼
//!  compare-0 compare-1 compare-W
//! ```

pub mod engine;
pub mod equivalence;
pub mod queue;

pub use engine::{compare_sequential, compare_unbounded, compare_worker_pool};
pub use equivalence::EquivalenceRecord;
pub use queue::{BoundedQueue, QueueState, QueueStats};

use crate::error::{ConfigError, Result};
use crate::hashing::HashGroups;
use crate::tree::Bst;
use crate::worker::WorkerStats;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::info;

/// Two tree indices from the same hash bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidatePair {
    /// Index appearing earlier in the bucket
    pub first: usize,

    /// Index appearing later in the bucket
    pub second: usize,
}

impl CandidatePair {
    /// Pair `first` with a later bucket member `second`
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }
}

/// Item carried by the worker pool queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Compare the two trees
    Compare(CandidatePair),

    /// Stop the worker that pops this
    Shutdown,
}

/// How candidate pairs are spread across threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareStrategy {
    /// Calling thread only; deterministic
    Sequential,

    /// One thread per candidate pair, one mutex for results
    Unbounded,

    /// Fixed pool fed through a [`BoundedQueue`]
    WorkerPool {
        workers: usize,
        queue_capacity: usize,
    },
}

impl CompareStrategy {
    /// Pick a strategy from the configured comparison worker count
    ///
    /// Returns `None` for zero workers: the comparison phase is skipped.
    /// One worker selects [`CompareStrategy::Sequential`]; more select the
    /// worker pool, or [`CompareStrategy::Unbounded`] when `spawn_per_pair`
    /// is set. The pool's queue holds `queue_size` jobs, defaulting to the
    /// worker count.
    pub fn select(
        comp_workers: usize,
        spawn_per_pair: bool,
        queue_size: Option<usize>,
    ) -> std::result::Result<Option<Self>, ConfigError> {
        if let Some(size) = queue_size {
            if size == 0 {
                return Err(ConfigError::InvalidQueueSize { size });
            }
        }

        Ok(match comp_workers {
            0 => None,
            1 => Some(CompareStrategy::Sequential),
            _ if spawn_per_pair => Some(CompareStrategy::Unbounded),
            workers => Some(CompareStrategy::WorkerPool {
                workers,
                queue_capacity: queue_size.unwrap_or(workers),
            }),
        })
    }
}

impl fmt::Display for CompareStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareStrategy::Sequential => write!(f, "sequential"),
            CompareStrategy::Unbounded => write!(f, "thread per pair"),
            CompareStrategy::WorkerPool {
                workers,
                queue_capacity,
            } => write!(f, "worker pool ({} workers, queue {})", workers, queue_capacity),
        }
    }
}

/// Result of the comparison phase
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    /// Equivalence classes, ordered by smallest member
    pub groups: Vec<Vec<usize>>,

    /// Wall time for comparing and grouping
    pub compare_time: Duration,

    /// Candidate pairs compared
    pub comparisons: u64,

    /// Pairs confirmed equal
    pub matches: u64,
}

/// Confirm candidates in `groups` and return equivalence classes
pub fn compare_trees(
    trees: &[Bst],
    groups: &HashGroups,
    strategy: CompareStrategy,
) -> Result<ComparisonOutcome> {
    info!(
        candidates = groups.candidate_count(),
        strategy = %strategy,
        "Comparing candidate pairs"
    );

    let start = Instant::now();
    let stats = WorkerStats::default();

    let record = match strategy {
        CompareStrategy::Sequential => compare_sequential(trees, groups, &stats),
        CompareStrategy::Unbounded => compare_unbounded(trees, groups, &stats)?,
        CompareStrategy::WorkerPool {
            workers,
            queue_capacity,
        } => compare_worker_pool(trees, groups, workers, queue_capacity, &stats)?,
    };
    let result_groups = record.into_groups();
    let compare_time = start.elapsed();

    info!(
        comparisons = stats.comparison_count(),
        matches = stats.match_count(),
        groups = result_groups.len(),
        "Comparison complete"
    );

    Ok(ComparisonOutcome {
        groups: result_groups,
        compare_time,
        comparisons: stats.comparison_count(),
        matches: stats.match_count(),
    })
}
