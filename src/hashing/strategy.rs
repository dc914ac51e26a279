//! Hashing strategies
//!
//! The partitioned strategies split `0..N` into contiguous ranges, one per
//! worker. Each range has `N / W` trees and the first `N % W` ranges get one
//! extra, so every index is covered exactly once.

use crate::error::{ConfigError, Result, WorkerError};
use crate::hashing::groups::{HashGroups, HashOutcome};
use crate::tree::{Bst, TreeHash};
use crate::worker::{join_all, spawn_scoped, MAX_LIVE_THREADS};
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::ops::Range;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Instant;
use tracing::{debug, info};

/// Capacity of the channel between hash workers and the aggregator
pub const HASH_CHANNEL_CAPACITY: usize = 5;

/// How hashes are computed and aggregated into [`HashGroups`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashStrategy {
    /// One thread hashes every tree, then inserts every index
    Sequential,

    /// Workers send `(hash, index)` over a bounded channel; the calling
    /// thread is the only writer to the mapping
    Channel { workers: usize },

    /// Workers insert directly under one shared mutex
    Locked { workers: usize },
}

impl HashStrategy {
    /// Pick a strategy from the configured worker counts
    ///
    /// `hash_workers == 1` selects [`HashStrategy::Sequential`]; otherwise
    /// `data_workers == 1` selects [`HashStrategy::Channel`] and anything
    /// else [`HashStrategy::Locked`]. Zero counts are rejected.
    pub fn select(hash_workers: usize, data_workers: usize) -> std::result::Result<Self, ConfigError> {
        if hash_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount {
                role: "hash worker",
                count: hash_workers,
                min: 1,
            });
        }
        if data_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount {
                role: "data worker",
                count: data_workers,
                min: 1,
            });
        }

        Ok(match (hash_workers, data_workers) {
            (1, _) => HashStrategy::Sequential,
            (workers, 1) => HashStrategy::Channel { workers },
            (workers, _) => HashStrategy::Locked { workers },
        })
    }

    /// Number of hashing threads this strategy starts
    pub fn workers(&self) -> usize {
        match *self {
            HashStrategy::Sequential => 1,
            HashStrategy::Channel { workers } | HashStrategy::Locked { workers } => workers,
        }
    }
}

impl fmt::Display for HashStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashStrategy::Sequential => write!(f, "sequential"),
            HashStrategy::Channel { workers } => write!(f, "channel ({} workers)", workers),
            HashStrategy::Locked { workers } => write!(f, "locked ({} workers)", workers),
        }
    }
}

/// Split `0..len` into `workers` contiguous ranges
///
/// Ranges past the end of the input are empty. `workers` must be non-zero.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    assert!(workers > 0, "partition requires at least one worker");

    let base = len / workers;
    let extra = len % workers;
    let mut start = 0;

    (0..workers)
        .map(|i| {
            let end = start + base + usize::from(i < extra);
            let range = start..end;
            start = end;
            range
        })
        .collect()
}

/// Hash and group all trees with the given strategy
pub fn group_trees(trees: &[Bst], strategy: HashStrategy) -> Result<HashOutcome> {
    info!(trees = trees.len(), strategy = %strategy, "Hashing trees");

    let outcome = match strategy {
        HashStrategy::Sequential => group_sequential(trees),
        HashStrategy::Channel { workers } => group_channel(trees, workers)?,
        HashStrategy::Locked { workers } => group_locked(trees, workers)?,
    };

    debug!(
        buckets = outcome.groups.len(),
        candidates = outcome.groups.candidate_count(),
        hash_us = outcome.hash_time.as_micros() as u64,
        "Hashing complete"
    );

    Ok(outcome)
}

/// Hash only the trees, reporting time for hashing alone
fn group_sequential(trees: &[Bst]) -> HashOutcome {
    let start = Instant::now();
    let hashes: Vec<TreeHash> = trees.iter().map(Bst::structural_hash).collect();
    let hash_time = start.elapsed();

    let mut groups = HashGroups::new();
    for (index, hash) in hashes.into_iter().enumerate() {
        groups.insert(hash, index);
    }

    HashOutcome { groups, hash_time }
}

fn group_channel(trees: &[Bst], workers: usize) -> Result<HashOutcome> {
    let start = Instant::now();

    let groups = thread::scope(|scope| -> Result<HashGroups> {
        // Owned by the closure so an early return drops the receiver and
        // unblocks any sender already started
        let (tx, rx) = bounded::<(TreeHash, usize)>(HASH_CHANNEL_CAPACITY);

        let mut handles = Vec::with_capacity(workers);
        for (id, range) in partition(trees.len(), workers).into_iter().enumerate() {
            handles.push(spawn_sender(scope, id, trees, range, tx.clone())?);
        }
        drop(tx);

        let mut groups = HashGroups::new();
        let mut received = 0;
        for (hash, index) in rx.iter() {
            groups.insert(hash, index);
            received += 1;
        }

        join_all(handles)?;

        if received != trees.len() {
            return Err(WorkerError::ChannelClosed {
                received,
                expected: trees.len(),
            }
            .into());
        }
        Ok(groups)
    })?;

    Ok(HashOutcome {
        groups,
        hash_time: start.elapsed(),
    })
}

/// Hash `range` and send each result to the aggregator
///
/// Stops early once the receiver is gone.
fn spawn_sender<'scope>(
    scope: &'scope Scope<'scope, '_>,
    id: usize,
    trees: &'scope [Bst],
    range: Range<usize>,
    tx: Sender<(TreeHash, usize)>,
) -> std::result::Result<ScopedJoinHandle<'scope, ()>, WorkerError> {
    spawn_scoped(scope, format!("hash-{}", id), move || {
        for index in range {
            if tx.send((trees[index].structural_hash(), index)).is_err() {
                break;
            }
        }
    })
}

fn group_locked(trees: &[Bst], workers: usize) -> Result<HashOutcome> {
    let start = Instant::now();
    let shared = Mutex::new(HashGroups::new());

    thread::scope(|scope| -> Result<()> {
        let shared = &shared;
        let mut handles = Vec::with_capacity(workers);
        for (id, range) in partition(trees.len(), workers).into_iter().enumerate() {
            let handle = spawn_scoped(scope, format!("hash-{}", id), move || {
                for index in range {
                    let hash = trees[index].structural_hash();
                    shared.lock().insert(hash, index);
                }
            })?;
            handles.push(handle);
        }
        join_all(handles)?;
        Ok(())
    })?;

    Ok(HashOutcome {
        groups: shared.into_inner(),
        hash_time: start.elapsed(),
    })
}

/// Compute every tree's hash across `workers` partitions, without grouping
///
/// Each worker writes its own disjoint slice of the result, so no lock is
/// needed. Passing `trees.len()` as `workers` runs one thread per tree.
/// Threads start in waves of at most [`MAX_LIVE_THREADS`]; each wave is
/// joined before the next begins.
pub fn compute_hashes(trees: &[Bst], workers: usize) -> Result<Vec<TreeHash>> {
    if workers == 0 {
        return Err(ConfigError::InvalidWorkerCount {
            role: "hash worker",
            count: workers,
            min: 1,
        }
        .into());
    }

    let mut hashes = vec![0; trees.len()];
    let mut rest = hashes.as_mut_slice();
    let mut work = Vec::with_capacity(workers);
    for range in partition(trees.len(), workers) {
        let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
        rest = tail;
        work.push((chunk, &trees[range]));
    }

    thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(workers.min(MAX_LIVE_THREADS));

        for (id, (chunk, slice)) in work.into_iter().enumerate() {
            if handles.len() == MAX_LIVE_THREADS {
                join_all(std::mem::take(&mut handles))?;
            }
            let handle = spawn_scoped(scope, format!("hash-{}", id), move || {
                for (out, tree) in chunk.iter_mut().zip(slice) {
                    *out = tree.structural_hash();
                }
            })?;
            handles.push(handle);
        }

        join_all(handles)?;
        Ok(())
    })?;

    Ok(hashes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trees(n: usize) -> Vec<Bst> {
        (0..n)
            .map(|i| {
                let i = i as i64;
                // Every third tree repeats an earlier sequence in a new order
                let values = match i % 3 {
                    0 => vec![10, 5, 15],
                    1 => vec![i, i + 1, i - 1],
                    _ => vec![15, 10, 5],
                };
                Bst::from_values(&values).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_partition_sizes() {
        let sizes: Vec<_> = partition(10, 4).iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_partition_covers_exactly_once() {
        for len in 0..25 {
            for workers in 1..9 {
                let ranges = partition(len, workers);
                assert_eq!(ranges.len(), workers);
                let covered: Vec<usize> = ranges.into_iter().flatten().collect();
                assert_eq!(covered, (0..len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_partition_more_workers_than_items() {
        let ranges = partition(2, 5);
        let sizes: Vec<_> = ranges.iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_select_strategy() {
        assert_eq!(HashStrategy::select(1, 1).unwrap(), HashStrategy::Sequential);
        assert_eq!(HashStrategy::select(1, 8).unwrap(), HashStrategy::Sequential);
        assert_eq!(
            HashStrategy::select(4, 1).unwrap(),
            HashStrategy::Channel { workers: 4 }
        );
        assert_eq!(
            HashStrategy::select(4, 2).unwrap(),
            HashStrategy::Locked { workers: 4 }
        );
    }

    #[test]
    fn test_select_rejects_zero() {
        assert!(HashStrategy::select(0, 1).is_err());
        assert!(HashStrategy::select(2, 0).is_err());
    }

    #[test]
    fn test_strategies_agree() {
        let trees = sample_trees(10);
        let expected = group_trees(&trees, HashStrategy::Sequential)
            .unwrap()
            .groups;

        for strategy in [
            HashStrategy::Channel { workers: 4 },
            HashStrategy::Locked { workers: 4 },
            HashStrategy::Channel { workers: 13 },
            HashStrategy::Locked { workers: 1 },
        ] {
            let groups = group_trees(&trees, strategy).unwrap().groups;
            assert_eq!(groups.normalized(), expected.normalized(), "{strategy}");
            assert_eq!(groups.tree_count(), trees.len());
        }
    }

    #[test]
    fn test_sequential_is_deterministic() {
        let trees = sample_trees(9);
        let groups = group_trees(&trees, HashStrategy::Sequential).unwrap().groups;
        let bucket = groups.get(trees[0].structural_hash()).unwrap();
        // trees 0, 2, 3, 5, 6, 8 all hold 5 10 15
        assert_eq!(bucket, &[0, 2, 3, 5, 6, 8]);
    }

    #[test]
    fn test_empty_input() {
        for strategy in [
            HashStrategy::Sequential,
            HashStrategy::Channel { workers: 3 },
            HashStrategy::Locked { workers: 3 },
        ] {
            let outcome = group_trees(&[], strategy).unwrap();
            assert!(outcome.groups.is_empty());
        }
    }

    #[test]
    fn test_strategy_workers() {
        assert_eq!(HashStrategy::Sequential.workers(), 1);
        assert_eq!(HashStrategy::Channel { workers: 6 }.workers(), 6);
        assert_eq!(HashStrategy::Locked { workers: 3 }.workers(), 3);
    }

    #[test]
    fn test_sender_exits_when_receiver_dropped() {
        let trees = sample_trees(200);
        let finished = thread::scope(|scope| {
            let (tx, rx) = bounded(HASH_CHANNEL_CAPACITY);
            let handle = spawn_sender(scope, 0, &trees, 0..trees.len(), tx).unwrap();
            // Take a few results, then abandon the rest as a failed spawn would
            for _ in 0..3 {
                rx.recv().unwrap();
            }
            drop(rx);
            join_all(vec![handle])
        });
        assert!(finished.is_ok());
    }

    #[test]
    fn test_compute_hashes_one_thread_per_tree_in_waves() {
        let trees = sample_trees(50_000);
        let expected: Vec<_> = trees.iter().map(Bst::structural_hash).collect();
        assert_eq!(compute_hashes(&trees, trees.len()).unwrap(), expected);
    }

    #[test]
    fn test_compute_hashes_matches_sequential() {
        let trees = sample_trees(11);
        let expected: Vec<_> = trees.iter().map(Bst::structural_hash).collect();
        assert_eq!(compute_hashes(&trees, 3).unwrap(), expected);
        assert_eq!(compute_hashes(&trees, trees.len()).unwrap(), expected);
        assert!(compute_hashes(&trees, 0).is_err());
    }
}
