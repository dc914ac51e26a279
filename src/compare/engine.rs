//! Comparison strategies
//!
//! Each strategy tests every candidate pair from [`HashGroups`] and records
//! confirmed matches in an [`EquivalenceRecord`]. They differ only in how the
//! work is spread across threads and how result writes are serialized.

use crate::compare::equivalence::EquivalenceRecord;
use crate::compare::queue::BoundedQueue;
use crate::compare::{CandidatePair, Task};
use crate::error::{EquivError, Result};
use crate::hashing::HashGroups;
use crate::tree::Bst;
use crate::worker::{join_all, spawn_scoped, ReapingSet, WorkerStats};
use parking_lot::Mutex;
use std::thread;
use tracing::{debug, trace, warn};

fn is_match(trees: &[Bst], pair: CandidatePair) -> bool {
    trees[pair.first].same_structure(&trees[pair.second])
}

/// Compare every candidate pair on the calling thread
///
/// Buckets are visited in ascending hash order and pairs in ascending
/// position order, so the record is fully deterministic.
pub fn compare_sequential(
    trees: &[Bst],
    groups: &HashGroups,
    stats: &WorkerStats,
) -> EquivalenceRecord {
    let mut record = EquivalenceRecord::new(trees.len());

    for pair in groups.candidate_pairs() {
        let matched = is_match(trees, pair);
        stats.record_comparison(matched);
        if matched {
            record.link(pair.first, pair.second);
        }
    }

    record
}

/// Spawn one thread per candidate pair
///
/// All threads write through a single mutex. Nothing bounds the number of
/// threads alive at once; finished ones are reaped as spawning goes on.
pub fn compare_unbounded(
    trees: &[Bst],
    groups: &HashGroups,
    stats: &WorkerStats,
) -> Result<EquivalenceRecord> {
    let record = Mutex::new(EquivalenceRecord::new(trees.len()));

    thread::scope(|scope| -> Result<()> {
        let record = &record;
        let mut threads = ReapingSet::new();

        for (n, pair) in groups.candidate_pairs().enumerate() {
            let spawned = threads.spawn(scope, format!("pair-{}", n), move || {
                let matched = is_match(trees, pair);
                stats.record_comparison(matched);
                if matched {
                    record.lock().link(pair.first, pair.second);
                }
            });

            if let Err(e) = spawned {
                warn!(spawned = n, error = %e, "Stopping pair spawns");
                threads.join()?;
                return Err(e.into());
            }
        }

        threads.join()?;
        Ok(())
    })?;

    Ok(record.into_inner())
}

/// Fixed pool of `workers` threads fed through a [`BoundedQueue`]
///
/// One producer thread enumerates every candidate pair, then pushes exactly
/// one [`Task::Shutdown`] per worker. Workers exit on the first shutdown they
/// pop. Matches are written under the queue's own lock.
pub fn compare_worker_pool(
    trees: &[Bst],
    groups: &HashGroups,
    workers: usize,
    queue_capacity: usize,
    stats: &WorkerStats,
) -> Result<EquivalenceRecord> {
    let queue = BoundedQueue::with_shared_state(
        queue_capacity,
        EquivalenceRecord::new(trees.len()),
    )?;

    thread::scope(|scope| -> Result<()> {
        let queue = &queue;
        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let spawned = spawn_scoped(scope, format!("compare-{}", id), move || {
                worker_loop(id, trees, queue, stats)
            });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => return abort_pool(queue, handles, e.into()),
            }
        }

        let producer = spawn_scoped(scope, "compare-producer".to_string(), move || {
            let _shutdown = ShutdownGuard::new(queue, workers);
            let mut jobs = 0usize;
            for pair in groups.candidate_pairs() {
                queue.push(Task::Compare(pair));
                jobs += 1;
            }
            jobs
        });

        let producer = match producer {
            Ok(handle) => handle,
            Err(e) => return abort_pool(queue, handles, e.into()),
        };

        // Workers are joined before a producer failure is reported
        let produced = join_all(vec![producer]);
        let processed: usize = join_all(handles)?.into_iter().sum();
        let jobs: usize = produced?.into_iter().sum();

        debug!(
            jobs = jobs,
            processed = processed,
            full_waits = queue.stats().full_wait_count(),
            high_water = queue.stats().high_water_mark(),
            "Worker pool drained"
        );
        Ok(())
    })?;

    Ok(queue.into_shared())
}

/// Pop and compare until a shutdown arrives; returns pairs processed
fn worker_loop(
    id: usize,
    trees: &[Bst],
    queue: &BoundedQueue<Task, EquivalenceRecord>,
    stats: &WorkerStats,
) -> usize {
    let mut processed = 0;

    loop {
        match queue.pop() {
            Task::Compare(pair) => {
                let matched = is_match(trees, pair);
                stats.record_comparison(matched);
                if matched {
                    queue.with_shared(|record| record.link(pair.first, pair.second));
                }
                processed += 1;
            }
            Task::Shutdown => {
                stats.record_shutdown();
                trace!(worker = id, processed = processed, "Worker shutting down");
                return processed;
            }
        }
    }
}

/// Pushes one shutdown per worker when dropped
///
/// The producer holds one for its whole run, so workers are released even if
/// it unwinds partway through the candidate pairs.
struct ShutdownGuard<'a> {
    queue: &'a BoundedQueue<Task, EquivalenceRecord>,
    workers: usize,
}

impl<'a> ShutdownGuard<'a> {
    fn new(queue: &'a BoundedQueue<Task, EquivalenceRecord>, workers: usize) -> Self {
        Self { queue, workers }
    }
}

impl Drop for ShutdownGuard<'_> {
    fn drop(&mut self) {
        for _ in 0..self.workers {
            self.queue.push_shutdown();
        }
    }
}

/// Release workers that already started, then report `error`
fn abort_pool(
    queue: &BoundedQueue<Task, EquivalenceRecord>,
    handles: Vec<thread::ScopedJoinHandle<'_, usize>>,
    error: EquivError,
) -> Result<()> {
    warn!(started = handles.len(), error = %error, "Aborting worker pool");
    for _ in 0..handles.len() {
        queue.push_shutdown();
    }
    join_all(handles)?;
    Err(error)
}
