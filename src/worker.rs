//! Named worker threads
//!
//! Every concurrent strategy runs its workers as scoped threads so they can
//! borrow the tree slice directly. These helpers give each thread a name for
//! log output and turn spawn failures and panics into [`WorkerError`]s.

use crate::error::WorkerError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};
use tracing::{trace, warn};

/// Live handles a [`ReapingSet`] holds before it joins finished threads, and
/// the most threads a wave of hash workers starts at once
pub const MAX_LIVE_THREADS: usize = 1024;

/// Statistics collected by comparison workers
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Candidate pairs compared
    pub comparisons: AtomicU64,

    /// Pairs confirmed equal
    pub matches: AtomicU64,

    /// Shutdown markers consumed
    pub shutdowns: AtomicU64,
}

impl WorkerStats {
    pub(crate) fn record_comparison(&self, matched: bool) {
        self.comparisons.fetch_add(1, Ordering::Relaxed);
        if matched {
            self.matches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::Relaxed);
    }

    /// Total comparisons performed
    pub fn comparison_count(&self) -> u64 {
        self.comparisons.load(Ordering::Relaxed)
    }

    /// Total confirmed matches
    pub fn match_count(&self) -> u64 {
        self.matches.load(Ordering::Relaxed)
    }

    /// Total shutdown markers consumed
    pub fn shutdown_count(&self) -> u64 {
        self.shutdowns.load(Ordering::Relaxed)
    }
}

/// Spawn a named scoped thread
pub fn spawn_scoped<'scope, 'env, F, T>(
    scope: &'scope Scope<'scope, 'env>,
    name: String,
    f: F,
) -> Result<ScopedJoinHandle<'scope, T>, WorkerError>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    trace!(worker = %name, "Spawning worker");
    thread::Builder::new()
        .name(name.clone())
        .spawn_scoped(scope, f)
        .map_err(|e| WorkerError::SpawnFailed {
            name,
            reason: e.to_string(),
        })
}

/// Join every handle, reporting the first worker that panicked
///
/// All handles are joined even after a panic is seen so no thread outlives
/// the call.
pub fn join_all<T>(handles: Vec<ScopedJoinHandle<'_, T>>) -> Result<Vec<T>, WorkerError> {
    let mut results = Vec::with_capacity(handles.len());
    let mut first_panic = None;

    for handle in handles {
        let name = handle.thread().name().unwrap_or("unnamed").to_string();
        match handle.join() {
            Ok(value) => results.push(value),
            Err(_) => {
                if first_panic.is_none() {
                    first_panic = Some(WorkerError::Panicked { name });
                }
            }
        }
    }

    match first_panic {
        Some(err) => Err(err),
        None => Ok(results),
    }
}

/// Scoped threads that are joined as soon as they finish
///
/// Spawning is unbounded, but finished threads are reaped whenever the live
/// count passes a threshold so the process never piles up exited threads.
/// If the OS refuses a new thread, every running one is joined and the spawn
/// is retried once.
pub struct ReapingSet<'scope, T> {
    handles: Vec<ScopedJoinHandle<'scope, T>>,
    finished: Vec<T>,
    reap_at: usize,
}

impl<'scope, T> ReapingSet<'scope, T> {
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            finished: Vec::new(),
            reap_at: MAX_LIVE_THREADS,
        }
    }

    /// Threads spawned and not yet joined
    pub fn live(&self) -> usize {
        self.handles.len()
    }

    /// Spawn a named thread, reaping finished ones first if needed
    pub fn spawn<'env, F>(
        &mut self,
        scope: &'scope Scope<'scope, 'env>,
        name: String,
        f: F,
    ) -> Result<(), WorkerError>
    where
        F: FnOnce() -> T + Clone + Send + 'scope,
        T: Send + 'scope,
    {
        if self.handles.len() >= self.reap_at {
            self.reap_finished()?;
            // Doubling keeps the scan amortized when most threads are still busy
            self.reap_at = (self.handles.len() * 2).max(MAX_LIVE_THREADS);
        }

        match spawn_scoped(scope, name.clone(), f.clone()) {
            Ok(handle) => self.handles.push(handle),
            Err(e) if self.handles.is_empty() => return Err(e),
            Err(e) => {
                warn!(live = self.handles.len(), error = %e, "Spawn refused, draining running threads");
                let running = std::mem::take(&mut self.handles);
                self.finished.extend(join_all(running)?);
                self.handles.push(spawn_scoped(scope, name, f)?);
            }
        }
        Ok(())
    }

    fn reap_finished(&mut self) -> Result<(), WorkerError> {
        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.handles)
            .into_iter()
            .partition(|h| h.is_finished());
        self.handles = running;
        trace!(reaped = done.len(), live = self.handles.len(), "Reaped threads");
        self.finished.extend(join_all(done)?);
        Ok(())
    }

    /// Join every remaining thread and return all results
    ///
    /// Results of reaped threads come first; order is otherwise unspecified.
    pub fn join(mut self) -> Result<Vec<T>, WorkerError> {
        let running = std::mem::take(&mut self.handles);
        let mut results = self.finished;
        results.extend(join_all(running)?);
        Ok(results)
    }
}

impl<T> Default for ReapingSet<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}
