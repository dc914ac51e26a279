//! Bounded blocking queue for the comparison worker pool
//!
//! A fixed-capacity FIFO built on a mutex and two condition variables. One
//! producer pushes jobs, W workers pop them. Pushing blocks while the queue
//! is full and popping blocks while it is empty; neither side spins.
//!
//! ```text
//!            push (waits on not_full)
//!   Empty ──────────────► Partial ──────────────► Full
//!     ▲                    │   ▲                    │
//!     └────────────────────┘   └────────────────────┘
//!            pop (waits on not_empty)
//! ```
//!
//! The mutex also guards an optional piece of shared state `S`. The worker
//! pool keeps its equivalence record there so result writes serialize on the
//! same lock as queue operations.

use crate::compare::Task;
use crate::error::ConfigError;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Fill level of a [`BoundedQueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// No items; `pop` blocks
    Empty,
    /// Some items, room for more
    Partial,
    /// At capacity; `push` blocks
    Full,
}

impl QueueState {
    fn of(len: usize, capacity: usize) -> Self {
        if len == 0 {
            QueueState::Empty
        } else if len >= capacity {
            QueueState::Full
        } else {
            QueueState::Partial
        }
    }
}

/// Statistics for the queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total items pushed
    pub pushed: AtomicU64,

    /// Total items popped
    pub popped: AtomicU64,

    /// Pushes that found the queue full and had to wait
    pub full_waits: AtomicU64,

    /// Pops that found the queue empty and had to wait
    pub empty_waits: AtomicU64,

    /// Largest length ever observed
    pub high_water: AtomicUsize,
}

impl QueueStats {
    /// Items pushed so far
    pub fn pushed_count(&self) -> u64 {
        self.pushed.load(Ordering::Relaxed)
    }

    /// Items popped so far
    pub fn popped_count(&self) -> u64 {
        self.popped.load(Ordering::Relaxed)
    }

    /// Number of times a pusher blocked on a full queue
    pub fn full_wait_count(&self) -> u64 {
        self.full_waits.load(Ordering::Relaxed)
    }

    /// Number of times a popper blocked on an empty queue
    pub fn empty_wait_count(&self) -> u64 {
        self.empty_waits.load(Ordering::Relaxed)
    }

    /// Highest fill level reached
    pub fn high_water_mark(&self) -> usize {
        self.high_water.load(Ordering::Relaxed)
    }
}

struct Inner<T, S> {
    items: VecDeque<T>,
    shared: S,
}

/// Fixed-capacity blocking FIFO
pub struct BoundedQueue<T, S = ()> {
    inner: Mutex<Inner<T, S>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    stats: QueueStats,
}

impl<T> BoundedQueue<T> {
    /// Create a queue with no shared state
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_shared_state(capacity, ())
    }
}

impl<T, S> BoundedQueue<T, S> {
    /// Create a queue whose lock also guards `shared`
    ///
    /// Fails for a capacity of zero, which could never accept an item.
    pub fn with_shared_state(capacity: usize, shared: S) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidQueueSize { size: capacity });
        }

        Ok(Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                shared,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            stats: QueueStats::default(),
        })
    }

    /// Append `item`, blocking while the queue is full
    pub fn push(&self, item: T) {
        let mut inner = self.inner.lock();

        if inner.items.len() >= self.capacity {
            self.stats.full_waits.fetch_add(1, Ordering::Relaxed);
            while inner.items.len() >= self.capacity {
                self.not_full.wait(&mut inner);
            }
        }

        inner.items.push_back(item);
        self.stats.pushed.fetch_add(1, Ordering::Relaxed);
        self.stats
            .high_water
            .fetch_max(inner.items.len(), Ordering::Relaxed);

        self.not_empty.notify_one();
    }

    /// Remove the head item, blocking while the queue is empty
    pub fn pop(&self) -> T {
        let mut inner = self.inner.lock();

        if inner.items.is_empty() {
            self.stats.empty_waits.fetch_add(1, Ordering::Relaxed);
        }

        let item = loop {
            match inner.items.pop_front() {
                Some(item) => break item,
                None => self.not_empty.wait(&mut inner),
            }
        };
        self.stats.popped.fetch_add(1, Ordering::Relaxed);

        self.not_full.notify_one();
        item
    }

    /// Remove the head item if there is one
    pub fn try_pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        let item = inner.items.pop_front()?;
        self.stats.popped.fetch_add(1, Ordering::Relaxed);
        self.not_full.notify_one();
        Some(item)
    }

    /// Run `f` on the shared state while holding the queue lock
    pub fn with_shared<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut inner = self.inner.lock();
        f(&mut inner.shared)
    }

    /// Consume the queue and return its shared state
    pub fn into_shared(self) -> S {
        self.inner.into_inner().shared
    }

    /// Current number of queued items
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current fill level
    pub fn state(&self) -> QueueState {
        QueueState::of(self.len(), self.capacity)
    }

    /// Get queue statistics
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}

impl<S> BoundedQueue<Task, S> {
    /// Push a shutdown marker; blocks while full, like [`BoundedQueue::push`]
    pub fn push_shutdown(&self) {
        self.push(Task::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::CandidatePair;
    use std::thread;
    use std::time::Duration;

    fn wait_until(cond: impl Fn() -> bool) {
        for _ in 0..2_000 {
            if cond() {
                return;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("condition not reached");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            BoundedQueue::<u32>::new(0).err(),
            Some(ConfigError::InvalidQueueSize { size: 0 })
        );
    }

    #[test]
    fn test_fifo_and_states() {
        let queue = BoundedQueue::new(3).unwrap();
        assert_eq!(queue.state(), QueueState::Empty);

        queue.push(1);
        queue.push(2);
        assert_eq!(queue.state(), QueueState::Partial);
        queue.push(3);
        assert_eq!(queue.state(), QueueState::Full);
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.pop(), 1);
        assert_eq!(queue.pop(), 2);
        assert_eq!(queue.pop(), 3);
        assert!(queue.is_empty());
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_push_blocks_when_full() {
        let queue = BoundedQueue::new(1).unwrap();
        queue.push(10);

        thread::scope(|s| {
            let pusher = s.spawn(|| queue.push(20));

            wait_until(|| queue.stats().full_wait_count() == 1);
            assert_eq!(queue.len(), 1);
            assert!(!pusher.is_finished());

            assert_eq!(queue.pop(), 10);
            pusher.join().unwrap();
        });

        assert_eq!(queue.pop(), 20);
        assert_eq!(queue.stats().high_water_mark(), 1);
    }

    #[test]
    fn test_pop_blocks_when_empty() {
        let queue = BoundedQueue::new(2).unwrap();

        thread::scope(|s| {
            let popper = s.spawn(|| queue.pop());

            wait_until(|| queue.stats().empty_wait_count() == 1);
            assert!(!popper.is_finished());

            queue.push(7);
            assert_eq!(popper.join().unwrap(), 7);
        });
    }

    #[test]
    fn test_single_producer_order_and_capacity() {
        let queue = BoundedQueue::new(4).unwrap();
        let total = 1_000;

        let received = thread::scope(|s| {
            s.spawn(|| {
                for i in 0..total {
                    queue.push(i);
                }
            });
            (0..total).map(|_| queue.pop()).collect::<Vec<_>>()
        });

        assert_eq!(received, (0..total).collect::<Vec<_>>());
        assert!(queue.stats().high_water_mark() <= 4);
        assert_eq!(queue.stats().pushed_count(), total as u64);
        assert_eq!(queue.stats().popped_count(), total as u64);
    }

    #[test]
    fn test_shutdown_per_worker() {
        let workers = 3;
        let queue: BoundedQueue<Task, usize> = BoundedQueue::with_shared_state(2, 0).unwrap();

        thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| loop {
                    match queue.pop() {
                        Task::Compare(_) => queue.with_shared(|n| *n += 1),
                        Task::Shutdown => break,
                    }
                });
            }
            for i in 0..10 {
                queue.push(Task::Compare(CandidatePair::new(i, i + 1)));
            }
            for _ in 0..workers {
                queue.push_shutdown();
            }
        });

        assert!(queue.is_empty());
        assert_eq!(queue.stats().popped_count(), 10 + workers as u64);
        assert_eq!(queue.into_shared(), 10);
    }
}
