//! bst-equiv - Concurrent grouping of binary search trees
//!
//! Partitions a collection of binary search trees into equivalence classes
//! of trees with the same in-order value sequence, and compares several
//! concurrency strategies for doing so.
//!
//! # Features
//!
//! - **Hash Pre-filter**: A cheap structural hash buckets trees so only
//!   same-bucket pairs are compared exactly.
//!
//! - **Three Hashing Strategies**: Sequential, partitioned workers feeding a
//!   single aggregator over a bounded channel, or partitioned workers
//!   inserting under one lock.
//!
//! - **Three Comparison Strategies**: Sequential, one thread per candidate
//!   pair, or a fixed worker pool behind a bounded blocking queue with
//!   per-worker shutdown markers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Input (one tree per line)                    │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ tree::loader
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Hashing Phase                              │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐      │
//! │  │ hash-0  │  │ hash-1  │  │ hash-2  │  ...    │ hash-N  │      │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘      │
//! │       └────────────┴─────┬──────┴────────────────────┘          │
//! │                          ▼                                      │
//! │        channel aggregator  or  Mutex<HashGroups>                │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ candidate pairs (same bucket)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Comparison Phase                             │
//! │    producer ──► BoundedQueue ──► compare-0 .. compare-W         │
//! │                      │                                          │
//! │                      ▼                                          │
//! │             EquivalenceRecord ──► groups                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Hash only, 8 workers feeding one aggregator
//! bst-equiv --input trees.txt --hash-workers 8 --data-workers 1
//!
//! # Hash and compare with a 4-thread worker pool
//! bst-equiv --input trees.txt --hash-workers 8 --data-workers 8 --comp-workers 4
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod hashing;
pub mod pipeline;
pub mod report;
pub mod tree;
pub mod worker;

pub use compare::{BoundedQueue, CompareStrategy, ComparisonOutcome, Task};
pub use config::{CliArgs, PipelineConfig, RunConfig};
pub use error::{EquivError, Result};
pub use hashing::{HashGroups, HashOutcome, HashStrategy};
pub use pipeline::{Pipeline, PipelineResult};
pub use tree::Bst;
