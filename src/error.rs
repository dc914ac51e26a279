//! Error types for bst-equiv
//!
//! This module defines the error hierarchy that covers:
//! - Configuration errors (degenerate worker counts, queue sizes)
//! - Tree input errors (unreadable files, malformed tokens)
//! - Worker thread errors
//!
//! Hashing and comparison themselves cannot fail once the trees are built,
//! so every variant here is raised either at the configuration boundary or
//! while threads are being started and joined.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for bst-equiv
#[derive(Error, Debug)]
pub enum EquivError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tree input errors
    #[error("Input error: {0}")]
    Load(#[from] LoadError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Configuration and CLI errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A worker count that would divide by zero or never drain a queue
    #[error("Invalid {role} count {count}: must be at least {min}")]
    InvalidWorkerCount {
        role: &'static str,
        count: usize,
        min: usize,
    },

    /// A worker count beyond what the process should spawn
    #[error("Invalid {role} count {count}: must be at most {max}")]
    TooManyWorkers {
        role: &'static str,
        count: usize,
        max: usize,
    },

    /// Queue capacity of zero can never accept a job
    #[error("Invalid queue size {size}: must be at least 1")]
    InvalidQueueSize { size: usize },

    /// Input file missing or not a regular file
    #[error("Invalid input path '{path}': {reason}")]
    InvalidInputPath { path: PathBuf, reason: String },
}

/// Errors raised while reading trees from text
#[derive(Error, Debug)]
pub enum LoadError {
    /// Failed to open or read the input
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A token on a line was not an integer
    #[error("Invalid token '{token}' on line {line}")]
    InvalidToken { line: usize, token: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {name} panicked")]
    Panicked { name: String },

    /// Thread could not be spawned
    #[error("Failed to start worker {name}: {reason}")]
    SpawnFailed { name: String, reason: String },

    /// Aggregation channel closed before every hash arrived
    #[error("Hash channel closed after {received} of {expected} results")]
    ChannelClosed { received: usize, expected: usize },
}

/// Result type alias for EquivError
pub type Result<T> = std::result::Result<T, EquivError>;

/// Result type alias for LoadError
pub type LoadResult<T> = std::result::Result<T, LoadError>;
