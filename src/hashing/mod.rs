//! Structural hashing and hash bucket aggregation
//!
//! Computes [`Bst::structural_hash`](crate::tree::Bst::structural_hash) for every tree and groups tree indices
//! by hash. Three strategies are available:
//!
//! ```text
//!  Sequential          Channel                      Locked
//!  ──────────          ───────                      ──────
//!  hash all trees      hash-0 ─┐                    hash-0 ──┐
//!       │              hash-1 ─┼─► bounded(5) ─►    hash-1 ──┼─► Mutex<HashGroups>
//!       ▼              hash-N ─┘   aggregator       hash-N ──┘
//!  insert all                      (single writer)
//! ```
//!
//! Identical trees always share a hash, so bucketing never separates two
//! equal trees. Unequal trees may collide; the comparison phase sorts that out.

pub mod groups;
pub mod strategy;

pub use groups::{HashGroups, HashOutcome};
pub use strategy::{compute_hashes, group_trees, partition, HashStrategy, HASH_CHANNEL_CAPACITY};
