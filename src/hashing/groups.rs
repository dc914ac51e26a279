//! Hash bucket container

use crate::compare::CandidatePair;
use crate::tree::TreeHash;
use std::collections::BTreeMap;
use std::time::Duration;

/// Mapping from structural hash to the indices of trees with that hash
///
/// Keys iterate in ascending order. Indices within a bucket keep insertion
/// order, which is only deterministic for the sequential strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashGroups {
    buckets: BTreeMap<TreeHash, Vec<usize>>,
}

impl HashGroups {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tree index to the bucket for `hash`
    pub fn insert(&mut self, hash: TreeHash, index: usize) {
        self.buckets.entry(hash).or_default().push(index);
    }

    /// Indices sharing `hash`, in insertion order
    pub fn get(&self, hash: TreeHash) -> Option<&[usize]> {
        self.buckets.get(&hash).map(Vec::as_slice)
    }

    /// Number of distinct hashes
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True if no tree has been inserted
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of tree indices across all buckets
    pub fn tree_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Buckets in ascending hash order
    pub fn iter(&self) -> impl Iterator<Item = (TreeHash, &[usize])> {
        self.buckets.iter().map(|(&h, v)| (h, v.as_slice()))
    }

    /// Buckets holding more than one tree, in ascending hash order
    pub fn shared_buckets(&self) -> impl Iterator<Item = (TreeHash, &[usize])> {
        self.iter().filter(|(_, indices)| indices.len() > 1)
    }

    /// Every in-bucket pair, buckets ascending by hash and pairs ascending by
    /// position within the bucket
    ///
    /// Every pair of a bucket is produced. Group extraction relies on this:
    /// members of an equivalence class end up directly linked to each other.
    pub fn candidate_pairs(&self) -> impl Iterator<Item = CandidatePair> + '_ {
        self.buckets.values().flat_map(|indices| {
            indices.iter().enumerate().flat_map(move |(i, &a)| {
                indices[i + 1..].iter().map(move |&b| CandidatePair::new(a, b))
            })
        })
    }

    /// Number of pairs [`HashGroups::candidate_pairs`] yields
    pub fn candidate_count(&self) -> usize {
        self.buckets
            .values()
            .map(|v| v.len() * v.len().saturating_sub(1) / 2)
            .sum()
    }

    /// Copy with every bucket sorted, for comparing content across strategies
    pub fn normalized(&self) -> Self {
        let buckets = self
            .buckets
            .iter()
            .map(|(&h, v)| {
                let mut v = v.clone();
                v.sort_unstable();
                (h, v)
            })
            .collect();
        Self { buckets }
    }
}

/// Result of the hashing phase
#[derive(Debug, Clone)]
pub struct HashOutcome {
    /// Hash buckets
    pub groups: HashGroups,

    /// Time spent hashing, as measured by the strategy
    pub hash_time: Duration,
}
