//! Equivalence record and group extraction

/// Symmetric adjacency list of confirmed-equal trees
///
/// Linking `(a, b)` records both `a -> b` and `b -> a`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalenceRecord {
    adjacency: Vec<Vec<usize>>,
}

impl EquivalenceRecord {
    /// Create a record for `tree_count` trees with no edges
    pub fn new(tree_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); tree_count],
        }
    }

    /// Record that trees `a` and `b` are structurally equal
    pub fn link(&mut self, a: usize, b: usize) {
        self.adjacency[a].push(b);
        self.adjacency[b].push(a);
    }

    /// Trees recorded as equal to `index`
    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.adjacency[index]
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Flatten into equivalence groups
    ///
    /// Indices are visited ascending. An unassigned index with at least one
    /// neighbor opens a group; its unassigned neighbors join it. Members are
    /// sorted, and groups come out ordered by their smallest member.
    ///
    /// A single hop is enough only because every pair inside a hash bucket
    /// was compared, so each class is a complete subgraph. Skipping pairs
    /// during candidate generation would need a union-find pass here instead.
    pub fn into_groups(self) -> Vec<Vec<usize>> {
        let mut assigned = vec![false; self.adjacency.len()];
        let mut groups = Vec::new();

        for (index, neighbors) in self.adjacency.iter().enumerate() {
            if assigned[index] || neighbors.is_empty() {
                continue;
            }

            assigned[index] = true;
            let mut group = vec![index];
            for &other in neighbors {
                if !assigned[other] {
                    assigned[other] = true;
                    group.push(other);
                }
            }
            group.sort_unstable();
            groups.push(group);
        }

        groups
    }
}
