//! Binary search tree stored with the arena pattern
//!
//! Nodes live in a contiguous vector and reference their children by
//! [`NodeIndex`]. The root is always index 0. Insertion and traversal are
//! both iterative, so a degenerate (list-shaped) tree built from sorted input
//! cannot exhaust the thread stack.

/// Index of a node in a tree (arena).
pub type NodeIndex = usize;

/// Value stored in a node.
pub type Value = i64;

/// Structural hash of a tree's in-order sequence.
pub type TreeHash = i64;

/// Modulus applied after every step of the structural hash
pub const HASH_MODULUS: i64 = 1000;

const ROOT_INDEX: NodeIndex = 0;

#[derive(Debug, Clone, Copy)]
struct Node {
    value: Value,
    left: Option<NodeIndex>,
    right: Option<NodeIndex>,
}

impl Node {
    fn leaf(value: Value) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }
}

/// An immutable-after-construction binary search tree
///
/// Values smaller than a node go left; values equal to or greater than a
/// node go right, so duplicates are kept.
#[derive(Debug, Clone)]
pub struct Bst {
    nodes: Vec<Node>,
}

impl Bst {
    /// Create a tree holding only a root
    pub fn new(root: Value) -> Self {
        Self {
            nodes: vec![Node::leaf(root)],
        }
    }

    /// Build a tree by inserting `values` in order; the first becomes the root
    ///
    /// Returns `None` for an empty slice.
    pub fn from_values(values: &[Value]) -> Option<Self> {
        let (&root, rest) = values.split_first()?;
        let mut tree = Self::new(root);
        for &value in rest {
            tree.insert(value);
        }
        Some(tree)
    }

    /// Standard BST insert; equal values descend to the right
    pub fn insert(&mut self, value: Value) {
        let new_index = self.nodes.len();
        let mut current = ROOT_INDEX;

        loop {
            let node = &mut self.nodes[current];
            let slot = if value < node.value {
                &mut node.left
            } else {
                &mut node.right
            };

            match *slot {
                Some(next) => current = next,
                None => {
                    *slot = Some(new_index);
                    break;
                }
            }
        }

        self.nodes.push(Node::leaf(value));
    }

    /// Number of values in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a constructed tree; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Value at the root
    pub fn root_value(&self) -> Value {
        self.nodes[ROOT_INDEX].value
    }

    /// Iterate values in ascending (in-order) sequence
    pub fn in_order(&self) -> InOrderIter<'_> {
        InOrderIter::new(self)
    }

    /// Collect the in-order sequence
    pub fn in_order_values(&self) -> Vec<Value> {
        self.in_order().collect()
    }

    /// Low-resolution hash of the in-order sequence
    ///
    /// Starting from 1, every visited value `v` folds in as
    /// `acc = (acc * (v + 2) + (v + 2)) % 1000`. Arithmetic wraps on
    /// overflow and the remainder truncates toward zero, so negative input can
    /// produce a negative hash. Collisions are expected; the hash is only a
    /// pre-filter for [`Bst::same_structure`].
    pub fn structural_hash(&self) -> TreeHash {
        self.in_order().fold(1, |acc: TreeHash, value| {
            let weight = value.wrapping_add(2);
            acc.wrapping_mul(weight).wrapping_add(weight) % HASH_MODULUS
        })
    }

    /// True if both trees have the same in-order sequence
    pub fn same_structure(&self, other: &Bst) -> bool {
        self.len() == other.len() && self.in_order().eq(other.in_order())
    }

    /// Space-separated in-order values, as printed by `--print-trees`
    pub fn to_in_order_string(&self) -> String {
        self.in_order()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl PartialEq for Bst {
    fn eq(&self, other: &Self) -> bool {
        self.same_structure(other)
    }
}

impl Eq for Bst {}

/// In-order iterator over a [`Bst`].
///
/// Uses an explicit stack of pending ancestors instead of recursion.
pub struct InOrderIter<'a> {
    tree: &'a Bst,
    stack: Vec<NodeIndex>,
    current: Option<NodeIndex>,
}

impl<'a> InOrderIter<'a> {
    fn new(tree: &'a Bst) -> Self {
        let current = if tree.nodes.is_empty() {
            None
        } else {
            Some(ROOT_INDEX)
        };
        InOrderIter {
            tree,
            stack: Vec::new(),
            current,
        }
    }
}

impl Iterator for InOrderIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(index) = self.current {
            self.stack.push(index);
            self.current = self.tree.nodes[index].left;
        }

        let index = self.stack.pop()?;
        let node = &self.tree.nodes[index];
        self.current = node.right;
        Some(node.value)
    }
}
