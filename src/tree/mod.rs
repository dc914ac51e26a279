//! Tree storage and input
//!
//! Trees are built once from text and then only read by the hashing and
//! comparison phases. A tree is identified by its index in the loaded slice.

pub mod bst;
pub mod loader;

pub use bst::{Bst, InOrderIter, TreeHash, Value};
pub use loader::{load_trees, parse_trees};
