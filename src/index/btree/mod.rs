//! B+ tree index implementation.
//!
//! # Components
//! - [`BPlusTree`] - The index: descent, insertion, promotion, lookup
//! - [`Node`] - Leaf or internal node, with splitting
//! - [`IndexStats`] - Split/promotion/lookup counters

mod node;
mod stats;
mod tree;

pub use node::{InternalNode, LeafNode, Node, Split, Traverse};
pub use stats::{IndexStats, StatsSnapshot};
pub use tree::BPlusTree;
