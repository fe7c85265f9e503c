//! bplus-index - An in-memory B+ tree index.
//!
//! Keys map to lists of values (duplicate keys accumulate). Nodes hold at
//! most `order` keys; an overfull leaf splits in two and its separator is
//! promoted into the parent.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          bplus-index                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │         SharedIndex (index/shared)  [RwLock]             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              BPlusTree (index/btree)                     │   │
//! │  │   locate → add → split → promote   +   IndexStats        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        Node = Leaf{keys, values} | Internal{keys, children}  │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Configuration and error types
//! - [`index`] - The B+ tree and its shared handle
//!
//! # Quick Start
//! ```
//! use bplus_index::{BPlusTree, IndexConfig, RebalancePolicy};
//!
//! let config = IndexConfig::new(4).with_rebalance(RebalancePolicy::Cascading);
//! let mut tree = BPlusTree::with_config(config).unwrap();
//!
//! for k in 0..20u32 {
//!     tree.insert(k, k * 2);
//! }
//!
//! assert_eq!(tree.retrieve(&7), Some(&[14][..]));
//! assert!(tree.check_invariants().is_ok());
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::{Error, IndexConfig, RebalancePolicy, Result, DEFAULT_ORDER, MIN_ORDER};

pub use index::btree::{
    BPlusTree, IndexStats, InternalNode, LeafNode, Node, Split, StatsSnapshot, Traverse,
};
pub use index::SharedIndex;
