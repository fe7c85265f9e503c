//! The B+ tree index.
//!
//! [`BPlusTree`] owns the root [`Node`] and drives insertion, splitting,
//! promotion and point lookup.
//!
//! # Insert path
//! 1. Descend from the root with [`InternalNode::locate`] to the leaf that
//!    covers the key.
//! 2. Add the key/value pair to the leaf.
//! 3. If the leaf went over `order` keys, split it.
//! 4. Hand the split to the parent according to the [`RebalancePolicy`]:
//!    - `SingleLevel`: promote into the parent if it is not full, otherwise
//!      leave the split in place as a one-key internal child.
//!    - `Cascading`: always promote, splitting overfull ancestors up to and
//!      including the root.
//!
//! A split that reaches the top replaces the root with a new internal node.

use std::borrow::Borrow;
use std::fmt;

use tracing::{debug, trace};

use super::node::{InternalNode, Node, Split, Traverse};
use super::stats::{IndexStats, StatsSnapshot};
use crate::common::{Error, IndexConfig, RebalancePolicy, Result, DEFAULT_ORDER};

/// An in-memory B+ tree mapping keys to lists of values.
///
/// Inserting an existing key appends to its value list.
///
/// # Example
/// ```
/// use bplus_index::BPlusTree;
///
/// let mut tree = BPlusTree::new(4).unwrap();
/// for (key, value) in [("a", "alpha"), ("b", "bravo"), ("c", "charlie"), ("d", "delta"), ("e", "echo")] {
///     tree.insert(key, value);
/// }
///
/// assert_eq!(tree.retrieve("e"), Some(&["echo"][..]));
/// assert_eq!(tree.retrieve("z"), None);
/// assert_eq!(tree.root().keys(), &["c"]);
/// ```
#[derive(Debug, Clone)]
pub struct BPlusTree<K, V> {
    config: IndexConfig,
    root: Node<K, V>,
    stats: IndexStats,
}

impl<K, V> BPlusTree<K, V> {
    /// Create an empty tree with the given order and the default policy.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOrder`] if `order` is below
    /// [`MIN_ORDER`](crate::common::MIN_ORDER).
    pub fn new(order: usize) -> Result<Self> {
        Self::with_config(IndexConfig::new(order))
    }

    /// Create an empty tree from a full config.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            root: Node::new_leaf(config.order),
            stats: IndexStats::new(),
        })
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.config.order
    }

    #[inline]
    pub fn policy(&self) -> RebalancePolicy {
        self.config.rebalance
    }

    #[inline]
    pub fn config(&self) -> IndexConfig {
        self.config
    }

    /// The root node. Starts as an empty leaf.
    #[inline]
    pub fn root(&self) -> &Node<K, V> {
        &self.root
    }

    #[inline]
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Shorthand for `stats().snapshot()`.
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Pre-order walk over every node, root at depth 0.
    pub fn traverse(&self) -> Traverse<'_, K, V> {
        self.root.traverse()
    }

    /// Number of levels on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.traverse().map(|(depth, _)| depth + 1).max().unwrap_or(1)
    }

    /// Number of distinct keys stored in the leaves.
    pub fn len(&self) -> usize {
        self.traverse()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Insert `value` under `key`.
    ///
    /// Splits the target leaf if it overflows and promotes the separator as
    /// far as the tree's [`RebalancePolicy`] allows.
    pub fn insert(&mut self, key: K, value: V) {
        IndexStats::bump(&self.stats.inserts);

        let policy = self.config.rebalance;
        if let Some(split) = Self::insert_into(&mut self.root, key, value, policy, &self.stats, 0) {
            IndexStats::bump(&self.stats.root_splits);
            self.root = Node::Internal(InternalNode::from_split(self.config.order, split));
            debug!(?policy, "root split, tree grew a level");
        }
    }

    /// Insert below `node`. Returns the split `node` went through, if any;
    /// the caller must install it in `node`'s slot.
    fn insert_into(
        node: &mut Node<K, V>,
        key: K,
        value: V,
        policy: RebalancePolicy,
        stats: &IndexStats,
        depth: usize,
    ) -> Option<Split<K, V>> {
        match node {
            Node::Leaf(leaf) => {
                leaf.add(key, value);
                if !leaf.is_overfull() {
                    return None;
                }

                let leaf = leaf.take();
                let split = match policy {
                    RebalancePolicy::SingleLevel => leaf.split(),
                    RebalancePolicy::Cascading => leaf.split_retaining(),
                };
                IndexStats::bump(&stats.leaf_splits);
                debug!(
                    depth,
                    left = split.left.len(),
                    right = split.right.len(),
                    "split leaf"
                );
                Some(split)
            }
            Node::Internal(internal) => {
                let (child, index) = internal.locate_mut(&key);
                trace!(depth, index, "descend");

                let split = Self::insert_into(child, key, value, policy, stats, depth + 1)?;

                match policy {
                    RebalancePolicy::SingleLevel => {
                        if internal.is_full() {
                            IndexStats::bump(&stats.skipped_promotions);
                            trace!(depth, index, "parent full, promotion skipped");
                            internal.install_split(index, split);
                        } else {
                            internal.promote(index, split);
                            IndexStats::bump(&stats.promotions);
                            debug!(depth, index, keys = internal.len(), "promoted separator");
                        }
                        None
                    }
                    RebalancePolicy::Cascading => {
                        internal.promote(index, split);
                        IndexStats::bump(&stats.promotions);
                        debug!(depth, index, keys = internal.len(), "promoted separator");

                        if !internal.is_overfull() {
                            return None;
                        }
                        IndexStats::bump(&stats.internal_splits);
                        debug!(depth, "split internal node");
                        Some(internal.take().split())
                    }
                }
            }
        }
    }
}

impl<K: Ord, V> BPlusTree<K, V> {
    /// Values stored under `key` in insertion order, or `None` if the key
    /// was never inserted.
    pub fn retrieve<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        IndexStats::bump(&self.stats.lookups);

        let mut node = &self.root;
        let found = loop {
            match node {
                Node::Internal(internal) => node = internal.locate(key).0,
                Node::Leaf(leaf) => break leaf.get(key),
            }
        };

        if found.is_some() {
            IndexStats::bump(&self.stats.lookup_hits);
        }
        found
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.retrieve(key).is_some()
    }

    /// Walk the whole tree and verify its structure.
    ///
    /// Checks, for every node: keys strictly increasing, at most `order`
    /// keys, keys inside the range the parent assigned, and matching
    /// key/entry counts. In cascading mode every leaf must also sit at the
    /// same depth.
    ///
    /// # Errors
    /// Returns [`Error::InvariantViolation`] describing the first failure.
    pub fn check_invariants(&self) -> Result<()> {
        let mut leaf_depth = None;
        self.check_node(&self.root, None, None, 0, &mut leaf_depth)
    }

    fn check_node(
        &self,
        node: &Node<K, V>,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<()> {
        let keys = node.keys();

        if node.order() != self.config.order {
            return Err(violation(format!(
                "node at depth {} has order {}, tree order is {}",
                depth,
                node.order(),
                self.config.order
            )));
        }
        if keys.len() > self.config.order {
            return Err(violation(format!(
                "node at depth {} holds {} keys, order is {}",
                depth,
                keys.len(),
                self.config.order
            )));
        }
        if !keys.windows(2).all(|w| w[0] < w[1]) {
            return Err(violation(format!(
                "keys not strictly increasing at depth {}",
                depth
            )));
        }
        if let (Some(first), Some(lo)) = (keys.first(), lower) {
            if first < lo {
                return Err(violation(format!("key below range at depth {}", depth)));
            }
        }
        if let (Some(last), Some(hi)) = (keys.last(), upper) {
            if last >= hi {
                return Err(violation(format!("key above range at depth {}", depth)));
            }
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.values().len() != keys.len() {
                    return Err(violation(format!(
                        "leaf at depth {} has {} keys but {} value lists",
                        depth,
                        keys.len(),
                        leaf.values().len()
                    )));
                }
                if leaf.values().iter().any(Vec::is_empty) {
                    return Err(violation(format!(
                        "leaf at depth {} has an empty value list",
                        depth
                    )));
                }
                if self.config.rebalance == RebalancePolicy::Cascading {
                    match *leaf_depth {
                        None => *leaf_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            return Err(violation(format!(
                                "leaf at depth {}, expected {}",
                                depth, expected
                            )));
                        }
                        Some(_) => {}
                    }
                }
            }
            Node::Internal(internal) => {
                if keys.is_empty() {
                    return Err(violation(format!(
                        "internal node at depth {} has no keys",
                        depth
                    )));
                }
                let children = internal.children();
                if children.len() != keys.len() + 1 {
                    return Err(violation(format!(
                        "internal node at depth {} has {} keys but {} children",
                        depth,
                        keys.len(),
                        children.len()
                    )));
                }
                for (i, child) in children.iter().enumerate() {
                    let lo = if i == 0 { lower } else { Some(&keys[i - 1]) };
                    let hi = if i == keys.len() { upper } else { Some(&keys[i]) };
                    self.check_node(child, lo, hi, depth + 1, leaf_depth)?;
                }
            }
        }
        Ok(())
    }
}

fn violation(detail: String) -> Error {
    Error::InvariantViolation { detail }
}

impl<K: fmt::Debug, V> BPlusTree<K, V> {
    /// Print the keys of every node, one `"<depth> <keys>"` line per node.
    pub fn show(&self) {
        print!("{}", self);
    }
}

impl<K: fmt::Debug, V> fmt::Display for BPlusTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, node) in self.traverse() {
            writeln!(f, "{} {:?}", depth, node.keys())?;
        }
        Ok(())
    }
}

impl<K, V> Default for BPlusTree<K, V> {
    fn default() -> Self {
        Self {
            config: IndexConfig::new(DEFAULT_ORDER),
            root: Node::new_leaf(DEFAULT_ORDER),
            stats: IndexStats::new(),
        }
    }
}
