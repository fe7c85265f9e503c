//! Thread-safe handle around a [`BPlusTree`].
//!
//! The tree itself is single-threaded: a split leaves nodes in an
//! intermediate state until the promotion finishes. [`SharedIndex`] puts the
//! whole tree behind one `RwLock`, so inserts are exclusive and lookups run
//! concurrently with each other.

use std::borrow::Borrow;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use super::btree::{BPlusTree, StatsSnapshot};
use crate::common::{IndexConfig, Result};

/// A cloneable, shareable B+ tree.
///
/// Clones share the same underlying tree.
///
/// # Example
/// ```
/// use bplus_index::SharedIndex;
///
/// let index = SharedIndex::new(4).unwrap();
/// let writer = index.clone();
/// std::thread::spawn(move || writer.insert(1u32, "one")).join().unwrap();
///
/// assert_eq!(index.retrieve(&1), Some(vec!["one"]));
/// ```
pub struct SharedIndex<K, V> {
    inner: Arc<RwLock<BPlusTree<K, V>>>,
}

impl<K, V> SharedIndex<K, V> {
    /// Create an empty shared tree with the given order.
    pub fn new(order: usize) -> Result<Self> {
        Ok(Self::from_tree(BPlusTree::new(order)?))
    }

    pub fn with_config(config: IndexConfig) -> Result<Self> {
        Ok(Self::from_tree(BPlusTree::with_config(config)?))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: BPlusTree<K, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Acquire the read lock for direct access to the tree.
    ///
    /// Inserts block until the guard is dropped.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, BPlusTree<K, V>> {
        self.inner.read()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.read().stats_snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<K: Ord + Clone, V> SharedIndex<K, V> {
    /// Insert under the write lock.
    pub fn insert(&self, key: K, value: V) {
        self.inner.write().insert(key, value);
    }
}

impl<K: Ord, V: Clone> SharedIndex<K, V> {
    /// Copy of the values stored under `key`, taken under the read lock.
    pub fn retrieve<Q>(&self, key: &Q) -> Option<Vec<V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.read().retrieve(key).map(<[V]>::to_vec)
    }
}

impl<K, V> Clone for SharedIndex<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
