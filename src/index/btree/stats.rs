//! Index statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by a [`BPlusTree`](crate::BPlusTree).
///
/// All fields are atomic so lookups can be counted through `&self`.
///
/// # Memory Ordering
/// We use `Ordering::Relaxed` everywhere: each counter only needs atomicity,
/// and no counter is used to synchronize with another.
///
/// # Example
/// ```
/// use bplus_index::IndexStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = IndexStats::new();
/// stats.lookups.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.lookups.load(Ordering::Relaxed), 1);
/// ```
#[derive(Debug)]
pub struct IndexStats {
    /// Number of `insert` calls.
    pub inserts: AtomicU64,

    /// Number of `retrieve` calls.
    pub lookups: AtomicU64,

    /// Number of `retrieve` calls that found the key.
    pub lookup_hits: AtomicU64,

    /// Number of leaf splits.
    pub leaf_splits: AtomicU64,

    /// Number of internal node splits (cascading mode only).
    pub internal_splits: AtomicU64,

    /// Number of separators folded into a parent.
    pub promotions: AtomicU64,

    /// Number of leaf splits left in place because the parent was full.
    pub skipped_promotions: AtomicU64,

    /// Number of root node splits.
    pub root_splits: AtomicU64,
}

impl IndexStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            inserts: AtomicU64::new(0),
            lookups: AtomicU64::new(0),
            lookup_hits: AtomicU64::new(0),
            leaf_splits: AtomicU64::new(0),
            internal_splits: AtomicU64::new(0),
            promotions: AtomicU64::new(0),
            skipped_promotions: AtomicU64::new(0),
            root_splits: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of lookups that found their key (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    /// Get a non-atomic copy of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookup_hits: self.lookup_hits.load(Ordering::Relaxed),
            leaf_splits: self.leaf_splits.load(Ordering::Relaxed),
            internal_splits: self.internal_splits.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            skipped_promotions: self.skipped_promotions.load(Ordering::Relaxed),
            root_splits: self.root_splits.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.inserts.store(0, Ordering::Relaxed);
        self.lookups.store(0, Ordering::Relaxed);
        self.lookup_hits.store(0, Ordering::Relaxed);
        self.leaf_splits.store(0, Ordering::Relaxed);
        self.internal_splits.store(0, Ordering::Relaxed);
        self.promotions.store(0, Ordering::Relaxed);
        self.skipped_promotions.store(0, Ordering::Relaxed);
        self.root_splits.store(0, Ordering::Relaxed);
    }
}

impl Default for IndexStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for IndexStats {
    fn clone(&self) -> Self {
        let s = self.snapshot();
        Self {
            inserts: AtomicU64::new(s.inserts),
            lookups: AtomicU64::new(s.lookups),
            lookup_hits: AtomicU64::new(s.lookup_hits),
            leaf_splits: AtomicU64::new(s.leaf_splits),
            internal_splits: AtomicU64::new(s.internal_splits),
            promotions: AtomicU64::new(s.promotions),
            skipped_promotions: AtomicU64::new(s.skipped_promotions),
            root_splits: AtomicU64::new(s.root_splits),
        }
    }
}

/// A point-in-time copy of [`IndexStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub inserts: u64,
    pub lookups: u64,
    pub lookup_hits: u64,
    pub leaf_splits: u64,
    pub internal_splits: u64,
    pub promotions: u64,
    pub skipped_promotions: u64,
    pub root_splits: u64,
}

impl StatsSnapshot {
    /// Fraction of lookups that found their key (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.lookup_hits as f64 / self.lookups as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ inserts: {}, lookups: {}, hit_rate: {:.2}%, splits: {}/{}, promotions: {}, skipped: {} }}",
            self.inserts,
            self.lookups,
            self.hit_rate() * 100.0,
            self.leaf_splits,
            self.internal_splits,
            self.promotions,
            self.skipped_promotions
        )
    }
}
