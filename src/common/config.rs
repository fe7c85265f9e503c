//! Configuration for B+ tree indexes.

use super::error::{Error, Result};

/// Default node capacity (maximum keys per node).
///
/// Small enough that splits show up after a handful of inserts, which is
/// what the diagnostic dumps are for.
pub const DEFAULT_ORDER: usize = 8;

/// Smallest order that can still produce a separator and two children.
pub const MIN_ORDER: usize = 2;

/// How far a split is allowed to propagate up the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebalancePolicy {
    /// Fold a leaf split into its immediate parent only when the parent has
    /// spare capacity. A full parent keeps the split leaf as a one-key
    /// internal child, so leaves may end up at different depths.
    #[default]
    SingleLevel,

    /// Always fold a split into the parent and split overfull ancestors in
    /// turn, growing the root when it overflows. Leaves stay at equal depth
    /// and separator entries are retained in the right leaf.
    Cascading,
}

/// Construction parameters for a [`BPlusTree`](crate::BPlusTree).
///
/// # Example
/// ```
/// use bplus_index::{IndexConfig, RebalancePolicy};
///
/// let config = IndexConfig::new(4).with_rebalance(RebalancePolicy::Cascading);
/// assert!(config.validate().is_ok());
/// assert!(IndexConfig::new(1).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Maximum number of keys a node may hold before it must split.
    pub order: usize,

    /// Split propagation policy.
    pub rebalance: RebalancePolicy,
}

impl IndexConfig {
    /// Create a config with the given order and the default policy.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            rebalance: RebalancePolicy::default(),
        }
    }

    /// Set the rebalance policy.
    pub fn with_rebalance(mut self, rebalance: RebalancePolicy) -> Self {
        self.rebalance = rebalance;
        self
    }

    /// Reject orders that could never hold a valid split.
    pub fn validate(&self) -> Result<()> {
        if self.order < MIN_ORDER {
            return Err(Error::InvalidOrder {
                order: self.order,
                min: MIN_ORDER,
            });
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER)
    }
}
