//! Common types shared across the index.
//!
//! - Configuration (order, rebalance policy)
//! - Error types

pub mod config;
pub mod error;

pub use config::{IndexConfig, RebalancePolicy, DEFAULT_ORDER, MIN_ORDER};
pub use error::{Error, Result};
