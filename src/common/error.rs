//! Error types for the index.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All recoverable errors raised by the index.
///
/// A missing key is not an error: [`retrieve`](crate::BPlusTree::retrieve)
/// returns `None`. Structural misuse inside the tree (locating in an empty
/// internal node, splitting an under-filled node) is a bug and panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The configured order is too small to ever hold a valid split.
    #[error("invalid order {order}: must be at least {min}")]
    InvalidOrder { order: usize, min: usize },

    /// A structural invariant does not hold.
    ///
    /// Only produced by [`check_invariants`](crate::BPlusTree::check_invariants).
    #[error("index invariant violated: {detail}")]
    InvariantViolation { detail: String },
}
