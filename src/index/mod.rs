//! Index structures.
//!
//! - [`btree`] - In-memory B+ tree
//! - [`SharedIndex`] - Lock-protected handle for multi-threaded use

pub mod btree;
mod shared;

pub use shared::SharedIndex;
