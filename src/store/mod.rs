//! Core stock store implementation module
//!
//! A symbol-keyed record store on top of a height-balanced binary search
//! tree. The tree only knows about keys ([`Keyed`]); stock semantics live in
//! [`StockStore`].

pub mod error;
pub mod manager;
pub mod tree;
pub mod types;

// Re-export main types for convenience
pub use error::{StoreError, StoreResult};
pub use manager::StockStore;
pub use tree::{AvlTree, InOrder, TreeEntry};
pub use types::{Keyed, MarketCap, Price, Stock, Symbol, UpsertOutcome, Volume};
