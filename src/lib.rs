//! Stock AVL Store
//!
//! An in-memory stock record store keyed by ticker symbol and backed by a
//! height-balanced binary search tree.
//!
//! # Features
//!
//! - **Ordered storage**: records live in a binary search tree ordered by symbol
//! - **Rotation-based balancing**: the root is rebalanced after every insert and delete
//! - **Upsert semantics**: adding a known symbol updates it in place
//! - **Rename support**: symbol changes move the record to its new position
//! - **Command scripts**: a line-oriented interpreter for `ADD`/`REMOVE`/`SEARCH`/`UPDATE`/`PRINT`
//! - **Timing harness**: per-phase and per-batch latency measurements with metrics export
//!
//! # Quick Start
//!
//! ```rust
//! use stock_avl_store::{StockStore, UpsertOutcome};
//!
//! let mut store = StockStore::new();
//!
//! assert_eq!(store.upsert_stock("AAPL", 150.0, 1_000_000, 2_500_000_000), UpsertOutcome::Added);
//! assert_eq!(store.upsert_stock("AAPL", 151.0, 1_100_000, 2_510_000_000), UpsertOutcome::Updated);
//!
//! store.rename_and_update("AAPL", "APPL", 152.0, 1_200_000, 2_520_000_000)?;
//! assert!(store.find_stock("AAPL").is_none());
//!
//! for line in store.list_ordered() {
//!     println!("{}", line);
//! }
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! 1. **Tree**: [`AvlTree`] owns its nodes through `Option<Box<_>>` links and
//!    orders any [`Keyed`] record. It checks the balance factor of the root once
//!    per structural change and applies single or double rotations there.
//! 2. **Store**: [`StockStore`] routes existing symbols to in-place updates and
//!    new ones to inserts, so the tree never holds duplicate keys.
//! 3. **Interpreter**: [`CommandInterpreter`] turns script lines into store calls.
//!
//! Everything is single-threaded and synchronous.

pub mod analysis;
pub mod interpreter;
pub mod metrics;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use store::{
    error::{StoreError, StoreResult},
    tree::{AvlTree, TreeEntry},
    types::{Keyed, Stock, UpsertOutcome},
    StockStore,
};

pub use crate::analysis::{AnalysisConfig, PerformanceAnalysis};
pub use crate::interpreter::{Command, CommandInterpreter};
pub use crate::metrics::StoreMetrics;
