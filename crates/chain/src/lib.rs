//! Fork tracking for forkchain.
//!
//! This crate keeps every mined block in an append-only tree and picks the
//! best tip by cumulative proof-of-work:
//! - **ForkStore**: block tree keyed by hash, seeded with genesis
//! - **Fork choice**: highest cumulative work wins, ties go to the
//!   lexicographically smaller hash
//! - **Reorg tracking**: branch switches are recorded as they happen
//!
//! # Example
//!
//! ```rust,no_run
//! use forkchain_chain::ForkStore;
//! use forkchain_core::Transaction;
//!
//! let mut store = ForkStore::with_difficulty(3);
//! let genesis = store.genesis_hash();
//!
//! // Two competing children of genesis
//! let a1 = store.extend(&genesis, vec![Transaction::transfer("Alice", "Bob", 10)]).unwrap();
//! let b1 = store.extend(&genesis, vec![Transaction::transfer("Carol", "Dave", 5)]).unwrap();
//! assert!(store.contains(&a1));
//!
//! // Extending one branch usually settles the race
//! store.extend(&b1, vec![]).unwrap();
//! println!("best tip: {}", store.best_tip());
//! ```

pub mod store;

// Re-export commonly used types
pub use store::{
    ForkNode, ForkStore, ForkStoreConfig, ForkStoreError, ForkStoreStats, ReorgEvent,
};
