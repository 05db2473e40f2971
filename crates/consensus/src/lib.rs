//! Proof of Work consensus for forkchain.
//!
//! This crate provides the consensus layer for a brute-force PoW chain:
//! - Nonce-scanning block miner with an optional attempt cap
//! - Achieved-work scoring of block hashes for fork choice
//! - Parent/child link validation (index, parent hash, difficulty,
//!   merkle root)
//!
//! # Example
//!
//! ```rust,no_run
//! use forkchain_consensus::{ChainValidator, Miner};
//! use forkchain_core::{Block, Transaction};
//!
//! let genesis = Block::genesis(3);
//! let miner = Miner::with_difficulty(3);
//!
//! let txs = vec![Transaction::transfer("Alice", "Bob", 10)];
//! let block = miner.mine(&genesis, txs).unwrap();
//!
//! assert!(ChainValidator::validate_chain(&[genesis, block]));
//! ```

pub mod pow;
pub mod validator;

// Re-export commonly used types
pub use pow::{block_work, Miner, MinerConfig, MiningError};
pub use validator::{ChainValidator, LinkError};
