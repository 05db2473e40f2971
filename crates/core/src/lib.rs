//! Core blockchain primitives for forkchain.
//!
//! This crate provides the fundamental types used throughout the chain:
//! - Blake3 hashing with a proof-of-work view of digests
//! - Opaque, canonically hashed transactions
//! - Merkle commitments and inclusion proofs with explicit sides
//! - Blocks and block headers

pub mod block;
pub mod hash;
pub mod merkle;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use block::{Block, BlockHeader};
pub use hash::{hash, hash_concat, Hash};
pub use merkle::{merkle_root, transaction_root, verify_proof, MerkleTree, ProofStep, Side};
pub use transaction::Transaction;
