//! Block and block header structures.

use crate::hash::{hash, Hash};
use crate::merkle::transaction_root;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// The header of a block. Its hash is the block's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Position in the chain (0 for genesis).
    pub index: u64,
    /// Unix timestamp in fractional seconds.
    pub timestamp: f64,
    /// Hash of the parent block's header (zero for genesis).
    pub parent_hash: Hash,
    /// Merkle commitment to the ordered transaction set.
    pub merkle_root: Hash,
    /// Proof-of-work counter.
    pub nonce: u64,
    /// Required leading zero hex characters in this block's hash.
    pub difficulty: u32,
}

impl BlockHeader {
    /// Calculate the hash of this header.
    ///
    /// The header is serialized with bincode before hashing. Every field is
    /// fixed-width on the wire, so no two distinct headers share an
    /// encoding.
    pub fn hash(&self) -> Hash {
        let encoded = bincode::serialize(self).expect("serialization should not fail");
        hash(&encoded)
    }

    /// Get the current Unix timestamp in fractional seconds.
    pub fn current_timestamp() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_secs_f64()
    }
}

/// A complete block: header plus the transaction payload it commits to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block header.
    pub header: BlockHeader,
    /// Ordered list of transactions in this block.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Assemble a block from a header and its payload.
    ///
    /// The merkle root is taken as given rather than recomputed, so a block
    /// may carry a root inconsistent with its transactions. Validators
    /// exist to catch exactly that.
    pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// Create the genesis block: index 0, zero parent, empty payload.
    ///
    /// Genesis is constructed, not mined. It records the configured
    /// difficulty but its own hash is not required to meet it.
    pub fn genesis(difficulty: u32) -> Self {
        Self {
            header: BlockHeader {
                index: 0,
                timestamp: BlockHeader::current_timestamp(),
                parent_hash: Hash::ZERO,
                merkle_root: Hash::ZERO,
                nonce: 0,
                difficulty,
            },
            transactions: Vec::new(),
        }
    }

    /// Get the block hash (hash of the header).
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Get the block's position in the chain.
    pub fn index(&self) -> u64 {
        self.header.index
    }

    /// Check if this is the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.header.index == 0 && self.header.parent_hash == Hash::ZERO
    }

    /// Get the number of transactions in this block.
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }

    /// Verify the merkle root matches the transactions.
    pub fn verify_merkle_root(&self) -> bool {
        transaction_root(&self.transactions) == self.header.merkle_root
    }
}
