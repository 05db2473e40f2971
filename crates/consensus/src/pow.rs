//! Proof of Work (PoW) mining.
//!
//! Mining is a brute-force scan over the header nonce until the header hash
//! carries the required run of leading zero hex characters. Expected cost
//! grows sixteenfold per difficulty step. An optional attempt cap turns the
//! otherwise unbounded search into a fallible, bounded operation.

use forkchain_core::{transaction_root, Block, BlockHeader, Hash, Transaction};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during mining.
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("gave up after {attempts} attempts without meeting difficulty {difficulty}")]
    Exhausted { attempts: u64, difficulty: u32 },
}

pub type Result<T> = std::result::Result<T, MiningError>;

/// Miner configuration.
#[derive(Debug, Clone)]
pub struct MinerConfig {
    /// Required leading zero hex characters in a mined block's hash.
    pub difficulty: u32,
    /// Maximum nonces to try before giving up (None = search forever).
    pub max_attempts: Option<u64>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            difficulty: 3,
            max_attempts: None,
        }
    }
}

/// Brute-force proof-of-work miner.
#[derive(Debug, Clone)]
pub struct Miner {
    config: MinerConfig,
}

impl Miner {
    /// Create a new miner with the given configuration.
    pub fn new(config: MinerConfig) -> Self {
        Self { config }
    }

    /// Create a miner with the given difficulty and no attempt cap.
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self::new(MinerConfig {
            difficulty,
            ..MinerConfig::default()
        })
    }

    /// The difficulty this miner targets.
    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    /// Mine a child of `parent` committing to `transactions`.
    ///
    /// The timestamp is captured once before the search; only the nonce
    /// varies between attempts. Returns `Exhausted` only when an attempt
    /// cap is configured.
    pub fn mine(&self, parent: &Block, transactions: Vec<Transaction>) -> Result<Block> {
        let difficulty = self.config.difficulty;
        let mut header = BlockHeader {
            index: parent.header.index + 1,
            timestamp: BlockHeader::current_timestamp(),
            parent_hash: parent.hash(),
            merkle_root: transaction_root(&transactions),
            nonce: 0,
            difficulty,
        };

        info!(index = header.index, difficulty, "mining block");
        let mut attempts: u64 = 0;

        loop {
            if let Some(cap) = self.config.max_attempts {
                if attempts >= cap {
                    return Err(MiningError::Exhausted {
                        attempts,
                        difficulty,
                    });
                }
            }

            let hash = header.hash();
            attempts += 1;

            if hash.meets_difficulty(difficulty) {
                info!(nonce = header.nonce, hash = %hash, attempts, "block mined");
                return Ok(Block::new(header, transactions));
            }

            header.nonce += 1;
        }
    }
}

/// Work achieved by a block hash: 16^n for a run of n leading zero hex
/// characters, saturating at `u64::MAX`.
pub fn block_work(hash: &Hash) -> u64 {
    1u64.checked_shl(4 * hash.leading_zero_nibbles())
        .unwrap_or(u64::MAX)
}
