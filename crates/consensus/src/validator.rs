//! Chain linkage validation rules.
//!
//! The surface is boolean: a link either holds or it does not. The
//! structured reasons behind a rejection are still available through
//! `check_link` for callers that need to report why.

use forkchain_core::{transaction_root, Block};
use thiserror::Error;
use tracing::debug;

/// A reason a parent/child link is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("child index not sequential (expected {expected}, got {got})")]
    IndexMismatch { expected: u64, got: u64 },

    #[error("child does not reference the parent's hash")]
    ParentHashMismatch,

    #[error("block hash does not meet difficulty {difficulty}")]
    DifficultyNotMet { difficulty: u32 },

    #[error("merkle root does not match the block's transactions")]
    MerkleRootMismatch,
}

/// Validates that blocks extend their parents correctly.
pub struct ChainValidator;

impl ChainValidator {
    /// Check a parent/child link, reporting the first failed condition.
    pub fn check_link(parent: &Block, child: &Block) -> Result<(), LinkError> {
        if child.header.index != parent.header.index + 1 {
            return Err(LinkError::IndexMismatch {
                expected: parent.header.index + 1,
                got: child.header.index,
            });
        }

        if child.header.parent_hash != parent.hash() {
            return Err(LinkError::ParentHashMismatch);
        }

        if !child.hash().meets_difficulty(child.header.difficulty) {
            return Err(LinkError::DifficultyNotMet {
                difficulty: child.header.difficulty,
            });
        }

        if transaction_root(&child.transactions) != child.header.merkle_root {
            return Err(LinkError::MerkleRootMismatch);
        }

        Ok(())
    }

    /// Whether `child` validly extends `parent`.
    pub fn validate_link(parent: &Block, child: &Block) -> bool {
        match Self::check_link(parent, child) {
            Ok(()) => true,
            Err(reason) => {
                debug!(%reason, child = %child.hash(), "link validation failed");
                false
            }
        }
    }

    /// Whether every adjacent pair in `blocks` is a valid link.
    ///
    /// Empty and single-block sequences are trivially valid. The first
    /// block is validated only as a parent, so an unmined genesis anchors
    /// the chain without meeting its own difficulty.
    pub fn validate_chain(blocks: &[Block]) -> bool {
        blocks
            .windows(2)
            .all(|pair| Self::validate_link(&pair[0], &pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pow::Miner;
    use forkchain_core::{hash, Transaction};

    fn mined_child(parent: &Block) -> Block {
        Miner::with_difficulty(1)
            .mine(parent, vec![Transaction::transfer("Alice", "Bob", 10)])
            .unwrap()
    }

    #[test]
    fn test_valid_link() {
        let genesis = Block::genesis(1);
        let child = mined_child(&genesis);

        assert!(ChainValidator::check_link(&genesis, &child).is_ok());
        assert!(ChainValidator::validate_link(&genesis, &child));
    }

    #[test]
    fn test_index_mismatch_rejected() {
        let genesis = Block::genesis(1);
        let mut child = mined_child(&genesis);
        child.header.index = 5;

        assert!(matches!(
            ChainValidator::check_link(&genesis, &child),
            Err(LinkError::IndexMismatch {
                expected: 1,
                got: 5
            })
        ));
        assert!(!ChainValidator::validate_link(&genesis, &child));
    }

    #[test]
    fn test_parent_hash_mismatch_rejected() {
        let genesis = Block::genesis(1);
        let mut child = mined_child(&genesis);
        child.header.parent_hash = hash(b"bogus parent");

        assert!(matches!(
            ChainValidator::check_link(&genesis, &child),
            Err(LinkError::ParentHashMismatch)
        ));
    }

    #[test]
    fn test_difficulty_not_met_rejected() {
        let genesis = Block::genesis(1);
        let mut child = mined_child(&genesis);
        // Re-declaring a much higher difficulty changes the hash, which
        // cannot plausibly carry 64 zero hex chars
        child.header.difficulty = 64;

        assert!(matches!(
            ChainValidator::check_link(&genesis, &child),
            Err(LinkError::DifficultyNotMet { difficulty: 64 })
        ));
    }

    #[test]
    fn test_tampered_transactions_rejected() {
        let genesis = Block::genesis(1);
        let mut child = mined_child(&genesis);
        // The header (and therefore hash and difficulty) is untouched, so
        // the stale merkle root is the first check that fails
        child.transactions.push(Transaction::transfer("Mallory", "Mallory", 1_000_000));

        assert!(matches!(
            ChainValidator::check_link(&genesis, &child),
            Err(LinkError::MerkleRootMismatch)
        ));
        assert!(!ChainValidator::validate_link(&genesis, &child));
    }

    #[test]
    fn test_validate_chain_trivial_cases() {
        assert!(ChainValidator::validate_chain(&[]));
        assert!(ChainValidator::validate_chain(&[Block::genesis(1)]));
    }

    #[test]
    fn test_validate_chain_multiple_links() {
        let genesis = Block::genesis(1);
        let b1 = mined_child(&genesis);
        let b2 = mined_child(&b1);

        assert!(ChainValidator::validate_chain(&[
            genesis.clone(),
            b1.clone(),
            b2.clone()
        ]));

        let mut tampered = b1;
        tampered.transactions.clear();
        assert!(!ChainValidator::validate_chain(&[genesis, tampered, b2]));
    }
}
