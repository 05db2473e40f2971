//! Merkle commitments over ordered transaction sets.
//!
//! `merkle_root` computes the bare commitment, `MerkleTree` additionally
//! keeps every level so it can produce inclusion proofs, and `verify_proof`
//! checks a claimed leaf against a root using nothing but the proof itself.

use crate::hash::{hash_concat, Hash};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Which side of the pairing a recorded sibling sits on.
///
/// Sides are captured while the proof is generated. Verification must use
/// the recorded side as-is and never re-derive it from step position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Left,
    Right,
}

/// One step of an inclusion proof: a sibling hash and which side it
/// occupies in the pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    pub sibling: Hash,
    pub side: Side,
}

/// Compute the merkle root of a list of leaf hashes.
///
/// Returns the zero hash for an empty list and the leaf itself for a
/// single-element list. Odd levels pair their last element with itself.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return Hash::ZERO;
    }

    if leaves.len() == 1 {
        return leaves[0];
    }

    let mut current_level: Vec<Hash> = leaves.to_vec();

    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity(current_level.len().div_ceil(2));

        for chunk in current_level.chunks(2) {
            let combined = if chunk.len() == 2 {
                hash_concat(&[chunk[0].as_ref(), chunk[1].as_ref()])
            } else {
                // Odd number of elements: hash the last one with itself
                hash_concat(&[chunk[0].as_ref(), chunk[0].as_ref()])
            };
            next_level.push(combined);
        }

        current_level = next_level;
    }

    current_level[0]
}

/// Hash each transaction canonically and compute the root over the leaf
/// hashes, preserving order.
pub fn transaction_root(transactions: &[Transaction]) -> Hash {
    let leaves: Vec<Hash> = transactions.iter().map(|tx| tx.hash()).collect();
    merkle_root(&leaves)
}

/// A merkle tree that retains every level for proof generation.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All nodes level by level, leaves first. Empty when built from no
    /// leaves.
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a merkle tree from a list of leaf hashes.
    pub fn new(leaves: &[Hash]) -> Self {
        if leaves.is_empty() {
            return Self { levels: Vec::new() };
        }

        let mut levels = vec![leaves.to_vec()];

        while levels.last().expect("at least one level").len() > 1 {
            let current = levels.last().expect("at least one level");
            let mut next = Vec::with_capacity(current.len().div_ceil(2));

            for chunk in current.chunks(2) {
                let combined = if chunk.len() == 2 {
                    hash_concat(&[chunk[0].as_ref(), chunk[1].as_ref()])
                } else {
                    hash_concat(&[chunk[0].as_ref(), chunk[0].as_ref()])
                };
                next.push(combined);
            }

            levels.push(next);
        }

        Self { levels }
    }

    /// Build a tree over the canonical hashes of a transaction set.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let leaves: Vec<Hash> = transactions.iter().map(|tx| tx.hash()).collect();
        Self::new(&leaves)
    }

    /// The root of the tree, or the zero hash for an empty tree.
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or(Hash::ZERO)
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(|level| level.len()).unwrap_or(0)
    }

    /// Generate an inclusion proof for the leaf at `index`.
    ///
    /// Returns an empty sequence when `index` is out of range. A single-leaf
    /// tree also yields an empty proof: the leaf is the root.
    pub fn proof(&self, index: usize) -> Vec<ProofStep> {
        if index >= self.leaf_count() {
            return Vec::new();
        }

        let mut steps = Vec::new();
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let (sibling_idx, side) = if idx.is_multiple_of(2) {
                (idx + 1, Side::Right)
            } else {
                (idx - 1, Side::Left)
            };

            let sibling = if sibling_idx < level.len() {
                level[sibling_idx]
            } else {
                level[idx] // Odd leaf hashes with itself
            };

            steps.push(ProofStep { sibling, side });
            idx /= 2;
        }

        steps
    }
}

/// Verify an inclusion proof: fold the leaf upward through each recorded
/// step and compare the result with the expected root.
pub fn verify_proof(leaf: Hash, proof: &[ProofStep], root: &Hash) -> bool {
    let mut current = leaf;

    for step in proof {
        current = match step.side {
            Side::Left => hash_concat(&[step.sibling.as_ref(), current.as_ref()]),
            Side::Right => hash_concat(&[current.as_ref(), step.sibling.as_ref()]),
        };
    }

    current == *root
}
