//! Append-only block tree with cumulative-work fork choice.
//!
//! Every mined block is kept, keyed by hash, even when it loses the fork
//! race. The best tip is the node with the highest cumulative work from
//! genesis; ties go to the lexicographically smaller hash. When the best
//! tip moves to a branch that does not contain the previous tip, the
//! switch is recorded as a reorg.

use forkchain_consensus::{block_work, ChainValidator, LinkError, Miner, MinerConfig, MiningError};
use forkchain_core::{Block, Hash, Transaction};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during fork store operations.
#[derive(Debug, Error)]
pub enum ForkStoreError {
    #[error("unknown parent: {0}")]
    UnknownParent(Hash),

    #[error("mined block failed validation: {0}")]
    InvalidBlock(#[from] LinkError),

    #[error("mining gave up after {attempts} attempts")]
    MiningExhausted { attempts: u64 },
}

impl From<MiningError> for ForkStoreError {
    fn from(err: MiningError) -> Self {
        match err {
            MiningError::Exhausted { attempts, .. } => Self::MiningExhausted { attempts },
        }
    }
}

pub type Result<T> = std::result::Result<T, ForkStoreError>;

/// Fork store configuration.
#[derive(Debug, Clone)]
pub struct ForkStoreConfig {
    /// Difficulty every mined block must meet.
    pub difficulty: u32,
    /// Attempt cap handed to the miner (None = unbounded).
    pub max_attempts: Option<u64>,
}

impl Default for ForkStoreConfig {
    fn default() -> Self {
        Self {
            difficulty: 3,
            max_attempts: None,
        }
    }
}

/// A stored block together with its fork-choice bookkeeping.
#[derive(Debug, Clone)]
pub struct ForkNode {
    /// The block itself.
    pub block: Block,
    /// Hash of the parent node (None only for genesis).
    pub parent_hash: Option<Hash>,
    /// Work achieved by this block's own hash.
    pub work: u64,
    /// Total work along the path from genesis to this block.
    pub cumulative_work: u64,
}

/// Record of the best tip switching to a different branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorgEvent {
    /// Deepest block shared by the old and new best branches.
    pub common_ancestor: Hash,
    pub old_tip: Hash,
    pub new_tip: Hash,
}

/// Summary counters for a fork store.
#[derive(Debug, Clone)]
pub struct ForkStoreStats {
    /// Total stored blocks, genesis included.
    pub blocks: usize,
    /// Number of leaf branches.
    pub tips: usize,
    /// Current best tip.
    pub best_tip: Hash,
    /// Cumulative work of the best tip.
    pub best_cumulative_work: u64,
    /// Number of branch switches seen so far.
    pub reorgs: usize,
}

/// The block tree and its fork-choice state.
///
/// Blocks enter the tree only through [`ForkStore::extend`], which mines
/// and validates them first, so every stored node is a valid child of its
/// parent and the tree is append-only.
pub struct ForkStore {
    nodes: HashMap<Hash, ForkNode>,
    best_tip: Hash,
    genesis_hash: Hash,
    miner: Miner,
    reorgs: Vec<ReorgEvent>,
}

impl ForkStore {
    /// Create a store seeded with a fresh genesis block.
    pub fn new(config: ForkStoreConfig) -> Self {
        let genesis = Block::genesis(config.difficulty);
        let genesis_hash = genesis.hash();
        let work = block_work(&genesis_hash);

        let mut nodes = HashMap::new();
        nodes.insert(
            genesis_hash,
            ForkNode {
                block: genesis,
                parent_hash: None,
                work,
                cumulative_work: work,
            },
        );

        info!(genesis = %genesis_hash, difficulty = config.difficulty, "fork store initialized");

        Self {
            nodes,
            best_tip: genesis_hash,
            genesis_hash,
            miner: Miner::new(MinerConfig {
                difficulty: config.difficulty,
                max_attempts: config.max_attempts,
            }),
            reorgs: Vec::new(),
        }
    }

    /// Create a store with the given difficulty and default limits.
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self::new(ForkStoreConfig {
            difficulty,
            ..ForkStoreConfig::default()
        })
    }

    /// Mine and insert a child of `parent_hash`, returning the new block's
    /// hash.
    ///
    /// The whole step runs under one exclusive borrow: parent lookup,
    /// mining, validation, work accounting, insertion, and best-tip
    /// re-evaluation, so no observer ever sees a half-applied extension.
    pub fn extend(&mut self, parent_hash: &Hash, transactions: Vec<Transaction>) -> Result<Hash> {
        let parent = self
            .nodes
            .get(parent_hash)
            .ok_or(ForkStoreError::UnknownParent(*parent_hash))?;

        let child = self.miner.mine(&parent.block, transactions)?;

        // The miner only produces valid children, but the check still runs
        // so an inconsistent block can never reach the tree.
        ChainValidator::check_link(&parent.block, &child)?;

        let child_hash = child.hash();
        let work = block_work(&child_hash);
        let cumulative_work = parent.cumulative_work.saturating_add(work);

        self.nodes.insert(
            child_hash,
            ForkNode {
                block: child,
                parent_hash: Some(*parent_hash),
                work,
                cumulative_work,
            },
        );
        debug!(block = %child_hash, work, cumulative_work, "block stored");

        self.update_best_tip(child_hash, cumulative_work);
        Ok(child_hash)
    }

    /// Whether `candidate` should replace the current best tip.
    fn candidate_wins(
        candidate_work: u64,
        candidate: &Hash,
        best_work: u64,
        best: &Hash,
    ) -> bool {
        candidate_work > best_work || (candidate_work == best_work && candidate < best)
    }

    fn update_best_tip(&mut self, candidate: Hash, cumulative_work: u64) {
        let best = &self.nodes[&self.best_tip];
        if !Self::candidate_wins(cumulative_work, &candidate, best.cumulative_work, &self.best_tip)
        {
            return;
        }

        let old_tip = self.best_tip;
        self.best_tip = candidate;

        if self.is_ancestor(&old_tip, &candidate) {
            info!(tip = %candidate, cumulative_work, "best tip advanced");
        } else {
            let common_ancestor = self
                .common_ancestor(&old_tip, &candidate)
                .expect("stored tips always share the genesis ancestor");
            warn!(
                %old_tip,
                new_tip = %candidate,
                %common_ancestor,
                "reorg: best tip switched branches"
            );
            self.reorgs.push(ReorgEvent {
                common_ancestor,
                old_tip,
                new_tip: candidate,
            });
        }
    }

    /// Whether `ancestor` lies on the path from `descendant` to genesis
    /// (a node is its own ancestor).
    fn is_ancestor(&self, ancestor: &Hash, descendant: &Hash) -> bool {
        let mut current = Some(*descendant);
        while let Some(hash) = current {
            if hash == *ancestor {
                return true;
            }
            current = self.nodes.get(&hash).and_then(|node| node.parent_hash);
        }
        false
    }

    /// Deepest block on both paths to genesis, or None if either hash is
    /// unknown.
    pub fn common_ancestor(&self, a: &Hash, b: &Hash) -> Option<Hash> {
        if !self.nodes.contains_key(a) || !self.nodes.contains_key(b) {
            return None;
        }

        let mut seen = HashSet::new();
        let mut current = Some(*a);
        while let Some(hash) = current {
            seen.insert(hash);
            current = self.nodes[&hash].parent_hash;
        }

        let mut current = Some(*b);
        while let Some(hash) = current {
            if seen.contains(&hash) {
                return Some(hash);
            }
            current = self.nodes[&hash].parent_hash;
        }

        None
    }

    /// Hashes from genesis to `tip` inclusive, genesis first. Empty when
    /// `tip` is unknown.
    pub fn chain_to(&self, tip: &Hash) -> Vec<Hash> {
        if !self.nodes.contains_key(tip) {
            return Vec::new();
        }

        let mut path = Vec::new();
        let mut current = Some(*tip);
        while let Some(hash) = current {
            path.push(hash);
            current = self.nodes[&hash].parent_hash;
        }
        path.reverse();
        path
    }

    /// The best chain, genesis first.
    pub fn best_chain(&self) -> Vec<Hash> {
        self.chain_to(&self.best_tip)
    }

    /// Current best tip hash.
    pub fn best_tip(&self) -> Hash {
        self.best_tip
    }

    /// Hash of the genesis block.
    pub fn genesis_hash(&self) -> Hash {
        self.genesis_hash
    }

    /// Look up a stored node by block hash.
    pub fn get(&self, hash: &Hash) -> Option<&ForkNode> {
        self.nodes.get(hash)
    }

    /// Iterate over all stored nodes in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = (&Hash, &ForkNode)> {
        self.nodes.iter()
    }

    /// Whether a block with this hash is stored.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    /// Number of stored blocks, genesis included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A store always holds at least genesis.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Difficulty required of every mined block.
    pub fn difficulty(&self) -> u32 {
        self.miner.difficulty()
    }

    /// All branch switches seen so far, oldest first.
    pub fn reorgs(&self) -> &[ReorgEvent] {
        &self.reorgs
    }

    /// Number of branch switches seen so far.
    pub fn reorg_count(&self) -> usize {
        self.reorgs.len()
    }

    /// Number of leaf branches in the tree.
    pub fn tip_count(&self) -> usize {
        let parents: HashSet<Hash> = self
            .nodes
            .values()
            .filter_map(|node| node.parent_hash)
            .collect();
        self.nodes
            .keys()
            .filter(|hash| !parents.contains(*hash))
            .count()
    }

    /// Summary counters.
    pub fn stats(&self) -> ForkStoreStats {
        ForkStoreStats {
            blocks: self.len(),
            tips: self.tip_count(),
            best_tip: self.best_tip,
            best_cumulative_work: self.nodes[&self.best_tip].cumulative_work,
            reorgs: self.reorg_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkchain_core::{hash, BlockHeader, Transaction};

    fn sample_txs(tag: &str) -> Vec<Transaction> {
        vec![Transaction::transfer("Alice", "Bob", 10).with("tag", tag)]
    }

    /// Insert a hand-built node with a chosen work value, bypassing the
    /// miner, so fork-choice decisions become deterministic.
    fn insert_fabricated(store: &mut ForkStore, parent: Hash, work: u64, salt: u64) -> Hash {
        let parent_node = store.nodes.get(&parent).expect("parent must exist");
        let block = Block::new(
            BlockHeader {
                index: parent_node.block.header.index + 1,
                timestamp: salt as f64,
                parent_hash: parent,
                merkle_root: Hash::ZERO,
                nonce: salt,
                difficulty: 0,
            },
            vec![],
        );
        let block_hash = block.hash();
        let cumulative_work = parent_node.cumulative_work + work;

        store.nodes.insert(
            block_hash,
            ForkNode {
                block,
                parent_hash: Some(parent),
                work,
                cumulative_work,
            },
        );
        store.update_best_tip(block_hash, cumulative_work);
        block_hash
    }

    #[test]
    fn test_new_store_holds_genesis() {
        let store = ForkStore::with_difficulty(1);
        let genesis = store.genesis_hash();

        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
        assert_eq!(store.best_tip(), genesis);
        assert_eq!(store.best_chain(), vec![genesis]);
        assert_eq!(store.tip_count(), 1);
        assert_eq!(store.reorg_count(), 0);

        let node = store.get(&genesis).unwrap();
        assert!(node.block.is_genesis());
        assert!(node.parent_hash.is_none());
        assert_eq!(node.cumulative_work, node.work);
    }

    #[test]
    fn test_extend_mines_and_stores_child() {
        let mut store = ForkStore::with_difficulty(1);
        let genesis = store.genesis_hash();

        let child = store.extend(&genesis, sample_txs("c1")).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.contains(&child));
        assert_eq!(store.best_tip(), child);
        assert_eq!(store.best_chain(), vec![genesis, child]);

        let node = store.get(&child).unwrap();
        assert_eq!(node.parent_hash, Some(genesis));
        assert_eq!(node.block.header.index, 1);
        assert!(child.meets_difficulty(1));
        assert_eq!(
            node.cumulative_work,
            store.get(&genesis).unwrap().cumulative_work + node.work
        );
    }

    #[test]
    fn test_extend_unknown_parent() {
        let mut store = ForkStore::with_difficulty(1);
        let missing = hash(b"never inserted");

        let result = store.extend(&missing, sample_txs("x"));
        assert!(matches!(result, Err(ForkStoreError::UnknownParent(h)) if h == missing));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_extend_exhausted_mining() {
        let mut store = ForkStore::new(ForkStoreConfig {
            difficulty: 64,
            max_attempts: Some(3),
        });
        let genesis = store.genesis_hash();

        let result = store.extend(&genesis, sample_txs("x"));
        assert!(matches!(
            result,
            Err(ForkStoreError::MiningExhausted { attempts: 3 })
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.best_tip(), genesis);
    }

    #[test]
    fn test_candidate_wins_rule() {
        let small = hash(b"aaa").min(hash(b"bbb"));
        let large = hash(b"aaa").max(hash(b"bbb"));

        assert!(ForkStore::candidate_wins(5, &large, 4, &small));
        assert!(!ForkStore::candidate_wins(4, &small, 5, &large));
        assert!(ForkStore::candidate_wins(4, &small, 4, &large));
        assert!(!ForkStore::candidate_wins(4, &large, 4, &small));
        // A candidate never beats itself
        assert!(!ForkStore::candidate_wins(4, &small, 4, &small));
    }

    #[test]
    fn test_heavier_branch_wins_and_records_reorg() {
        let mut store = ForkStore::with_difficulty(0);
        let genesis = store.genesis_hash();

        let a1 = insert_fabricated(&mut store, genesis, 100, 1);
        assert_eq!(store.best_tip(), a1);
        assert_eq!(store.reorg_count(), 0);

        let b1 = insert_fabricated(&mut store, genesis, 60, 2);
        assert_eq!(store.best_tip(), a1);
        assert_eq!(store.reorg_count(), 0);

        let b2 = insert_fabricated(&mut store, b1, 60, 3);
        assert_eq!(store.best_tip(), b2);
        assert_eq!(store.best_chain(), vec![genesis, b1, b2]);
        assert_eq!(
            store.reorgs(),
            &[ReorgEvent {
                common_ancestor: genesis,
                old_tip: a1,
                new_tip: b2,
            }]
        );

        // Extending the losing branch below the best work changes nothing
        let a2 = insert_fabricated(&mut store, a1, 10, 4);
        assert_eq!(store.best_tip(), b2);

        // Overtaking again switches back and records a second reorg
        let a3 = insert_fabricated(&mut store, a2, 20, 5);
        assert_eq!(store.best_tip(), a3);
        assert_eq!(store.reorg_count(), 2);
        assert_eq!(
            store.reorgs()[1],
            ReorgEvent {
                common_ancestor: genesis,
                old_tip: b2,
                new_tip: a3,
            }
        );
        assert_eq!(store.tip_count(), 2);
    }

    #[test]
    fn test_advance_on_same_branch_is_not_a_reorg() {
        let mut store = ForkStore::with_difficulty(0);
        let genesis = store.genesis_hash();

        let mut tip = genesis;
        for salt in 0..5 {
            tip = insert_fabricated(&mut store, tip, 10, salt);
            assert_eq!(store.best_tip(), tip);
        }
        assert_eq!(store.reorg_count(), 0);
        assert_eq!(store.best_chain().len(), 6);
    }

    #[test]
    fn test_equal_work_tie_breaks_to_smaller_hash() {
        let mut store = ForkStore::with_difficulty(0);
        let genesis = store.genesis_hash();

        let e1 = insert_fabricated(&mut store, genesis, 50, 10);
        let f1 = insert_fabricated(&mut store, genesis, 50, 11);

        let expected = e1.min(f1);
        assert_eq!(store.best_tip(), expected);
        // A switch happened only if the later insert won the tie
        assert_eq!(store.reorg_count(), usize::from(f1 < e1));
    }

    #[test]
    fn test_common_ancestor() {
        let mut store = ForkStore::with_difficulty(0);
        let genesis = store.genesis_hash();

        let a1 = insert_fabricated(&mut store, genesis, 10, 1);
        let a2 = insert_fabricated(&mut store, a1, 10, 2);
        let b1 = insert_fabricated(&mut store, genesis, 10, 3);

        assert_eq!(store.common_ancestor(&a2, &b1), Some(genesis));
        assert_eq!(store.common_ancestor(&a1, &a2), Some(a1));
        assert_eq!(store.common_ancestor(&a2, &a2), Some(a2));
        assert_eq!(store.common_ancestor(&a2, &hash(b"unknown")), None);
    }

    #[test]
    fn test_chain_to_unknown_is_empty() {
        let store = ForkStore::with_difficulty(1);
        assert!(store.chain_to(&hash(b"unknown")).is_empty());
    }

    #[test]
    fn test_stats() {
        let mut store = ForkStore::with_difficulty(0);
        let genesis = store.genesis_hash();
        let t1 = insert_fabricated(&mut store, genesis, 10, 1);
        insert_fabricated(&mut store, genesis, 5, 2);

        let stats = store.stats();
        assert_eq!(stats.blocks, 3);
        assert_eq!(stats.tips, 2);
        assert_eq!(stats.best_tip, t1);
        assert_eq!(stats.reorgs, 0);
        assert_eq!(
            stats.best_cumulative_work,
            store.get(&t1).unwrap().cumulative_work
        );
    }
}
