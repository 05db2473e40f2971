//! Sample transaction sets for the demo commands.

use forkchain_core::Transaction;

/// The four-transfer set used by every demo.
pub fn sample_txs() -> Vec<Transaction> {
    vec![
        Transaction::transfer("Alice", "Bob", 10),
        Transaction::transfer("Bob", "Carol", 5),
        Transaction::transfer("Carol", "Dave", 2),
        Transaction::transfer("Dave", "Alice", 1),
    ]
}

/// Same set with a tag field, so parallel branches commit to distinct
/// payloads and never collide on block hashes.
pub fn tagged_txs(tag: &str) -> Vec<Transaction> {
    sample_txs()
        .into_iter()
        .map(|tx| tx.with("tag", tag))
        .collect()
}
