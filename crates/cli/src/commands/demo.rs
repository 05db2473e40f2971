//! Single-chain walkthrough: mine, validate, prove.

use anyhow::{ensure, Result};
use clap::Args;
use colored::Colorize;
use forkchain_consensus::{ChainValidator, Miner};
use forkchain_core::{verify_proof, Block, MerkleTree, Side};

use crate::samples::sample_txs;

#[derive(Args)]
pub struct DemoArgs {
    /// Required leading zero hex characters in each mined block hash
    #[arg(short, long, default_value_t = 3)]
    difficulty: u32,
}

pub fn run(args: DemoArgs) -> Result<()> {
    let txs = sample_txs();
    let genesis = Block::genesis(args.difficulty);

    println!();
    println!(
        "{}",
        format!("Mining one block at difficulty {}...", args.difficulty)
            .bold()
            .cyan()
    );

    let miner = Miner::with_difficulty(args.difficulty);
    let block = miner.mine(&genesis, txs.clone())?;

    println!();
    println!("  Hash:         {}", block.hash().to_hex().bright_yellow());
    println!(
        "  Nonce:        {}",
        block.header.nonce.to_string().bright_cyan()
    );
    println!(
        "  Merkle Root:  {}",
        block.header.merkle_root.to_hex().bright_black()
    );
    println!(
        "  Transactions: {}",
        block.tx_count().to_string().bright_cyan()
    );

    let tree = MerkleTree::from_transactions(&txs);
    let index = 2;
    let proof = tree.proof(index);

    println!();
    println!(
        "{}",
        format!("Inclusion proof for transaction {}:", index).bold().cyan()
    );
    println!();
    println!("  {}", txs[index].to_string().bright_yellow());
    for (i, step) in proof.iter().enumerate() {
        let side = match step.side {
            Side::Left => "left ",
            Side::Right => "right",
        };
        println!(
            "  {} {} {}",
            format!("{}.", i + 1).bright_black(),
            side,
            step.sibling.to_hex().bright_black()
        );
    }

    let chain = [genesis, block];
    ensure!(
        ChainValidator::validate_chain(&chain),
        "chain validation failed"
    );
    ensure!(
        verify_proof(txs[index].hash(), &proof, &tree.root()),
        "merkle proof verification failed"
    );

    println!();
    println!("{}  Chain valid, proof verified", "✓".green().bold());
    println!();

    Ok(())
}
