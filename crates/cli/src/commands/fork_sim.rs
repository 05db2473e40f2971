//! Fork race: two branches compete from genesis, then one pulls ahead.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use forkchain_chain::{ForkStore, ForkStoreConfig};
use forkchain_core::Hash;

use crate::samples::tagged_txs;

#[derive(Args)]
pub struct ForkSimArgs {
    /// Required leading zero hex characters in each mined block hash
    #[arg(short, long, default_value_t = 3)]
    difficulty: u32,
}

pub fn run(args: ForkSimArgs) -> Result<()> {
    let mut store = ForkStore::new(ForkStoreConfig {
        difficulty: args.difficulty,
        ..ForkStoreConfig::default()
    });
    let genesis = store.genesis_hash();

    println!();
    println!(
        "Genesis (difficulty {}): {}",
        args.difficulty,
        short(&genesis).bright_yellow()
    );

    let a1 = store.extend(&genesis, tagged_txs("A1"))?;
    let b1 = store.extend(&genesis, tagged_txs("B1"))?;

    println!();
    println!("{}", "Two competing branches from genesis:".bold().cyan());
    println!();
    print_block(&store, "A1", &a1);
    print_block(&store, "B1", &b1);
    print_best(&store);

    let b2 = store.extend(&b1, tagged_txs("B2"))?;

    println!();
    println!("{}", "Branch B extended by one block:".bold().cyan());
    println!();
    print_block(&store, "B2", &b2);
    print_best(&store);

    println!();
    if store.reorg_count() == 0 {
        println!("No reorg: the heaviest branch never changed.");
    } else {
        for reorg in store.reorgs() {
            println!(
                "{}  tip moved {} -> {} (common ancestor {})",
                "REORG".red().bold(),
                short(&reorg.old_tip).bright_yellow(),
                short(&reorg.new_tip).bright_yellow(),
                short(&reorg.common_ancestor).bright_black()
            );
        }
    }

    let stats = store.stats();
    println!();
    println!(
        "{} blocks, {} tips, best work {}",
        stats.blocks.to_string().bright_cyan(),
        stats.tips.to_string().bright_cyan(),
        stats.best_cumulative_work.to_string().bright_cyan()
    );
    println!();

    Ok(())
}

fn print_block(store: &ForkStore, label: &str, hash: &Hash) {
    if let Some(node) = store.get(hash) {
        println!(
            "  {} {} {}",
            format!("{label}:").bold(),
            short(hash).bright_yellow(),
            format!("(work {}, cumulative {})", node.work, node.cumulative_work).bright_black()
        );
    }
}

fn print_best(store: &ForkStore) {
    let chain: Vec<String> = store
        .best_chain()
        .iter()
        .map(|hash| short(hash))
        .collect();
    println!();
    println!(
        "  {} {}",
        "Best chain:".bold(),
        chain.join(" -> ").bright_cyan()
    );
}

fn short(hash: &Hash) -> String {
    hash.to_hex()[..12].to_string()
}
