//! CLI commands module.

use anyhow::Result;
use clap::Subcommand;

mod demo;
mod fork_sim;

#[derive(Subcommand)]
pub enum Commands {
    /// Mine one block over genesis, validate the chain, and prove a
    /// transaction's inclusion
    Demo(demo::DemoArgs),
    /// Race two branches from genesis and watch the best tip move
    ForkSim(fork_sim::ForkSimArgs),
}

pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Demo(args) => demo::run(args),
        Commands::ForkSim(args) => fork_sim::run(args),
    }
}
