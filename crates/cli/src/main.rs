//! forkchain CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod samples;

#[derive(Parser)]
#[command(name = "forkchain")]
#[command(about = "A minimal proof-of-work blockchain with fork tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<commands::Commands>,
}

fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(cmd) => {
            if let Err(e) = commands::run(cmd) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("forkchain - a minimal proof-of-work blockchain");
            println!("Run 'forkchain --help' for usage information.");
        }
    }
}
