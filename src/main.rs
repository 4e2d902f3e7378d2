//! skillbench CLI
//!
//! Subcommands:
//! - `check`: load a task file and report what it sets up
//! - `replay`: run a task headless against recorded hand tracking and print every
//!   interaction event as a JSON line

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod check;
mod replay;

#[derive(Parser, Debug)]
#[command(name = "skillbench")]
#[command(about = "Validate task files and replay recorded interaction sessions", long_about = None)]
struct Cli {
    /// Log engine decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a task file and summarize it
    Check(check::CheckArgs),
    /// Drive a task with recorded hand frames
    Replay(replay::ReplayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check(args) => check::run(args),
        Commands::Replay(args) => replay::run(args),
    }
}
