use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "handoff_queue")]
#[command(about = "Bounded blocking queue producer/consumer handoff demo")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hand off a sequence of integers from producers to consumers
    Run {
        /// Queue capacity (must be greater than 0)
        #[arg(short, long, allow_negative_numbers = true)]
        capacity: Option<i64>,

        /// Number of source items (1..=N)
        #[arg(short, long)]
        items: Option<usize>,

        /// Number of producer threads
        #[arg(short, long)]
        producers: Option<usize>,

        /// Number of consumer threads
        #[arg(short = 'n', long)]
        consumers: Option<usize>,

        /// Give up joining after this many milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Configuration preset (default, high_throughput, testing)
        #[arg(long)]
        preset: Option<String>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Suppress per-item progress output
        #[arg(short, long)]
        quiet: bool,

        /// Print the result report as JSON
        #[arg(long)]
        json: bool,
    },
}
