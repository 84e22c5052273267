use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use handoff_queue::cli::{execute_run, Cli, RunOptions};

/// RUST_LOG があればそれを、なければ info をフィルタにしてstderrへ出力
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match execute_run(RunOptions::from(cli.command)).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("❌ エラー: {error:#}");
            std::process::exit(1);
        }
    }
}
