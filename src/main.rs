use anyhow::{Context, Result};
use clap::Parser;

use herald::config::Config;
use herald::run::{run_once, RunOptions};

#[derive(Parser, Debug)]
#[command(
    name = "herald",
    about = "Single-pass RSS-to-webhook notifier for YouTube channel feeds"
)]
struct Args {
    /// On a first run, mark all items currently in the feed as seen
    /// without sending notifications
    #[arg(long, short = 's')]
    skip_existing: bool,

    /// Clear the persisted seen set before loading it
    #[arg(long, short = 'c')]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Configuration errors are the only fatal category: report once, exit
    // non-zero before any other work. Per-entry failures later never
    // change the exit code.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "Loaded configuration");

    let client = reqwest::Client::builder()
        .user_agent(concat!("herald/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    run_once(
        &config,
        &client,
        RunOptions {
            skip_existing: args.skip_existing,
            clear: args.clear,
        },
    )
    .await
}
