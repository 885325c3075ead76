//! Bloxlink - tiered data cache for the Bloxlink bot.
//!
//! Command-line access to the same `AppState` the bot's command handlers
//! use: fetch users, guilds and raw items through the tier hierarchy, or
//! write fields through to every tier.

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use bloxlink::bot::AppState;
use bloxlink::cli::{self, Cli};
use bloxlink::config::Config;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bloxlink=info,mongodb=warn,fred=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded (backend: {:?})", config.backend);

    let state = AppState::connect(&config).await?;

    let output = cli::execute(args.command, &state).await?;
    println!("{output}");

    debug!("Cache stats: {:?}", state.items.stats());
    debug!("Finished in {}ms", state.uptime().num_milliseconds());

    Ok(())
}
