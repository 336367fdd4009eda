mod cli;
mod config;
mod errors;
mod models;
mod ranking;
mod routes;
mod scoring;
mod state;
mod store;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::parse();

    // Load configuration (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("fitment={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Fitment API v{}", env!("CARGO_PKG_VERSION"));

    cli::run(cli, config).await
}
