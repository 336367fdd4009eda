use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::ranking::Ranker;
use crate::routes::build_app;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "fitment",
    about = "Score and rank job candidates by fitment",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Recompute and persist fitment scores for every application to a job
    Rank(RankArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Job whose applications should be ranked
    job_id: String,
}

/// Parses the command line. `--help` and `--version` exit here, before any
/// configuration is read.
pub fn parse() -> Cli {
    Cli::parse()
}

pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => serve(config, args).await,
        Command::Rank(args) => rank(config, args).await,
    }
}

async fn serve(config: Config, args: ServeArgs) -> Result<()> {
    let state = AppState::from_config(&config)?;

    let app = build_app(state);

    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn rank(config: Config, args: RankArgs) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let ranker = Ranker::from_state(&state)?;

    let results = ranker
        .rank_job(&args.job_id, None)
        .await
        .with_context(|| format!("ranking job {} failed", args.job_id))?;

    for result in &results {
        println!(
            "{:>7.2}  {}  {}",
            result.fitment_score,
            result.candidate_id,
            result.display_name.as_deref().unwrap_or("-")
        );
    }
    info!(job_id = %args.job_id, ranked = results.len(), "done");

    Ok(())
}
