//! Racecard Scraper
//!
//! CLI that turns Sportsbet horse racing pages into structured JSON:
//! single race cards, or a whole schedule with the card of every race.

mod cli;
mod config;
mod retry;
mod scraper;
mod types;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean JSON document
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "racecard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Card { url, format, render } => cli::run_card(url, format, render).await,
        Commands::Schedule {
            scope,
            status,
            format,
            no_cards,
            all_countries,
            pause_ms,
            render_fallback,
        } => {
            cli::run_schedule(
                scope,
                status,
                format,
                no_cards,
                all_countries,
                pause_ms,
                render_fallback,
            )
            .await
        }
    }
}
