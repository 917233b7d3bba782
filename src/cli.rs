//! CLI commands for racecard.
//!
//! Scrapes a single race card or a whole racing schedule and prints the
//! result as JSON or as a table.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::{AppConfig, JurisdictionConfig};
use crate::scraper::parsers::{RaceCardParser, RaceStatus};
use crate::scraper::{RaceCardScraper, ScheduleAggregator, SiteFetcher};
use crate::types::{
    Price, RaceCardReport, ScheduleReport, JOCKEY_SENTINEL, PRICE_SENTINEL,
};

#[derive(Parser)]
#[command(name = "racecard")]
#[command(version, about = "Race card and racing schedule scraper for Sportsbet horse racing", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape horses, jockeys and odds from one race page
    Card {
        /// Race page URL, absolute or site-relative
        #[arg(value_name = "URL")]
        url: String,

        /// Output format (json, table)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Fetch the page through headless Chrome
        #[arg(long)]
        render: bool,
    },

    /// Scrape a racing schedule and the race card of every race on it
    Schedule {
        /// today, tomorrow, horse/today, horse/tomorrow or a YYYY-MM-DD date
        #[arg(default_value = "horse/today", value_parser = parse_scope)]
        scope: String,

        /// Which races to keep
        #[arg(short, long, value_enum, default_value_t = RaceStatus::All)]
        status: RaceStatus,

        /// Output format (json, table)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Only parse the schedule page, skip the race cards
        #[arg(long)]
        no_cards: bool,

        /// Keep racetracks from every country
        #[arg(long)]
        all_countries: bool,

        /// Pause between race page fetches, in milliseconds
        #[arg(long)]
        pause_ms: Option<u64>,

        /// Re-fetch through headless Chrome when a race page has no outcomes
        #[arg(long)]
        render_fallback: bool,
    },
}

/// Validate a schedule scope
fn parse_scope(scope: &str) -> Result<String, String> {
    let scope = scope.trim().trim_matches('/');
    let day = scope.strip_prefix("horse/").unwrap_or(scope);

    if day == "today" || day == "tomorrow" || NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok() {
        Ok(scope.to_string())
    } else {
        Err(format!(
            "invalid schedule scope `{}`: expected today, tomorrow or YYYY-MM-DD",
            scope
        ))
    }
}

/// Scrape a single race card.
pub async fn run_card(url: String, format: String, render: bool) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if render {
        config.scraper.browser_fallback = true;
    }

    let parser = RaceCardParser::new(&config.markers)?;
    let fetcher = SiteFetcher::connect(&config.scraper).await?;
    let scraper = RaceCardScraper::new(&fetcher, &parser, &config.scraper.base_url)
        .with_render_fallback(config.scraper.browser_fallback)
        .with_pause(config.scraper.race_pause());

    tracing::info!("Scraping race card: {}", url);
    let horses = if render {
        scraper.scrape_rendered(&url).await
    } else {
        scraper.scrape(&url).await
    };
    if let Err(e) = fetcher.close().await {
        tracing::warn!("{:#}", e);
    }

    let report = RaceCardReport::new(&url, horses?);
    tracing::info!("Found {} horses", report.total_horses);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "table" => print_card_table(&report),
        _ => {
            tracing::warn!("Unknown format: {}. Using JSON.", format);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Scrape a racing schedule and its race cards.
#[allow(clippy::too_many_arguments)]
pub async fn run_schedule(
    scope: String,
    status: RaceStatus,
    format: String,
    no_cards: bool,
    all_countries: bool,
    pause_ms: Option<u64>,
    render_fallback: bool,
) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(ms) = pause_ms {
        config.scraper.race_pause_ms = ms;
    }
    if render_fallback {
        config.scraper.browser_fallback = true;
    }
    let jurisdiction = if all_countries {
        JurisdictionConfig::everywhere()
    } else {
        config.jurisdiction.clone()
    };

    let parser = RaceCardParser::new(&config.markers)?;
    let fetcher = SiteFetcher::connect(&config.scraper).await?;
    let cards = RaceCardScraper::new(&fetcher, &parser, &config.scraper.base_url)
        .with_render_fallback(config.scraper.browser_fallback)
        .with_pause(config.scraper.race_pause());
    let aggregator =
        ScheduleAggregator::new(cards, jurisdiction, status, config.scraper.race_pause());

    let tracks = if no_cards {
        aggregator.tracks(&scope).await
    } else {
        aggregator.run(&scope).await
    };
    if let Err(e) = fetcher.close().await {
        tracing::warn!("{:#}", e);
    }

    let report = ScheduleReport::new(&scope, tracks?);
    tracing::info!(
        "Scraped {} races across {} racetracks",
        report.total_races,
        report.racetracks.len()
    );

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "table" => print_schedule_table(&report),
        _ => {
            tracing::warn!("Unknown format: {}. Using JSON.", format);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn price(p: &Option<Price>) -> &str {
    p.as_ref().map_or(PRICE_SENTINEL, Price::as_str)
}

/// Print race card in table format.
fn print_card_table(report: &RaceCardReport) {
    println!("Race: {}", report.race_url);
    println!();
    println!(
        "  {:>3} {:>4}  {:<24} {:<20} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "#", "No", "Horse", "Jockey", "Open", "Fluc1", "Fluc2", "Win", "Place", "EW"
    );
    for h in &report.horses {
        println!(
            "  {:>3} {:>4}  {:<24} {:<20} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7}",
            h.rank,
            h.horse_number,
            h.horse_name,
            h.jockey.as_deref().unwrap_or(JOCKEY_SENTINEL),
            price(&h.odds.open),
            price(&h.odds.fluc1),
            price(&h.odds.fluc2),
            price(&h.odds.win_fixed),
            price(&h.odds.place_fixed),
            price(&h.odds.each_way_fixed),
        );
    }
    println!();
    println!("Total horses: {}", report.total_horses);
}

/// Print schedule in table format.
fn print_schedule_table(report: &ScheduleReport) {
    println!("Schedule: {}", report.schedule_date);
    println!();

    for track in &report.racetracks {
        println!("=== {} ({}) ===", track.racetrack, track.country);
        if let Some(link) = &track.track_link_url {
            println!("  {}", link);
        }
        for race in &track.races {
            let result = if race.result.is_empty() { "-" } else { race.result.as_str() };
            println!(
                "  {:>4}  {:>5}  {:<10} {:>3} horses  {}",
                race.race_number,
                race.time,
                result,
                race.horse_count,
                race.link.as_deref().unwrap_or("")
            );
        }
        println!();
    }

    println!(
        "Total: {} races across {} racetracks",
        report.total_races,
        report.racetracks.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scope() {
        assert_eq!(parse_scope("today").unwrap(), "today");
        assert_eq!(parse_scope("/horse/tomorrow/").unwrap(), "horse/tomorrow");
        assert_eq!(parse_scope("2025-10-25").unwrap(), "2025-10-25");
        assert!(parse_scope("2025-13-01").is_err());
        assert!(parse_scope("yesterday").is_err());
    }

    #[test]
    fn test_schedule_defaults() {
        let cli = Cli::try_parse_from(["racecard", "schedule"]).unwrap();
        match cli.command {
            Commands::Schedule {
                scope,
                status,
                format,
                no_cards,
                ..
            } => {
                assert_eq!(scope, "horse/today");
                assert_eq!(status, RaceStatus::All);
                assert_eq!(format, "json");
                assert!(!no_cards);
            }
            _ => panic!("expected schedule command"),
        }
    }

    #[test]
    fn test_card_args() {
        let cli = Cli::try_parse_from([
            "racecard",
            "card",
            "/horse-racing/australia-nz/ipswich/race-3-9733774",
            "--format",
            "table",
        ])
        .unwrap();
        match cli.command {
            Commands::Card { url, format, render } => {
                assert_eq!(url, "/horse-racing/australia-nz/ipswich/race-3-9733774");
                assert_eq!(format, "table");
                assert!(!render);
            }
            _ => panic!("expected card command"),
        }
    }

    #[test]
    fn test_status_value() {
        let cli = Cli::try_parse_from(["racecard", "schedule", "tomorrow", "--status", "completed"])
            .unwrap();
        match cli.command {
            Commands::Schedule { scope, status, .. } => {
                assert_eq!(scope, "tomorrow");
                assert_eq!(status, RaceStatus::Completed);
            }
            _ => panic!("expected schedule command"),
        }
    }
}
