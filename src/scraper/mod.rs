//! Web scraper module for Sportsbet horse racing pages.
//!
//! Provides page fetching, HTML parsing and the schedule-wide aggregation.

pub mod aggregator;
pub mod browser;
pub mod fetch;
pub mod parsers;
pub mod pause;

pub use aggregator::{RaceCardScraper, ScheduleAggregator};
pub use fetch::SiteFetcher;

use anyhow::Result;
use url::Url;

/// Build racing schedule URL
/// URL: https://www.sportsbet.com.au/racing-schedule/<scope>
pub fn schedule_url(base_url: &str, scope: &str) -> String {
    format!(
        "{}/racing-schedule/{}",
        base_url.trim_end_matches('/'),
        scope.trim_matches('/')
    )
}

/// Resolve a site-relative race link against the base URL
pub fn absolute_url(base_url: &str, link: &str) -> Result<String> {
    Ok(Url::parse(base_url)?.join(link)?.to_string())
}
