//! Drives the race card parser across every race of a schedule page.
//!
//! Everything runs sequentially: one race page is fetched and parsed before
//! the next is requested, with a fixed pause in between.

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use super::fetch::PageFetcher;
use super::parsers::{RaceCardParser, RaceStatus, ScheduleParser};
use super::pause::RequestPause;
use super::{absolute_url, schedule_url};
use crate::config::JurisdictionConfig;
use crate::types::{HorseRecord, TrackEntry};

/// Fetches and parses single race pages
pub struct RaceCardScraper<'a, F> {
    fetcher: &'a F,
    parser: &'a RaceCardParser,
    base_url: String,
    render_fallback: bool,
    pause: Duration,
}

impl<'a, F: PageFetcher> RaceCardScraper<'a, F> {
    pub fn new(fetcher: &'a F, parser: &'a RaceCardParser, base_url: &str) -> Self {
        Self {
            fetcher,
            parser,
            base_url: base_url.to_string(),
            render_fallback: false,
            pause: Duration::ZERO,
        }
    }

    /// Re-fetch through the rendering path when the static markup has no outcomes
    pub fn with_render_fallback(mut self, enabled: bool) -> Self {
        self.render_fallback = enabled;
        self
    }

    /// Delay before the rendered re-fetch of a page already requested once
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Scrape the horses of one race page; `link` may be site-relative
    pub async fn scrape(&self, link: &str) -> Result<Vec<HorseRecord>> {
        let url = absolute_url(&self.base_url, link)?;
        let html = self.fetcher.fetch(&url).await?;
        let card = self.parser.parse(&html);

        if card.containers == 0 && self.render_fallback {
            info!("No outcomes in static markup of {}, fetching rendered page", url);
            sleep(self.pause).await;
            let html = self.fetcher.fetch_rendered(&url).await?;
            return Ok(self.parser.parse(&html).horses);
        }

        Ok(card.horses)
    }

    /// Always renders first, for callers that know the page is client-side
    pub async fn scrape_rendered(&self, link: &str) -> Result<Vec<HorseRecord>> {
        let url = absolute_url(&self.base_url, link)?;
        let html = self.fetcher.fetch_rendered(&url).await?;
        Ok(self.parser.parse(&html).horses)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Schedule page to racetracks with their race cards
pub struct ScheduleAggregator<'a, F> {
    cards: RaceCardScraper<'a, F>,
    jurisdiction: JurisdictionConfig,
    status: RaceStatus,
    pause: Duration,
}

impl<'a, F: PageFetcher> ScheduleAggregator<'a, F> {
    pub fn new(
        cards: RaceCardScraper<'a, F>,
        jurisdiction: JurisdictionConfig,
        status: RaceStatus,
        pause: Duration,
    ) -> Self {
        Self {
            cards,
            jurisdiction,
            status,
            pause,
        }
    }

    /// Fetch and parse the schedule page only. A fetch failure is returned.
    pub async fn tracks(&self, scope: &str) -> Result<Vec<TrackEntry>> {
        let url = schedule_url(self.cards.base_url(), scope);
        info!("Fetching racing schedule from {}", url);

        let html = self.cards.fetcher.fetch(&url).await?;
        let tracks = ScheduleParser::parse(&html, &self.jurisdiction, self.status);

        info!(
            "Found {} racetracks with {} races",
            tracks.len(),
            tracks.iter().map(|t| t.races.len()).sum::<usize>()
        );
        Ok(tracks)
    }

    /// Fetch the schedule, then every linked race page in turn.
    ///
    /// A race whose page cannot be fetched or parsed keeps an empty horse
    /// list; the remaining races are still scraped.
    pub async fn run(&self, scope: &str) -> Result<Vec<TrackEntry>> {
        let tracks = self.tracks(scope).await?;

        let total = tracks
            .iter()
            .flat_map(|t| &t.races)
            .filter(|r| r.link.is_some())
            .count();
        let mut pause = RequestPause::new(self.pause);
        let mut done = 0;
        let mut output = Vec::with_capacity(tracks.len());

        for mut track in tracks {
            let mut races = Vec::with_capacity(track.races.len());

            for race in std::mem::take(&mut track.races) {
                let Some(link) = race.link.clone() else {
                    races.push(race);
                    continue;
                };

                pause.wait().await;
                done += 1;
                info!(
                    "[{}/{}] {} {} ({})",
                    done, total, track.racetrack, race.race_number, race.time
                );

                let horses = match self.cards.scrape(&link).await {
                    Ok(horses) => {
                        info!("  {} horses", horses.len());
                        horses
                    }
                    Err(e) => {
                        warn!(
                            "Failed to scrape {} {}: {:#}",
                            track.racetrack, race.race_number, e
                        );
                        Vec::new()
                    }
                };
                races.push(race.with_horses(horses));
            }

            track.races = races;
            output.push(track);
        }

        Ok(output)
    }
}
