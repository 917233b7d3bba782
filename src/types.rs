//! Record and report types emitted by the scraper.
//!
//! Missing data is kept as `None` internally. The site's sentinels
//! (`"0.00"` for prices, `"N/A"` for the jockey) are only written when a
//! record is serialized.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Serialized in place of a price that was not found on the page.
pub const PRICE_SENTINEL: &str = "0.00";

/// Serialized in place of a jockey that was not found on the page.
pub const JOCKEY_SENTINEL: &str = "N/A";

/// Source label carried by every report envelope.
pub const SOURCE: &str = "Sportsbet Australia";

/// A decimal price as printed on the page, normalized to `<digits>.<1-2 digits>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price(String);

impl Price {
    /// Build from whole and fractional digit groups.
    ///
    /// Returns `None` unless `whole` is non-empty digits and `fraction` is one
    /// or two digits.
    pub fn from_parts(whole: &str, fraction: &str) -> Option<Self> {
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(whole) || !digits(fraction) || fraction.len() > 2 {
            return None;
        }
        Some(Self(format!("{}.{}", whole, fraction)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn price_or_sentinel<S: Serializer>(price: &Option<Price>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(price.as_ref().map_or(PRICE_SENTINEL, Price::as_str))
}

fn jockey_or_sentinel<S: Serializer>(jockey: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(jockey.as_deref().unwrap_or(JOCKEY_SENTINEL))
}

/// Fluctuating and fixed prices for one horse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Odds {
    #[serde(serialize_with = "price_or_sentinel")]
    pub open: Option<Price>,
    #[serde(serialize_with = "price_or_sentinel")]
    pub fluc1: Option<Price>,
    #[serde(serialize_with = "price_or_sentinel")]
    pub fluc2: Option<Price>,
    #[serde(serialize_with = "price_or_sentinel")]
    pub win_fixed: Option<Price>,
    #[serde(serialize_with = "price_or_sentinel")]
    pub place_fixed: Option<Price>,
    #[serde(serialize_with = "price_or_sentinel")]
    pub each_way_fixed: Option<Price>,
}

/// One horse on a race card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorseRecord {
    /// 1-based position in the order the outcome blocks were found
    pub rank: u32,
    pub horse_number: String,
    pub horse_name: String,
    #[serde(serialize_with = "jockey_or_sentinel")]
    pub jockey: Option<String>,
    pub odds: Odds,
}

/// Scheduled start of a race as read from the schedule page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceTime {
    /// Clock time such as `11:05`
    At(String),
    /// The link carried no time yet
    Tbd,
    /// No link to read a time from
    Unavailable,
}

impl fmt::Display for RaceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceTime::At(time) => f.pad(time),
            RaceTime::Tbd => f.pad("TBD"),
            RaceTime::Unavailable => f.pad("N/A"),
        }
    }
}

impl Serialize for RaceTime {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// One race column of a schedule row, with its horses once scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceEntry {
    pub race_number: String,
    pub time: RaceTime,
    /// Finishing order such as `4,5,3`; empty for races not yet run
    pub result: String,
    pub link: Option<String>,
    pub horses: Vec<HorseRecord>,
    pub horse_count: usize,
}

impl RaceEntry {
    pub fn is_completed(&self) -> bool {
        !self.result.is_empty()
    }

    /// Attach scraped horses, keeping `horse_count` in step.
    pub fn with_horses(mut self, horses: Vec<HorseRecord>) -> Self {
        self.horse_count = horses.len();
        self.horses = horses;
        self
    }
}

/// A racetrack row of the schedule page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackEntry {
    pub racetrack: String,
    pub country: String,
    #[serde(rename = "tracklinkUrl")]
    pub track_link_url: Option<String>,
    #[serde(rename = "completedRaces")]
    pub races: Vec<RaceEntry>,
}

/// Envelope for a schedule scrape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub schedule_date: String,
    pub total_races: usize,
    pub racetracks: Vec<TrackEntry>,
}

impl ScheduleReport {
    pub fn new(schedule_date: &str, racetracks: Vec<TrackEntry>) -> Self {
        Self {
            status: "success".to_string(),
            timestamp: Utc::now(),
            source: SOURCE.to_string(),
            schedule_date: schedule_date.to_string(),
            total_races: racetracks.iter().map(|t| t.races.len()).sum(),
            racetracks,
        }
    }
}

/// Envelope for a single race card scrape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceCardReport {
    pub race_url: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub total_horses: usize,
    pub horses: Vec<HorseRecord>,
}

impl RaceCardReport {
    pub fn new(race_url: &str, horses: Vec<HorseRecord>) -> Self {
        Self {
            race_url: race_url.to_string(),
            timestamp: Utc::now(),
            source: SOURCE.to_string(),
            total_horses: horses.len(),
            horses,
        }
    }
}
