//! Racing schedule parser for Sportsbet.
//!
//! Parses `/racing-schedule/<scope>` pages into racetracks and their races.
//! Each table row is a racetrack; its first cell holds the track link and
//! country, every following cell is one race.

use clap::ValueEnum;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::config::JurisdictionConfig;
use crate::types::{RaceEntry, RaceTime, TrackEntry};

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static ANY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());
static TRACK_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TRACK_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a > div > div > div").unwrap());
static COUNTRY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a > div > div > div > span").unwrap());
static RACE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href*='/race-']").unwrap());

/// Finishing order such as `4,5,3`
static RESULT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(?:,\d+)+$").unwrap());

/// `H:MM` / `HH:MM` not glued to further digits or colons
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\d:])(\d{1,2}:\d{2})(?:[^\d:]|$)").unwrap());

/// Which races of the schedule are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RaceStatus {
    /// Races with a finishing order
    Completed,
    /// Races not yet run
    Upcoming,
    All,
}

impl RaceStatus {
    fn keeps(self, race: &RaceEntry) -> bool {
        match self {
            RaceStatus::Completed => race.is_completed(),
            RaceStatus::Upcoming => !race.is_completed(),
            RaceStatus::All => true,
        }
    }
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parser for racing schedule pages
pub struct ScheduleParser;

impl ScheduleParser {
    /// Parse schedule HTML into racetracks, keeping the tracks allowed by
    /// `jurisdiction` and the races matching `status`.
    ///
    /// Tracks left without races are dropped.
    pub fn parse(html: &str, jurisdiction: &JurisdictionConfig, status: RaceStatus) -> Vec<TrackEntry> {
        let document = Html::parse_document(html);
        let mut tracks = Vec::new();

        for row in document.select(&ROW) {
            let cells: Vec<ElementRef> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| cell.value().name() == "td")
                .collect();

            let Some((track_cell, race_cells)) = cells.split_first() else {
                continue;
            };
            let Some(track) = Self::parse_track_cell(*track_cell) else {
                continue;
            };

            if let Some(required) = &jurisdiction.country {
                if !track.country.eq_ignore_ascii_case(required) {
                    continue;
                }
            }

            let races: Vec<RaceEntry> = race_cells
                .iter()
                .enumerate()
                .filter_map(|(index, cell)| Self::parse_race_cell(*cell, index))
                .collect();

            let denied = std::iter::once(track.track_link_url.as_deref())
                .chain(races.iter().map(|r| r.link.as_deref()))
                .flatten()
                .any(|href| Self::is_excluded(href, &jurisdiction.excluded_slugs));
            if denied {
                continue;
            }

            let races: Vec<RaceEntry> = races.into_iter().filter(|r| status.keeps(r)).collect();
            if races.is_empty() {
                continue;
            }

            tracks.push(TrackEntry { races, ..track });
        }

        tracks
    }

    fn parse_track_cell(cell: ElementRef) -> Option<TrackEntry> {
        let link = cell.select(&TRACK_LINK).next()?;

        let country = cell.select(&COUNTRY).next().map(text_of).unwrap_or_default();

        // The label div holds the country span plus the bare track name text
        let racetrack = cell
            .select(&TRACK_LABEL)
            .next()
            .and_then(|label| {
                label
                    .children()
                    .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
                    .filter(|t| !t.is_empty())
                    .last()
            })
            .or_else(|| link.value().attr("title").map(|t| t.trim().to_string()))
            .unwrap_or_else(|| text_of(link));

        if racetrack.is_empty() {
            return None;
        }

        Some(TrackEntry {
            racetrack,
            country,
            track_link_url: link.value().attr("href").map(str::to_string),
            races: Vec::new(),
        })
    }

    fn parse_race_cell(cell: ElementRef, index: usize) -> Option<RaceEntry> {
        let link = cell.select(&RACE_LINK).next();

        let result = cell
            .select(&ANY)
            .map(text_of)
            .find(|t| RESULT_RE.is_match(t))
            .or_else(|| Some(text_of(cell)).filter(|t| RESULT_RE.is_match(t)))
            .unwrap_or_default();

        if link.is_none() && result.is_empty() {
            return None;
        }

        Some(RaceEntry {
            race_number: format!("R{}", index + 1),
            time: link.map_or(RaceTime::Unavailable, Self::race_time),
            result,
            link: link.and_then(|a| a.value().attr("href")).map(str::to_string),
            horses: Vec::new(),
            horse_count: 0,
        })
    }

    /// First bare clock time among the link's text nodes
    pub fn race_time(link: ElementRef) -> RaceTime {
        link.text()
            .find_map(|text| TIME_RE.captures(text.trim()).map(|caps| caps[1].to_string()))
            .map_or(RaceTime::Tbd, RaceTime::At)
    }

    /// Whether any path segment of `href` is a denied track slug
    pub fn is_excluded(href: &str, excluded_slugs: &[String]) -> bool {
        let path = href.split(['?', '#']).next().unwrap_or_default();
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .any(|segment| excluded_slugs.iter().any(|slug| slug.eq_ignore_ascii_case(segment)))
    }
}
