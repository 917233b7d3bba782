//! Race card parser for Sportsbet race pages.
//!
//! Outcome (horse) blocks are located with a cascade of strategies, because
//! the class names are generated per build and the automation markers are
//! sometimes missing from the static markup. Each block is then read field by
//! field; a missing field becomes `None`, only an unreadable identity line
//! drops the block.

use anyhow::{anyhow, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::odds::OddsParser;
use crate::config::MarkerConfig;
use crate::types::{HorseRecord, Odds, Price};

/// `<number>. <name>`
static IDENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\. (.+)$").unwrap());

/// `J: <name>`
static JOCKEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^J:\s*(.+)$").unwrap());

/// A container lookup strategy; an empty result hands over to the next one.
type Strategy = for<'a> fn(&RaceCardParser, &'a Html) -> Vec<ElementRef<'a>>;

/// Result of parsing one race page
#[derive(Debug, Clone, Default)]
pub struct ParsedCard {
    /// Outcome containers located, parsed or not
    pub containers: usize,
    pub horses: Vec<HorseRecord>,
}

/// Fields read from one outcome container, before a rank is assigned
#[derive(Debug, Clone)]
struct HorseFields {
    number: String,
    name: String,
    jockey: Option<String>,
    odds: Odds,
}

impl HorseFields {
    fn into_record(self, rank: u32) -> HorseRecord {
        HorseRecord {
            rank,
            horse_number: self.number,
            horse_name: self.name,
            jockey: self.jockey,
            odds: self.odds,
        }
    }
}

struct Selectors {
    outcome: Selector,
    outcome_generic: Selector,
    outcome_card: Selector,
    name: Selector,
    span: Selector,
    jockey: Selector,
    fluctuations: Selector,
    fixed_prices: Selector,
    price_button: Selector,
    price_text: Selector,
}

impl Selectors {
    fn compile(markers: &MarkerConfig) -> Result<Self> {
        let attr = &markers.attribute;
        Ok(Self {
            outcome: parse_selector(&format!("[{}^=\"{}\"]", attr, markers.outcome_prefix))?,
            outcome_generic: parse_selector(&format!(
                "[{}*=\"{}\"]",
                attr, markers.outcome_substring
            ))?,
            outcome_card: parse_selector(&format!(
                "[class*=\"{}\"]",
                markers.outcome_card_class
            ))?,
            name: parse_selector(&format!("[{}=\"{}\"]", attr, markers.name))?,
            span: parse_selector("span")?,
            jockey: parse_selector(&format!("[{}=\"{}\"]", attr, markers.jockey))?,
            fluctuations: parse_selector(&format!("[{}=\"{}\"]", attr, markers.fluctuations))?,
            fixed_prices: parse_selector(&format!("[{}=\"{}\"]", attr, markers.fixed_prices))?,
            price_button: parse_selector(&format!("[{}*=\"{}\"]", attr, markers.price_button))?,
            price_text: parse_selector(&format!("[{}=\"{}\"]", attr, markers.price_text))?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector `{}`: {:?}", selector, e))
}

fn text_of(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parser for race card pages
pub struct RaceCardParser {
    markers: MarkerConfig,
    selectors: Selectors,
}

impl RaceCardParser {
    /// Build a parser for the given markers, failing on markers that do not
    /// form valid selectors.
    pub fn new(markers: &MarkerConfig) -> Result<Self> {
        Ok(Self {
            markers: markers.clone(),
            selectors: Selectors::compile(markers)?,
        })
    }

    /// Parse horses from race page HTML
    pub fn parse(&self, html: &str) -> ParsedCard {
        let document = Html::parse_document(html);
        self.parse_document(&document)
    }

    pub fn parse_document(&self, document: &Html) -> ParsedCard {
        let containers = self.locate_containers(document);
        let mut horses: Vec<HorseRecord> = Vec::with_capacity(containers.len());

        for (index, container) in containers.iter().enumerate() {
            match self.extract_fields(*container) {
                Some(fields) => {
                    // Skipped containers do not consume a rank
                    let rank = horses.len() as u32 + 1;
                    horses.push(fields.into_record(rank));
                }
                None => warn!(
                    "Skipping outcome container {}: no `<number>. <name>` line found",
                    index + 1
                ),
            }
        }

        ParsedCard {
            containers: containers.len(),
            horses,
        }
    }

    /// Locate outcome containers, trying each strategy in turn.
    pub fn locate_containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let strategies: [(&str, Strategy); 3] = [
            ("outcome marker", Self::by_outcome_marker),
            ("generic outcome parent", Self::by_generic_outcome_parent),
            ("outcome card class", Self::by_outcome_card_class),
        ];

        for (label, strategy) in strategies {
            let found = strategy(self, document);
            if !found.is_empty() {
                debug!("Located {} outcome containers by {}", found.len(), label);
                return found;
            }
        }

        debug!("No outcome containers located");
        Vec::new()
    }

    /// Innermost prefixed outcome markers that wrap a name element.
    ///
    /// A list wrapper carrying the same prefix encloses other candidates and
    /// is left out.
    fn by_outcome_marker<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let candidates: Vec<ElementRef<'a>> = document
            .select(&self.selectors.outcome)
            .filter(|el| el.select(&self.selectors.name).next().is_some())
            .collect();
        let ids: HashSet<_> = candidates.iter().map(|el| el.id()).collect();

        candidates
            .into_iter()
            .filter(|el| !el.descendants().skip(1).any(|node| ids.contains(&node.id())))
            .collect()
    }

    /// Parents of anything whose marker mentions an outcome
    fn by_generic_outcome_parent<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let mut seen = HashSet::new();
        document
            .select(&self.selectors.outcome_generic)
            .filter_map(|el| el.parent())
            .filter(|parent| seen.insert(parent.id()))
            .filter_map(ElementRef::wrap)
            .collect()
    }

    fn by_outcome_card_class<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selectors.outcome_card).collect()
    }

    fn extract_fields(&self, container: ElementRef) -> Option<HorseFields> {
        let identity = self.identity_text(container)?;
        let (number, name) = Self::parse_identity(&identity)?;

        let fluctuations = self.fluctuation_texts(container);
        let fixed = self.fixed_prices(container);
        let fixed_at = |i: usize| fixed.get(i).cloned().flatten();

        Some(HorseFields {
            number,
            name,
            jockey: self.jockey(container),
            odds: Odds {
                open: OddsParser::price_at(&fluctuations, 0),
                fluc1: OddsParser::price_at(&fluctuations, 1),
                fluc2: OddsParser::price_at(&fluctuations, 2),
                win_fixed: fixed_at(0),
                place_fixed: fixed_at(1),
                each_way_fixed: fixed_at(2),
            },
        })
    }

    /// Text of the first span under the name marker, else the marker's own
    /// text. Containers without the marker fall back to their first text node.
    fn identity_text(&self, container: ElementRef) -> Option<String> {
        if let Some(name) = container.select(&self.selectors.name).next() {
            return name
                .select(&self.selectors.span)
                .map(text_of)
                .find(|t| !t.is_empty())
                .or_else(|| Some(text_of(name)).filter(|t| !t.is_empty()));
        }

        container
            .text()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(str::to_string)
    }

    fn parse_identity(text: &str) -> Option<(String, String)> {
        let caps = IDENTITY_RE.captures(text.trim())?;
        let name = caps[2].trim();
        if name.is_empty() {
            return None;
        }
        Some((caps[1].to_string(), name.to_string()))
    }

    fn jockey(&self, container: ElementRef) -> Option<String> {
        let text = text_of(container.select(&self.selectors.jockey).next()?);
        let caps = JOCKEY_RE.captures(&text)?;
        Some(caps[1].trim().to_string()).filter(|name| !name.is_empty())
    }

    /// Texts of the fluctuation block's direct children, in document order
    fn fluctuation_texts(&self, container: ElementRef) -> Vec<String> {
        let Some(block) = container.select(&self.selectors.fluctuations).next() else {
            return Vec::new();
        };

        block
            .children()
            .filter_map(ElementRef::wrap)
            .map(text_of)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Win, place and each-way prices, one entry per price row
    fn fixed_prices(&self, container: ElementRef) -> Vec<Option<Price>> {
        let Some(block) = container.select(&self.selectors.fixed_prices).next() else {
            return Vec::new();
        };

        block
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|row| {
                row.value()
                    .attr(&self.markers.attribute)
                    .is_some_and(|id| id.contains(&self.markers.price_row))
            })
            .map(|row| {
                let button = row.select(&self.selectors.price_button).next()?;
                let text = button
                    .select(&self.selectors.price_text)
                    .next()
                    .map(text_of)
                    .unwrap_or_else(|| text_of(button));
                OddsParser::parse_price(&text)
            })
            .collect()
    }
}
