//! Configuration for the race card scraper.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fetching and pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pause between successive race page fetches
    #[serde(default = "default_race_pause_ms")]
    pub race_pause_ms: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Re-fetch through headless Chrome when the static markup has no outcomes
    #[serde(default)]
    pub browser_fallback: bool,
    #[serde(default = "default_browser_settle_ms")]
    pub browser_settle_ms: u64,
    #[serde(default)]
    pub chrome_path: Option<String>,
}

fn default_base_url() -> String {
    "https://www.sportsbet.com.au".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_race_pause_ms() -> u64 {
    500
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_browser_settle_ms() -> u64 {
    1500
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            race_pause_ms: default_race_pause_ms(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            browser_fallback: false,
            browser_settle_ms: default_browser_settle_ms(),
            chrome_path: None,
        }
    }
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn race_pause(&self) -> Duration {
        Duration::from_millis(self.race_pause_ms)
    }

    pub fn browser_settle(&self) -> Duration {
        Duration::from_millis(self.browser_settle_ms)
    }
}

/// Which racetracks of the schedule page are kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionConfig {
    /// Country label a track row must carry; `None` keeps every country
    #[serde(default = "default_country")]
    pub country: Option<String>,
    /// Track slugs dropped when they appear as a path segment of a track or race link
    #[serde(default = "default_excluded_slugs")]
    pub excluded_slugs: Vec<String>,
}

fn default_country() -> Option<String> {
    Some("Australia".to_string())
}

fn default_excluded_slugs() -> Vec<String> {
    [
        "sha-tin",
        "happy-valley",
        "kranji",
        "meydan",
        "tokyo",
        "kyoto",
        "hanshin",
        "nakayama",
        "longchamp",
        "chantilly",
        "deauville",
        "newmarket",
        "santa-anita",
        "gulfstream-park",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for JurisdictionConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            excluded_slugs: default_excluded_slugs(),
        }
    }
}

impl JurisdictionConfig {
    /// No country restriction and no denylist
    pub fn everywhere() -> Self {
        Self {
            country: None,
            excluded_slugs: Vec::new(),
        }
    }
}

/// Markup markers the race card parser looks for.
///
/// The site renames these from time to time, so every one can be overridden
/// from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Attribute carrying the automation markers
    pub attribute: String,
    /// Prefix shared by every outcome container id
    pub outcome_prefix: String,
    /// Looser substring used when no prefixed container has a name
    pub outcome_substring: String,
    /// Class fragment of outcome cards when automation ids are missing
    pub outcome_card_class: String,
    pub name: String,
    pub jockey: String,
    pub fluctuations: String,
    pub fixed_prices: String,
    pub price_row: String,
    pub price_button: String,
    pub price_text: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            attribute: "data-automation-id".to_string(),
            outcome_prefix: "racecard-outcome-".to_string(),
            outcome_substring: "outcome".to_string(),
            outcome_card_class: "outcomeCard_".to_string(),
            name: "racecard-outcome-name".to_string(),
            jockey: "racecard-outcome-jockey-info".to_string(),
            fluctuations: "racecard-outcome-fluctuations".to_string(),
            fixed_prices: "racecard-outcome-fixed-prices".to_string(),
            price_row: "price-row".to_string(),
            price_button: "price-button".to_string(),
            price_text: "price-text".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub jurisdiction: JurisdictionConfig,
    #[serde(default)]
    pub markers: MarkerConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file and the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            // RACECARD_SCRAPER__RACE_PAUSE_MS=800, RACECARD_JURISDICTION__EXCLUDED_SLUGS=a,b
            .add_source(
                config::Environment::with_prefix("RACECARD")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("jurisdiction.excluded_slugs")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.scraper.race_pause(), Duration::from_millis(500));
        assert_eq!(config.scraper.retry_attempts, 3);
        assert!(!config.scraper.browser_fallback);
        assert_eq!(config.jurisdiction.country.as_deref(), Some("Australia"));
        assert!(config.jurisdiction.excluded_slugs.iter().any(|s| s == "sha-tin"));
        assert_eq!(config.markers.name, "racecard-outcome-name");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "scraper": { "race_pause_ms": 900 }, "markers": { "jockey": "jockey-line" } }"#,
        )
        .unwrap();

        assert_eq!(config.scraper.race_pause_ms, 900);
        assert_eq!(config.scraper.base_url, "https://www.sportsbet.com.au");
        assert_eq!(config.markers.jockey, "jockey-line");
        assert_eq!(config.markers.outcome_prefix, "racecard-outcome-");
        assert_eq!(config.jurisdiction.country.as_deref(), Some("Australia"));
    }

    #[test]
    fn test_load_reads_environment() {
        std::env::set_var("RACECARD_SCRAPER__RACE_PAUSE_MS", "900");
        std::env::set_var("RACECARD_JURISDICTION__EXCLUDED_SLUGS", "a,b");
        let loaded = AppConfig::load();
        std::env::remove_var("RACECARD_SCRAPER__RACE_PAUSE_MS");
        std::env::remove_var("RACECARD_JURISDICTION__EXCLUDED_SLUGS");

        let config = loaded.unwrap();
        assert_eq!(config.scraper.race_pause_ms, 900);
        assert_eq!(config.jurisdiction.excluded_slugs, vec!["a", "b"]);
        assert_eq!(config.scraper.retry_attempts, 3);
        assert_eq!(config.jurisdiction.country.as_deref(), Some("Australia"));
    }

    #[test]
    fn test_everywhere_has_no_filter() {
        let jurisdiction = JurisdictionConfig::everywhere();
        assert!(jurisdiction.country.is_none());
        assert!(jurisdiction.excluded_slugs.is_empty());
    }
}
