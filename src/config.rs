//! Endpoints and fixed parameters shared by the scrapers.
//!
//! A [`ScrapeConfig`] is built once in `main` (defaults, optionally overlaid
//! by a YAML file and CLI flags) and passed by reference into every
//! collector, so tests can point the scrapers at fixture URLs.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const INJURY_REPORT_BASE_URL: &str = "https://www.nfl.com/injuries/league";
pub const SITE_BASE_URL: &str = "https://www.pro-football-reference.com";
pub const PLAYERS_BASE_URL: &str = "https://www.pro-football-reference.com/players";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/93.0.4577.63 Safari/537.36";

/// Earliest season with an injury report.
pub const MIN_INJURY_YEAR: i32 = 1965;

/// Default season range for a full injury scrape (inclusive).
pub const DEFAULT_FIRST_YEAR: i32 = 2000;
pub const DEFAULT_LAST_YEAR: i32 = 2021;

/// Default career-start threshold for player discovery.
pub const DEFAULT_START_YEAR: i32 = 2016;

/// Immutable scraper configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Injury pages live at `{injury_base_url}/{year}/{period}`.
    pub injury_base_url: String,
    /// Prefix for the relative player links found on index pages.
    pub site_base_url: String,
    /// Index pages live at `{players_base_url}/{letter}/`.
    pub players_base_url: String,
    pub user_agent: String,
    pub min_year: i32,
    /// Pause after a connection reset before moving on to the next player.
    #[serde(with = "millis")]
    pub reset_delay: Duration,
    /// Pause before every request. Zero disables throttling.
    #[serde(with = "millis")]
    pub request_delay: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            injury_base_url: INJURY_REPORT_BASE_URL.to_string(),
            site_base_url: SITE_BASE_URL.to_string(),
            players_base_url: PLAYERS_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            min_year: MIN_INJURY_YEAR,
            reset_delay: Duration::from_secs(5),
            request_delay: Duration::ZERO,
        }
    }
}

impl ScrapeConfig {
    /// Load a YAML config file. Keys left out keep their default values.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ScrapeConfig = serde_yaml::from_str(&raw)?;
        info!(?config, "Loaded scrape configuration");
        Ok(config)
    }
}

/// Durations are written as whole milliseconds in config files.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
