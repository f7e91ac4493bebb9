use std::env;
use std::time::Duration;

use chrono::TimeDelta;
use chrono_tz::Tz;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.openligadb.de";
pub const DEFAULT_COMPETITION: &str = "bl1";
pub const DEFAULT_SOON_MINUTES: i64 = 180;
pub const DEFAULT_REFRESH_SECS: u64 = 30;
pub const MIN_REFRESH_SECS: u64 = 5;
pub const MAX_REFRESH_SECS: u64 = 86_400;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Berlin;

/// Values the feed processor needs to classify and format matches.
#[derive(Clone, Copy, Debug)]
pub struct FeedSettings {
    /// Matches kicking off within this window count as "starting soon".
    pub soon_threshold: TimeDelta,
    /// Competition home timezone; kickoff times are shown in it for every viewer.
    pub home_tz: Tz,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            soon_threshold: TimeDelta::minutes(DEFAULT_SOON_MINUTES),
            home_tz: DEFAULT_TIMEZONE,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TickerConfig {
    pub base_url: String,
    pub competition: String,
    /// When set, the current matchday of this season is resolved before fetching.
    pub season: Option<u16>,
    pub feed: FeedSettings,
    pub refresh_interval: Duration,
    pub http_timeout: Duration,
    pub discord_hook_url: Option<String>,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            competition: DEFAULT_COMPETITION.to_string(),
            season: None,
            feed: FeedSettings::default(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            discord_hook_url: None,
        }
    }
}

impl TickerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
        };
        let defaults = Self::default();

        let base_url = get("OPENLIGA_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let competition = get("TICKER_COMPETITION").unwrap_or(defaults.competition);
        let season = parse_number::<u16>("TICKER_SEASON", get("TICKER_SEASON"))?;

        let soon_threshold = match get("TICKER_SOON_MINUTES") {
            Some(value) => value
                .parse::<i64>()
                .ok()
                .and_then(|minutes| TimeDelta::try_minutes(minutes.max(0)))
                .ok_or(ConfigError::InvalidNumber { key: "TICKER_SOON_MINUTES", value })?,
            None => TimeDelta::minutes(DEFAULT_SOON_MINUTES),
        };
        let refresh_secs = parse_number::<u64>("TICKER_REFRESH_SECS", get("TICKER_REFRESH_SECS"))?
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
        let timeout_secs =
            parse_number::<u64>("TICKER_HTTP_TIMEOUT_SECS", get("TICKER_HTTP_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
                .clamp(1, MAX_HTTP_TIMEOUT_SECS);

        let home_tz = match get("TICKER_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone(name))?,
            None => DEFAULT_TIMEZONE,
        };

        Ok(Self {
            base_url,
            competition,
            season,
            feed: FeedSettings {
                soon_threshold,
                home_tz,
            },
            refresh_interval: Duration::from_secs(refresh_secs),
            http_timeout: Duration::from_secs(timeout_secs),
            discord_hook_url: get("DISCORD_HOOK_URL"),
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|val| {
            val.parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { key, value: val })
        })
        .transpose()
}
