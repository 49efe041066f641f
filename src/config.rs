//! Process configuration.
//!
//! Read once at startup from `STATUS_TRACKER_*` environment variables; any
//! variable left unset takes the default below.  There is no config file and
//! no command-line parsing.

use std::time::Duration;

use thiserror::Error;

use crate::source::FeedSource;

pub const DEFAULT_FEEDS: &[&str] = &[
    "https://status.openai.com/feed.atom",
    "https://www.githubstatus.com/history.atom",
];
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_TRACKED_IDS: usize = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const FEEDS_VAR: &str = "STATUS_TRACKER_FEEDS";
const POLL_INTERVAL_VAR: &str = "STATUS_TRACKER_POLL_INTERVAL_SECS";
const MAX_TRACKED_IDS_VAR: &str = "STATUS_TRACKER_MAX_TRACKED_IDS";
const REQUEST_TIMEOUT_VAR: &str = "STATUS_TRACKER_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    NotPositive { var: &'static str, value: String },

    #[error("STATUS_TRACKER_FEEDS lists no feed URLs")]
    NoFeeds,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Feed URLs, in configured order.
    pub feeds: Vec<String>,
    pub poll_interval: Duration,
    /// Capacity of each feed's dedup ledger.
    pub max_tracked_ids: usize,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_tracked_ids: DEFAULT_MAX_TRACKED_IDS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(FEEDS_VAR) {
            config.feeds = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if config.feeds.is_empty() {
                return Err(ConfigError::NoFeeds);
            }
        }
        if let Some(raw) = lookup(POLL_INTERVAL_VAR) {
            config.poll_interval = Duration::from_secs(positive(POLL_INTERVAL_VAR, &raw)?);
        }
        if let Some(raw) = lookup(MAX_TRACKED_IDS_VAR) {
            config.max_tracked_ids = positive(MAX_TRACKED_IDS_VAR, &raw)? as usize;
        }
        if let Some(raw) = lookup(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = Duration::from_secs(positive(REQUEST_TIMEOUT_VAR, &raw)?);
        }

        Ok(config)
    }

    /// One [`FeedSource`] per configured URL, in order.
    pub fn sources(&self) -> Vec<FeedSource> {
        self.feeds
            .iter()
            .map(|url| FeedSource::new(url.clone(), self.poll_interval))
            .collect()
    }
}

fn positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::NotPositive {
            var,
            value: raw.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
