//! Runtime settings for the scrape pipeline.
//!
//! [`ScraperConfig`] carries every tunable the pipeline honors. Defaults
//! match the documented service behavior; the binary fills it from CLI flags
//! and environment variables.

use std::time::Duration;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::fetch::FetcherConfig;
use crate::rate_limiter::{DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW};
use crate::scrape::DEFAULT_MAX_RETRIES;

/// Pipeline settings.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Fetch strategy and its timeout.
    pub fetcher: FetcherConfig,
    /// How long a scraped result stays fresh.
    pub cache_ttl: Duration,
    /// Optional cap on cached URLs; `None` keeps every URL until restart.
    pub cache_max_entries: Option<usize>,
    /// Admissions per client per window; zero disables rate limiting.
    pub rate_limit: usize,
    /// Trailing rate-limit window.
    pub rate_window: Duration,
    /// Attempts per scrape.
    pub max_retries: u32,
    /// Period of the background sweep of stale cache entries and idle
    /// clients; `None` disables it.
    pub sweep_interval: Option<Duration>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_max_entries: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: DEFAULT_RATE_WINDOW,
            max_retries: DEFAULT_MAX_RETRIES,
            sweep_interval: None,
        }
    }
}
