//! Request orchestration: rate limiter, then cache, then scraper.
//!
//! [`ScrapeService`] owns the three shared components and is what the HTTP
//! layer calls. Nothing here is global; tests build isolated instances with
//! [`ScrapeService::new`].

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::cache::ResultCache;
use crate::config::ScraperConfig;
use crate::extract::ExtractionResult;
use crate::fetch::{FetchError, build_fetcher};
use crate::rate_limiter::RateLimiter;
use crate::scrape::{RetryingScraper, ScrapeError};

/// Result of a served scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOutcome {
    /// The extraction result.
    pub result: ExtractionResult,
    /// Whether it came from the cache.
    pub cached: bool,
}

/// The fetch-extract-cache pipeline behind a per-client rate limiter.
///
/// Concurrent requests for the same uncached URL each scrape it; the last
/// one to finish wins the cache slot.
#[derive(Debug, Clone)]
pub struct ScrapeService {
    rate_limiter: Arc<RateLimiter>,
    cache: Arc<ResultCache>,
    scraper: RetryingScraper,
}

impl ScrapeService {
    /// Wires already-built components together.
    #[must_use]
    pub fn new(
        rate_limiter: Arc<RateLimiter>,
        cache: Arc<ResultCache>,
        scraper: RetryingScraper,
    ) -> Self {
        Self {
            rate_limiter,
            cache,
            scraper,
        }
    }

    /// Builds every component from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the configured fetch strategy cannot be built.
    pub fn from_config(config: &ScraperConfig) -> Result<Self, FetchError> {
        let fetcher = build_fetcher(&config.fetcher)?;
        let cache = match config.cache_max_entries {
            Some(max) => ResultCache::with_max_entries(config.cache_ttl, max),
            None => ResultCache::new(config.cache_ttl),
        };
        Ok(Self::new(
            Arc::new(RateLimiter::new(config.rate_limit, config.rate_window)),
            Arc::new(cache),
            RetryingScraper::with_max_retries(fetcher, config.max_retries),
        ))
    }

    /// Returns the shared rate limiter.
    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Returns the shared result cache.
    #[must_use]
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Records a request from `client_id` and reports whether it may proceed.
    pub fn admit(&self, client_id: &str) -> bool {
        self.rate_limiter.admit(client_id)
    }

    /// Serves `url` from the cache, or scrapes and caches it.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] when the URL is blank or every attempt fails.
    /// Failures are never cached.
    #[instrument(skip(self))]
    pub async fn scrape(&self, url: &str) -> Result<ScrapeOutcome, ScrapeError> {
        if url.trim().is_empty() {
            return Err(ScrapeError::EmptyUrl);
        }

        if let Some(result) = self.cache.lookup(url) {
            info!("returning cached data");
            return Ok(ScrapeOutcome {
                result,
                cached: true,
            });
        }

        let result = self.scraper.scrape(url).await?;
        self.cache.store(url, result.clone());
        info!("scraping successful");
        Ok(ScrapeOutcome {
            result,
            cached: false,
        })
    }

    /// Starts a task that periodically purges stale cache entries and idle
    /// rate-limit windows. Abort the handle to stop it.
    #[must_use]
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        let rate_limiter = Arc::clone(&self.rate_limiter);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = cache.purge_expired();
                let swept = rate_limiter.sweep_idle();
                debug!(purged, swept, "sweep complete");
            }
        })
    }
}
