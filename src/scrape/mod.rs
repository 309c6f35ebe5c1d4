//! Fetch-then-extract with bounded retry.
//!
//! [`RetryingScraper`] runs the configured [`PageFetcher`] and feeds the
//! markup to [`extract`]. A failed fetch is retried immediately, with no
//! backoff, until the attempt budget is spent; the final failure is wrapped
//! once in [`ScrapeError::Exhausted`]. No partial result is ever returned.
//!
//! # Example
//!
//! ```no_run
//! use page_scraper::fetch::{FetcherConfig, build_fetcher};
//! use page_scraper::scrape::RetryingScraper;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scraper = RetryingScraper::new(build_fetcher(&FetcherConfig::default())?);
//! let result = scraper.scrape("https://example.com").await?;
//! println!("{}: {} links", result.title, result.links.len());
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::ScrapeError;

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::extract::{ExtractionResult, extract};
use crate::fetch::{FetchError, PageFetcher};

/// Default number of attempts per scrape.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Composes a [`PageFetcher`] with [`extract`] under a retry budget.
#[derive(Clone)]
pub struct RetryingScraper {
    fetcher: Arc<dyn PageFetcher>,
    max_retries: u32,
}

impl std::fmt::Debug for RetryingScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingScraper")
            .field("fetcher", &self.fetcher.name())
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl RetryingScraper {
    /// Creates a scraper with [`DEFAULT_MAX_RETRIES`] attempts.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::with_max_retries(fetcher, DEFAULT_MAX_RETRIES)
    }

    /// Creates a scraper with an explicit attempt budget.
    ///
    /// A budget of zero still makes one attempt.
    #[must_use]
    pub fn with_max_retries(fetcher: Arc<dyn PageFetcher>, max_retries: u32) -> Self {
        Self {
            fetcher,
            max_retries: max_retries.max(1),
        }
    }

    /// Returns the attempt budget.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Scrapes `url` with the configured attempt budget.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::EmptyUrl`] for a blank URL, or
    /// [`ScrapeError::Exhausted`] once every attempt has failed.
    pub async fn scrape(&self, url: &str) -> Result<ExtractionResult, ScrapeError> {
        self.scrape_with_retries(url, self.max_retries).await
    }

    /// Scrapes `url`, making at most `max_retries` attempts.
    ///
    /// # Errors
    ///
    /// Same as [`scrape`](Self::scrape).
    #[instrument(skip(self), fields(fetcher = self.fetcher.name()))]
    pub async fn scrape_with_retries(
        &self,
        url: &str,
        max_retries: u32,
    ) -> Result<ExtractionResult, ScrapeError> {
        if url.trim().is_empty() {
            return Err(ScrapeError::EmptyUrl);
        }

        let max_retries = max_retries.max(1);
        info!("scraping website");

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            debug!(attempt, "attempting scrape");

            match self.attempt(url).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt >= max_retries => {
                    error!(attempts = attempt, error = %e, "failed to scrape website");
                    return Err(ScrapeError::exhausted(attempt, e));
                }
                Err(e) => {
                    warn!(attempt, max_retries, error = %e, "scrape attempt failed, retrying");
                }
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<ExtractionResult, FetchError> {
        let html = self.fetcher.fetch(url).await?;
        Ok(extract(&html, url))
    }
}
