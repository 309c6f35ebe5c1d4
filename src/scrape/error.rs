//! Error types for the scrape pipeline.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors surfaced by [`RetryingScraper`](super::RetryingScraper).
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The URL was empty or blank; nothing was fetched.
    #[error("'website_url' must be a non-empty string.")]
    EmptyUrl,

    /// Every attempt failed. Carries the last underlying cause.
    #[error("Failed to scrape website after {attempts} attempts: {source}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The failure of the final attempt.
        #[source]
        source: FetchError,
    },
}

impl ScrapeError {
    /// Creates an exhausted-retries error.
    pub fn exhausted(attempts: u32, source: FetchError) -> Self {
        Self::Exhausted { attempts, source }
    }

    /// Returns the number of attempts made before giving up.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::EmptyUrl => 0,
            Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}
