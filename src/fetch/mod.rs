//! Page retrieval strategies.
//!
//! A [`PageFetcher`] turns a URL into the raw HTML of that page. Two
//! strategies implement it:
//!
//! - [`HttpFetcher`] - a single GET through a pooled `reqwest` client
//! - `BrowserFetcher` - a headless Chromium page load, for pages that only
//!   render their content with JavaScript (requires the `headless` feature)
//!
//! The strategy is chosen by configuration through [`build_fetcher`].
//!
//! # Example
//!
//! ```no_run
//! use page_scraper::fetch::{FetcherConfig, build_fetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = build_fetcher(&FetcherConfig::default())?;
//! let html = fetcher.fetch("https://example.com").await?;
//! println!("{} bytes of markup", html.len());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "headless")]
mod browser;
pub mod constants;
mod error;
mod http;

#[cfg(feature = "headless")]
pub use browser::BrowserFetcher;
pub use error::FetchError;
pub use http::HttpFetcher;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use constants::FETCH_TIMEOUT_SECS;

/// Retrieves the raw HTML for a URL.
///
/// This trait uses `async_trait` to support dynamic dispatch via `Arc<dyn PageFetcher>`.
/// Rust 2024 native async traits are not object-safe, so `async_trait` is required
/// until that changes.
///
/// Implementations hold no per-request mutable state and must be safe to call
/// from many tasks at once.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short strategy name used in logs.
    fn name(&self) -> &str;

    /// Fetches the page at `url` and returns its markup.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, timeout, non-success status,
    /// or browser launch/navigation failure.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Which [`PageFetcher`] implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// Plain HTTP GET.
    #[default]
    Http,
    /// Headless browser page load.
    Browser,
}

impl FetchStrategy {
    /// Returns the configuration name of this strategy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Browser => "browser",
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "browser" | "headless" => Ok(Self::Browser),
            other => Err(format!(
                "unknown fetcher '{other}' (expected 'http' or 'browser')"
            )),
        }
    }
}

/// Settings shared by both fetch strategies.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Strategy to build.
    pub strategy: FetchStrategy,
    /// Upper bound for one fetch (request or navigation).
    pub timeout: Duration,
    /// Pinned browser executable tried when the auto-detected one fails to launch.
    pub chrome_path: Option<PathBuf>,
    /// Disables the Chromium sandbox (needed in some containers).
    pub no_sandbox: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::Http,
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            chrome_path: None,
            no_sandbox: false,
        }
    }
}

/// Builds the configured fetch strategy.
///
/// # Errors
///
/// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be created, or
/// [`FetchError::Unsupported`] when the browser strategy is requested from a
/// build without the `headless` feature.
pub fn build_fetcher(config: &FetcherConfig) -> Result<Arc<dyn PageFetcher>, FetchError> {
    info!(
        fetcher = %config.strategy,
        timeout_secs = config.timeout.as_secs(),
        "building page fetcher"
    );
    match config.strategy {
        FetchStrategy::Http => Ok(Arc::new(HttpFetcher::new(config.timeout)?)),
        #[cfg(feature = "headless")]
        FetchStrategy::Browser => Ok(Arc::new(BrowserFetcher::new(config.clone()))),
        #[cfg(not(feature = "headless"))]
        FetchStrategy::Browser => Err(FetchError::Unsupported {
            strategy: FetchStrategy::Browser.as_str(),
        }),
    }
}
