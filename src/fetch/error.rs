//! Error types for the fetch module.
//!
//! Every variant is retryable from the scraper's point of view; the variants
//! exist so logs and the final error message say what actually went wrong.

use thiserror::Error;

/// Errors that can occur while retrieving a page body.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provided URL is malformed or uses an unsupported scheme.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request or navigation did not finish within the fetch timeout.
    #[error("timeout fetching {url} after {timeout_secs}s")]
    Timeout {
        /// The URL that timed out.
        url: String,
        /// The timeout that was exceeded.
        timeout_secs: u64,
    },

    /// Non-success HTTP status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be read or decoded as text.
    #[error("failed to read response body from {url}: {source}")]
    Body {
        /// The URL whose body failed.
        url: String,
        /// The underlying read/decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The headless browser could not be started.
    #[error("failed to launch browser: {message}")]
    BrowserLaunch {
        /// Launch failure details (includes the fallback attempt when one was made).
        message: String,
    },

    /// The browser started but navigation or content capture failed.
    #[error("browser navigation to {url} failed: {message}")]
    Navigation {
        /// The URL being loaded.
        url: String,
        /// Navigation failure details.
        message: String,
    },

    /// The requested fetch strategy is not compiled into this build.
    #[error("fetch strategy '{strategy}' is not available in this build")]
    Unsupported {
        /// Name of the unavailable strategy.
        strategy: &'static str,
    },
}

impl FetchError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self::Timeout {
            url: url.into(),
            timeout_secs,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a body read error.
    pub fn body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Body {
            url: url.into(),
            source,
        }
    }

    /// Creates a browser launch error.
    pub fn browser_launch(message: impl Into<String>) -> Self {
        Self::BrowserLaunch {
            message: message.into(),
        }
    }

    /// Creates a navigation error.
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }
}
