//! Page Scraper Library
//!
//! Fetches a web page, extracts its structured content, and serves the
//! result over a key-protected webhook with per-client rate limiting and a
//! time-bounded result cache.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - Page retrieval strategies (plain HTTP, headless browser)
//! - [`extract`] - HTML to [`ExtractionResult`] conversion
//! - [`scrape`] - Fetch and extract with a bounded number of attempts
//! - [`cache`] - Per-URL result cache with a fixed time-to-live
//! - [`rate_limiter`] - Sliding-window admission control per client
//! - [`service`] - The pipeline the webhook calls
//! - [`server`] - axum router and listener
//! - [`validation`] - Webhook request envelope checks

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod rate_limiter;
pub mod scrape;
pub mod server;
pub mod service;
pub mod user_agent;
pub mod validation;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use cache::{DEFAULT_CACHE_TTL, ResultCache};
pub use config::ScraperConfig;
pub use extract::{ExtractionResult, Link, count_internal_pages, extract};
pub use fetch::{FetchError, FetchStrategy, FetcherConfig, HttpFetcher, PageFetcher, build_fetcher};
pub use rate_limiter::{DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW, RateLimiter};
pub use scrape::{DEFAULT_MAX_RETRIES, RetryingScraper, ScrapeError};
pub use server::{AppState, ServerConfig, create_app, serve};
pub use service::{ScrapeOutcome, ScrapeService};
pub use validation::{ValidationError, validate_input};
