//! Per-client sliding-window admission control.
//!
//! This module provides the [`RateLimiter`] struct which admits at most
//! `limit` requests per client inside any trailing `window`. Timestamps that
//! have left the window are pruned lazily, on the next check for that client.
//!
//! # Overview
//!
//! Clients are tracked independently: one client exhausting its quota never
//! affects another. A rejected request is not recorded, so it does not
//! extend the time a client has to wait.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use page_scraper::rate_limiter::RateLimiter;
//!
//! let limiter = RateLimiter::new(2, Duration::from_secs(60));
//!
//! assert!(limiter.admit("203.0.113.7"));
//! assert!(limiter.admit("203.0.113.7"));
//! assert!(!limiter.admit("203.0.113.7"));
//!
//! // Other clients have their own window
//! assert!(limiter.admit("198.51.100.1"));
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Default number of admissions per window.
pub const DEFAULT_RATE_LIMIT: usize = 10;

/// Default trailing window length (60 seconds).
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window rate limiter keyed by client identity.
///
/// `RateLimiter` is `Send + Sync`; share it across request handlers with `Arc`.
/// Each admission check is a single update of that client's map entry, done
/// under the `DashMap` shard lock, so concurrent checks never lose a timestamp.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum admissions per window.
    limit: usize,

    /// Trailing window length.
    window: Duration,

    /// Whether rate limiting is disabled (for `--rate-limit 0`).
    disabled: bool,

    /// Admission timestamps per client, oldest first.
    clients: DashMap<String, VecDeque<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW)
    }
}

impl RateLimiter {
    /// Creates a limiter admitting `limit` requests per `window` per client.
    ///
    /// A limit of zero creates a disabled limiter.
    #[must_use]
    #[instrument(skip_all, fields(limit = limit, window_secs = window.as_secs()))]
    pub fn new(limit: usize, window: Duration) -> Self {
        if limit == 0 {
            return Self::disabled();
        }
        debug!("creating rate limiter");
        Self {
            limit,
            window,
            disabled: false,
            clients: DashMap::new(),
        }
    }

    /// Creates a disabled rate limiter that admits every request.
    #[must_use]
    #[instrument]
    pub fn disabled() -> Self {
        debug!("creating disabled rate limiter");
        Self {
            limit: 0,
            window: Duration::ZERO,
            disabled: true,
            clients: DashMap::new(),
        }
    }

    /// Returns whether rate limiting is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Returns the admissions allowed per window.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the number of clients currently tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    /// Decides whether `client_id` may make another request now.
    ///
    /// Prunes the client's timestamps that fell out of the window, admits
    /// iff fewer than `limit` remain, and records the admission.
    #[instrument(level = "debug", skip(self))]
    pub fn admit(&self, client_id: &str) -> bool {
        if self.disabled {
            return true;
        }

        let now = Instant::now();
        let mut history = self.clients.entry(client_id.to_string()).or_default();

        while history
            .front()
            .is_some_and(|stamp| now.duration_since(*stamp) >= self.window)
        {
            history.pop_front();
        }

        if history.len() >= self.limit {
            warn!(
                client = client_id,
                limit = self.limit,
                window_secs = self.window.as_secs(),
                "rate limit exceeded"
            );
            return false;
        }

        history.push_back(now);
        debug!(client = client_id, in_window = history.len(), "request admitted");
        true
    }

    /// Forgets clients with no admissions inside the current window.
    ///
    /// Returns how many clients were dropped.
    pub fn sweep_idle(&self) -> usize {
        let before = self.clients.len();
        let now = Instant::now();
        self.clients.retain(|_, history| {
            history
                .back()
                .is_some_and(|stamp| now.duration_since(*stamp) < self.window)
        });
        let removed = before.saturating_sub(self.clients.len());
        if removed > 0 {
            debug!(removed, "swept idle rate limit windows");
        }
        removed
    }
}
