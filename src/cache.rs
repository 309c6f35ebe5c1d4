//! Time-bounded memoization of extraction results.
//!
//! [`ResultCache`] maps the URL string exactly as supplied to the last
//! successful [`ExtractionResult`] for it. An entry older than the TTL is
//! treated as absent but stays in the map until it is overwritten, unless the
//! owner calls [`ResultCache::purge_expired`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use page_scraper::cache::ResultCache;
//! use page_scraper::extract::extract;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = ResultCache::new(Duration::from_secs(3600));
//! let result = extract("<title>T</title>", "https://example.com");
//!
//! cache.store("https://example.com", result.clone());
//! assert_eq!(cache.lookup("https://example.com"), Some(result));
//! assert_eq!(cache.lookup("https://example.com/"), None); // no normalization
//! # }
//! ```

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::extract::ExtractionResult;

/// Default time-to-live for cached results (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
struct CacheEntry {
    result: ExtractionResult,
    stored_at: Instant,
}

/// Concurrent TTL cache keyed by URL.
///
/// Unbounded by default. With [`with_max_entries`](Self::with_max_entries)
/// the oldest entry is evicted to make room for a new key.
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    max_entries: Option<usize>,
    entries: DashMap<String, CacheEntry>,
    // Serializes bounded stores so capacity check, eviction and insert act as one step.
    bound_lock: Mutex<()>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl ResultCache {
    /// Creates an unbounded cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_entries: None,
            entries: DashMap::new(),
            bound_lock: Mutex::new(()),
        }
    }

    /// Creates a cache holding at most `max_entries` URLs.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn with_max_entries(ttl: Duration, max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries.max(1)),
            ..Self::new(ttl)
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the number of physically stored entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached result for `url` if it is younger than the TTL.
    #[must_use]
    #[instrument(level = "debug", skip(self))]
    pub fn lookup(&self, url: &str) -> Option<ExtractionResult> {
        let entry = self.entries.get(url)?;
        if entry.stored_at.elapsed() < self.ttl {
            debug!("cache hit");
            Some(entry.result.clone())
        } else {
            debug!(age_secs = entry.stored_at.elapsed().as_secs(), "cache entry stale");
            None
        }
    }

    /// Stores `result` for `url`, replacing any previous entry.
    #[instrument(level = "debug", skip(self, result))]
    pub fn store(&self, url: &str, result: ExtractionResult) {
        let entry = CacheEntry {
            result,
            stored_at: Instant::now(),
        };

        let Some(max) = self.max_entries else {
            self.entries.insert(url.to_string(), entry);
            return;
        };

        let _guard = self
            .bound_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !self.entries.contains_key(url) {
            while self.entries.len() >= max {
                if !self.evict_oldest() {
                    break;
                }
            }
        }
        self.entries.insert(url.to_string(), entry);
    }

    /// Drops every entry older than the TTL and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Removes the oldest entry; returns `false` when the map is empty.
    fn evict_oldest(&self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.stored_at)
            .map(|entry| entry.key().clone());
        let Some(url) = oldest else {
            return false;
        };
        debug!(url = %url, "evicting oldest cache entry");
        self.entries.remove(&url);
        true
    }
}
