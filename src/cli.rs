//! CLI argument definitions using clap derive macros.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use page_scraper::fetch::{FetchStrategy, FetcherConfig};
use page_scraper::server::ServerConfig;
use page_scraper::ScraperConfig;

/// Scrape web pages into structured JSON over a webhook.
///
/// Every flag can also be set through the environment variable shown in
/// `--help`.
#[derive(Parser, Debug)]
#[command(name = "page-scraper")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Address to bind
    #[arg(long, env = "PAGE_SCRAPER_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Shared key expected in the X-Webhook-Key header
    #[arg(long, env = "WEBHOOK_KEY", hide_env_values = true)]
    pub webhook_key: String,

    /// Seconds a scraped result stays cached
    #[arg(long, env = "PAGE_SCRAPER_CACHE_TTL_SECS", default_value_t = 3600)]
    pub cache_ttl_secs: u64,

    /// Maximum cached URLs (unbounded when omitted)
    #[arg(long, env = "PAGE_SCRAPER_CACHE_MAX_ENTRIES", value_parser = clap::value_parser!(u64).range(1..))]
    pub cache_max_entries: Option<u64>,

    /// Requests allowed per client per window (0 to disable)
    #[arg(short = 'l', long, env = "PAGE_SCRAPER_RATE_LIMIT", default_value_t = 10)]
    pub rate_limit: u32,

    /// Rate limit window in seconds
    #[arg(long, env = "PAGE_SCRAPER_RATE_WINDOW_SECS", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub rate_window_secs: u64,

    /// Scrape attempts per request (1-10)
    // Default mirrors page_scraper::DEFAULT_MAX_RETRIES.
    #[arg(short = 'r', long, env = "PAGE_SCRAPER_MAX_RETRIES", default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Timeout for a single fetch in seconds
    #[arg(long, env = "PAGE_SCRAPER_FETCH_TIMEOUT_SECS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub fetch_timeout_secs: u64,

    /// Fetch strategy: http or browser
    #[arg(long, env = "PAGE_SCRAPER_FETCHER", default_value = "http")]
    pub fetcher: FetchStrategy,

    /// Pinned Chromium executable used when the detected browser fails to launch
    #[arg(long, env = "PAGE_SCRAPER_CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Launch Chromium without its sandbox (some containers require this)
    #[arg(long, env = "PAGE_SCRAPER_NO_SANDBOX")]
    pub no_sandbox: bool,

    /// Directory served under /assets
    #[arg(long, env = "PAGE_SCRAPER_ASSETS_DIR", default_value = "assets")]
    pub assets_dir: PathBuf,

    /// Seconds between sweeps of stale cache entries and idle clients (0 to disable)
    #[arg(long, env = "PAGE_SCRAPER_SWEEP_INTERVAL_SECS", default_value_t = 0)]
    pub sweep_interval_secs: u64,
}

impl Args {
    /// Pipeline settings derived from the flags.
    pub fn scraper_config(&self) -> ScraperConfig {
        ScraperConfig {
            fetcher: FetcherConfig {
                strategy: self.fetcher,
                timeout: Duration::from_secs(self.fetch_timeout_secs),
                chrome_path: self.chrome_path.clone(),
                no_sandbox: self.no_sandbox,
            },
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            cache_max_entries: self
                .cache_max_entries
                .map(|max| usize::try_from(max).unwrap_or(usize::MAX)),
            rate_limit: usize::try_from(self.rate_limit).unwrap_or(usize::MAX),
            rate_window: Duration::from_secs(self.rate_window_secs),
            max_retries: u32::from(self.max_retries),
            sweep_interval: (self.sweep_interval_secs > 0)
                .then(|| Duration::from_secs(self.sweep_interval_secs)),
        }
    }

    /// Listener settings derived from the flags.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind: self.bind,
            port: self.port,
            assets_dir: self.assets_dir.clone(),
        }
    }
}
