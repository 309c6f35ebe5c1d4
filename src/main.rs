//! CLI entry point for the page scraper webhook.

use anyhow::{Context, Result, bail};
use clap::Parser;
use page_scraper::{AppState, ScrapeService, serve};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.webhook_key.trim().is_empty() {
        bail!("WEBHOOK_KEY must be set to a non-empty value");
    }

    let scraper_config = args.scraper_config();
    let server_config = args.server_config();
    debug!(
        fetcher = %scraper_config.fetcher.strategy,
        cache_ttl_secs = scraper_config.cache_ttl.as_secs(),
        rate_limit = scraper_config.rate_limit,
        rate_window_secs = scraper_config.rate_window.as_secs(),
        max_retries = scraper_config.max_retries,
        "configuration loaded"
    );
    info!("Page scraper starting");

    let service = ScrapeService::from_config(&scraper_config)
        .context("failed to initialize fetch strategy")?;

    let sweeper = scraper_config
        .sweep_interval
        .map(|period| service.spawn_sweeper(period));

    let state = AppState::new(service, args.webhook_key.as_str());
    let result = serve(&server_config, state)
        .await
        .with_context(|| format!("server on {}:{} failed", server_config.bind, server_config.port));

    if let Some(handle) = sweeper {
        handle.abort();
    }
    result
}
