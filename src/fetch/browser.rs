//! Headless browser fetch strategy.
//!
//! Every fetch launches its own Chromium with a throwaway profile directory,
//! loads the page, captures the rendered DOM, and tears the browser down
//! again whatever the outcome.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::{BROWSER_ARGS, BROWSER_CLOSE_GRACE_SECS};
use super::{FetchError, FetcherConfig, PageFetcher};
use crate::user_agent::random_user_agent;

/// Fetches pages by rendering them in a headless Chromium.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    config: FetcherConfig,
}

/// A running browser plus the task pumping its CDP event stream.
///
/// The profile directory lives exactly as long as the session.
struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    _profile: TempDir,
}

impl BrowserFetcher {
    /// Creates a browser fetcher from the shared fetch settings.
    #[must_use]
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Launches a browser, falling back to the pinned executable once.
    async fn launch(&self, user_agent: &str) -> Result<BrowserSession, FetchError> {
        let primary = match self.launch_with(None, user_agent).await {
            Ok(session) => return Ok(session),
            Err(message) => message,
        };
        warn!(error = %primary, "failed to launch auto-detected browser");

        let Some(pinned) = self.config.chrome_path.as_deref() else {
            return Err(FetchError::browser_launch(primary));
        };

        match self.launch_with(Some(pinned), user_agent).await {
            Ok(session) => {
                info!(path = %pinned.display(), "launched pinned browser");
                Ok(session)
            }
            Err(fallback) => Err(FetchError::browser_launch(format!(
                "auto-detected browser: {primary}. pinned browser {}: {fallback}",
                pinned.display()
            ))),
        }
    }

    async fn launch_with(
        &self,
        executable: Option<&Path>,
        user_agent: &str,
    ) -> Result<BrowserSession, String> {
        let profile = tempfile::Builder::new()
            .prefix("page-scraper-profile-")
            .tempdir()
            .map_err(|e| format!("cannot create profile directory: {e}"))?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .launch_timeout(self.config.timeout)
            .args(BROWSER_ARGS)
            .arg(format!("--user-agent={user_agent}"));
        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build()?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| e.to_string())?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        debug!(profile = %profile.path().display(), "browser launched");
        Ok(BrowserSession {
            browser,
            handler_task,
            _profile: profile,
        })
    }
}

impl BrowserSession {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| FetchError::navigation(url, e.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| FetchError::navigation(url, e.to_string()))?;
        page.content()
            .await
            .map_err(|e| FetchError::navigation(url, e.to_string()))
    }

    /// Closes the browser, killing the process if it does not exit in time.
    async fn shutdown(&mut self) {
        let grace = Duration::from_secs(BROWSER_CLOSE_GRACE_SECS);
        match tokio::time::timeout(grace, self.browser.close()).await {
            Ok(Ok(_)) => {
                if tokio::time::timeout(grace, self.browser.wait()).await.is_err() {
                    warn!("browser did not exit after close");
                }
            }
            Ok(Err(e)) => warn!(error = %e, "browser close failed"),
            Err(_) => warn!("browser close timed out"),
        }
        // No-op when the process already exited.
        if let Some(Err(e)) = self.browser.kill().await {
            debug!(error = %e, "browser kill after close");
        }
        self.handler_task.abort();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // chromiumoxide kills an unclosed child on drop; the handler needs stopping too.
        self.handler_task.abort();
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    fn name(&self) -> &str {
        "browser"
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let mut session = self.launch(random_user_agent()).await?;
        let rendered = tokio::time::timeout(self.config.timeout, session.render(url)).await;
        session.shutdown().await;

        let html = rendered.map_err(|_| FetchError::timeout(url, self.config.timeout.as_secs()))??;
        debug!(bytes = html.len(), "rendered page");
        Ok(html)
    }
}
