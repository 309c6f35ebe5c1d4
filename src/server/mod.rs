//! Webhook HTTP surface.
//!
//! Thin axum layer over [`ScrapeService`]: it derives the client identity
//! from the peer address, checks the shared webhook key, validates the JSON
//! envelope, and shapes pipeline results into the response bodies clients
//! expect.
//!
//! | route | purpose |
//! |---|---|
//! | `GET /` | welcome text |
//! | `GET /test` | liveness probe |
//! | `GET /webhook` | rate-limited endpoint check |
//! | `POST /webhook` | rate limit, key check, validation, scrape |
//! | `GET /assets/*` | static files |

mod handlers;
mod response;

pub use response::{ApiError, ScrapeResponse};

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::service::ScrapeService;

/// Header carrying the shared webhook key.
pub const WEBHOOK_KEY_HEADER: &str = "x-webhook-key";

/// Listener and static-file settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: IpAddr,
    /// Port to bind.
    pub port: u16,
    /// Directory served under `/assets`.
    pub assets_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            assets_dir: PathBuf::from("assets"),
        }
    }
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    service: ScrapeService,
    webhook_key: Arc<str>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.service)
            .field("webhook_key", &"[REDACTED]")
            .finish()
    }
}

impl AppState {
    /// Creates handler state from the pipeline and the expected webhook key.
    #[must_use]
    pub fn new(service: ScrapeService, webhook_key: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            webhook_key: webhook_key.into(),
        }
    }

    /// Returns the pipeline.
    #[must_use]
    pub fn service(&self) -> &ScrapeService {
        &self.service
    }

    /// Compares `candidate` with the configured key without early exit.
    fn key_matches(&self, candidate: Option<&str>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        let expected = self.webhook_key.as_bytes();
        let candidate = candidate.as_bytes();
        let diff = expected
            .iter()
            .zip(candidate)
            .fold(expected.len() ^ candidate.len(), |acc, (a, b)| {
                acc | usize::from(a ^ b)
            });
        diff == 0
    }
}

/// Builds the router.
pub fn create_app(state: AppState, assets_dir: impl Into<PathBuf>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/test", get(handlers::test_route))
        .route(
            "/webhook",
            get(handlers::webhook_info).post(handlers::webhook),
        )
        .nest_service("/assets", ServeDir::new(assets_dir.into()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an IO error if the address cannot be bound or the server fails.
pub async fn serve(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind((config.bind, config.port)).await?;
    info!(addr = %listener.local_addr()?, "listening");

    let app = create_app(state, config.assets_dir.clone());
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
