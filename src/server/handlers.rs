use std::net::SocketAddr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use super::response::{ApiError, ScrapeResponse};
use super::{AppState, WEBHOOK_KEY_HEADER};
use crate::validation::validate_input;

pub(super) async fn home() -> &'static str {
    "Welcome to the page scraper service!"
}

pub(super) async fn test_route() -> Json<Value> {
    Json(json!({ "message": "Test route is working!" }))
}

#[instrument(skip(state), fields(client = %addr.ip()))]
pub(super) async fn webhook_info(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<Value>, ApiError> {
    admit(&state, addr)?;
    Ok(Json(json!({
        "message": "Webhook endpoint is active. Please use POST method to submit data."
    })))
}

#[instrument(skip(state, headers, body), fields(client = %addr.ip()))]
pub(super) async fn webhook(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ScrapeResponse, ApiError> {
    admit(&state, addr)?;

    let key = headers
        .get(WEBHOOK_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    if !state.key_matches(key) {
        warn!(key_present = key.is_some(), "invalid webhook key received");
        return Err(ApiError::Unauthorized);
    }

    let payload: Value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!(error = %e, "request body is not JSON");
        Value::Null
    });
    let url = validate_input(&payload).inspect_err(|e| warn!(error = %e, "validation error"))?;

    info!(url = %url, "scrape requested");
    let outcome = state.service().scrape(&url).await.inspect_err(|e| {
        warn!(url = %url, error = %e, "scraping failed");
    })?;
    debug!(cached = outcome.cached, "scrape served");

    Ok(ScrapeResponse::success(outcome.result))
}

fn admit(state: &AppState, addr: SocketAddr) -> Result<(), ApiError> {
    if state.service().admit(&addr.ip().to_string()) {
        Ok(())
    } else {
        Err(ApiError::RateLimited)
    }
}
