//! Response bodies for the webhook.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::extract::ExtractionResult;
use crate::scrape::ScrapeError;
use crate::validation::ValidationError;

/// Message attached to every successful scrape.
pub const SUCCESS_MESSAGE: &str = "Website successfully scraped.";

/// Body of a successful `POST /webhook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResponse {
    /// Always `"success"`.
    pub status: String,
    /// The extraction result.
    pub scraped_data: ExtractionResult,
    /// Human-readable summary.
    pub message: String,
}

impl ScrapeResponse {
    /// Wraps a result in the success envelope.
    #[must_use]
    pub fn success(scraped_data: ExtractionResult) -> Self {
        Self {
            status: "success".to_string(),
            scraped_data,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for ScrapeResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Everything the webhook can answer with instead of a scrape result.
#[derive(Debug)]
pub enum ApiError {
    /// Client exceeded its request quota.
    RateLimited,
    /// Missing or wrong webhook key.
    Unauthorized,
    /// Malformed request envelope.
    Invalid(ValidationError),
    /// The scrape itself failed.
    Scrape(ScrapeError),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Invalid(_) | Self::Scrape(ScrapeError::EmptyUrl) => StatusCode::BAD_REQUEST,
            Self::Scrape(ScrapeError::Exhausted { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        Self::Invalid(error)
    }
}

impl From<ScrapeError> for ApiError {
    fn from(error: ScrapeError) -> Self {
        Self::Scrape(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::RateLimited => json!({ "error": "Rate limit exceeded" }),
            Self::Unauthorized => json!({ "error": "Invalid webhook key" }),
            Self::Invalid(e) => json!({ "error": e.to_string() }),
            Self::Scrape(e) => json!({ "error": e.to_string(), "status": "failed" }),
        };
        (status, Json(body)).into_response()
    }
}
