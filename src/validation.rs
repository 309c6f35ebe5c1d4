//! Request envelope validation for the webhook.

use serde_json::Value;
use thiserror::Error;

/// Field carrying the page to scrape.
pub const WEBSITE_URL_FIELD: &str = "website_url";

/// Reasons a webhook payload is rejected before any fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Body was missing, null, not an object, or an empty object.
    #[error("No data provided.")]
    NoData,

    /// The object has no `website_url` key.
    #[error("Missing 'website_url' in the request data.")]
    MissingUrl,

    /// `website_url` is not a string, or is blank.
    #[error("'website_url' must be a non-empty string.")]
    InvalidUrl,
}

/// Checks the payload and returns the URL to scrape, untrimmed.
///
/// # Errors
///
/// Returns the first [`ValidationError`] that applies.
///
/// ```
/// use page_scraper::validation::{ValidationError, validate_input};
/// use serde_json::json;
///
/// assert_eq!(
///     validate_input(&json!({"website_url": "https://example.com"})),
///     Ok("https://example.com".to_string())
/// );
/// assert_eq!(validate_input(&json!({})), Err(ValidationError::NoData));
/// assert_eq!(
///     validate_input(&json!({"website_url": 123})),
///     Err(ValidationError::InvalidUrl)
/// );
/// ```
pub fn validate_input(data: &Value) -> Result<String, ValidationError> {
    let object = match data {
        Value::Object(object) if !object.is_empty() => object,
        _ => return Err(ValidationError::NoData),
    };

    let url = object
        .get(WEBSITE_URL_FIELD)
        .ok_or(ValidationError::MissingUrl)?;

    match url {
        Value::String(url) if !url.trim().is_empty() => Ok(url.clone()),
        _ => Err(ValidationError::InvalidUrl),
    }
}
