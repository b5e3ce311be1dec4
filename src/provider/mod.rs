//! Financial data provider module

pub mod types;
pub mod fmp;

use crate::error::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use types::*;

/// Text the API puts in responses for data outside the current plan
pub const PREMIUM_MARKER: &str = "Premium Query";

/// Keys under which the key-metrics endpoint reports error messages
const ERROR_MESSAGE_KEYS: [&str; 4] = ["Error Message", "message", "note", "error"];

/// Provider trait that all metrics sources must implement
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Provider display name
    fn name(&self) -> &'static str;

    /// Fetch trailing-twelve-month key metrics for a ticker
    async fn fetch_key_metrics(&self, api_key: &str, ticker: &str) -> Result<KeyMetricsOutcome>;

    /// Fetch net profit and EBIT margins for a ticker
    async fn fetch_ratios(&self, api_key: &str, ticker: &str) -> Result<RatiosOutcome>;

    /// Check whether an API key is accepted by the provider
    async fn verify_api_key(&self, api_key: &str) -> Result<ApiKeyCheck>;
}

/// Whether a piece of response text signals a premium-only restriction.
pub fn is_premium_restricted(text: &str) -> bool {
    text.contains(PREMIUM_MARKER)
}

/// Extract the error message from an error-shaped JSON payload.
///
/// Returns `None` when the body is not a JSON object or carries no
/// string message under a known key.
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    ERROR_MESSAGE_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Human readable description of a failing HTTP status
pub fn describe_status(status: StatusCode) -> String {
    match status.as_u16() {
        400 => "Bad Request - Invalid API format".to_string(),
        401 => "Unauthorized - Invalid API key".to_string(),
        403 => "Forbidden - API key might be blocked".to_string(),
        404 => "Not Found - Incorrect URL or ticker".to_string(),
        500..=599 => "Server error - Try again later".to_string(),
        code => format!("HTTP Error: {}", code),
    }
}
