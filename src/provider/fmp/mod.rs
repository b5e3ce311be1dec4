//! Financial Modeling Prep adapter

use crate::error::{AppError, Result};
use crate::provider::types::*;
use crate::provider::{describe_status, error_message, is_premium_restricted, MetricsProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com";

/// Ticker used to probe whether an API key works
const PROBE_TICKER: &str = "AAPL";

/// Financial Modeling Prep provider implementation
pub struct FmpProvider {
    client: Client,
    base_url: String,
}

impl FmpProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid API base URL '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn key_metrics_url(&self, ticker: &str) -> String {
        format!(
            "{}/api/v3/key-metrics-ttm/{}",
            self.base_url,
            urlencoding::encode(ticker)
        )
    }

    fn ratios_url(&self) -> String {
        format!("{}/stable/ratios-ttm", self.base_url)
    }

    fn profile_url(&self, ticker: &str) -> String {
        format!("{}/api/v3/profile/{}", self.base_url, urlencoding::encode(ticker))
    }

    /// Send a GET request and return the status and raw body text
    async fn get_text(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<(reqwest::StatusCode, String)> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(AppError::http)?;

        let status = response.status();
        let body = response.text().await.map_err(AppError::http)?;

        Ok((status, body))
    }

    /// Parse a JSON array body and take its first element
    fn first_element<T: DeserializeOwned>(body: &str) -> Result<Option<T>> {
        let mut items: Vec<T> = serde_json::from_str(body)?;
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(items.swap_remove(0)))
        }
    }
}

#[async_trait]
impl MetricsProvider for FmpProvider {
    fn name(&self) -> &'static str {
        "Financial Modeling Prep"
    }

    async fn fetch_key_metrics(&self, api_key: &str, ticker: &str) -> Result<KeyMetricsOutcome> {
        let (status, body) = self
            .get_text(self.key_metrics_url(ticker), &[("apikey", api_key)])
            .await?;

        if let Some(message) = error_message(&body) {
            if is_premium_restricted(&message) {
                debug!("Premium-only ticker: {}", ticker);
                return Ok(KeyMetricsOutcome::PremiumOnly);
            }
            if status.is_success() {
                return Err(AppError::Provider(message));
            }
        }

        if !status.is_success() {
            return Err(AppError::Provider(describe_status(status)));
        }

        Ok(match Self::first_element::<TtmMetrics>(&body)? {
            Some(metrics) => KeyMetricsOutcome::Found(metrics),
            None => KeyMetricsOutcome::Empty,
        })
    }

    async fn fetch_ratios(&self, api_key: &str, ticker: &str) -> Result<RatiosOutcome> {
        let (status, body) = self
            .get_text(self.ratios_url(), &[("symbol", ticker), ("apikey", api_key)])
            .await?;

        // The ratios endpoint answers premium restrictions with plain text
        if is_premium_restricted(&body) {
            debug!("Ratios for {} are premium-only", ticker);
            return Ok(RatiosOutcome::PremiumOnly);
        }

        if !status.is_success() {
            return Err(AppError::Provider(describe_status(status)));
        }

        Ok(match Self::first_element::<MarginRatios>(&body)? {
            Some(ratios) => RatiosOutcome::Found(ratios),
            None => RatiosOutcome::Empty,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<ApiKeyCheck> {
        let (status, body) = self
            .get_text(self.profile_url(PROBE_TICKER), &[("apikey", api_key)])
            .await?;

        if !status.is_success() {
            return Ok(ApiKeyCheck {
                valid: false,
                message: describe_status(status),
            });
        }

        let check = match Self::first_element::<CompanyProfile>(&body) {
            Ok(Some(profile)) => ApiKeyCheck {
                valid: true,
                message: format!("API key is valid for {}", profile.company_name),
            },
            Ok(None) => ApiKeyCheck {
                valid: false,
                message: "Invalid JSON structure".to_string(),
            },
            Err(e) => ApiKeyCheck {
                valid: false,
                message: format!("JSON decoding error: {}", e),
            },
        };

        Ok(check)
    }
}
