//! SQLite database models

use crate::provider::types::TtmMetrics;
use serde::{Deserialize, Serialize};

/// Cached metrics for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub ticker: String,
    #[serde(flatten)]
    pub metrics: TtmMetrics,
    /// Margins could not be fetched because they need a higher API tier
    #[serde(rename = "isPremiumRestricted")]
    pub is_premium_restricted: bool,
}

impl MetricsRecord {
    pub fn new(ticker: &str, metrics: TtmMetrics, is_premium_restricted: bool) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            metrics,
            is_premium_restricted,
        }
    }
}

/// Canonical form of a ticker used as the storage key
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Refresh interval used when the stored one is unusable
pub const DEFAULT_REFRESH_INTERVAL_SECS: i64 = 24 * 60 * 60;

/// Settings model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Age after which a cached record is refreshed
    pub refresh_interval_secs: i64,
    /// Per-request deadline for the provider
    pub request_timeout_secs: i64,
    pub api_base_url: String,
    pub updated_at: String,
}

impl Settings {
    /// Stored interval, or the default when it is not a positive span chrono can hold
    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.refresh_interval_secs)
            .filter(|interval| *interval > chrono::Duration::zero())
            .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_REFRESH_INTERVAL_SECS))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1) as u64)
    }
}
