//! Metrics Service
//!
//! Decides between the local cache and a fresh provider fetch, merges the
//! key-metrics and ratios responses, and keeps the cache current.

use crate::db::sqlite::models::{normalize_ticker, MetricsRecord, DEFAULT_REFRESH_INTERVAL_SECS};
use crate::error::{LookupError, Result};
use crate::provider::types::{KeyMetricsOutcome, RatiosOutcome, TtmMetrics};
use crate::state::AppState;
use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};

/// Metrics service for business logic
pub struct MetricsService;

impl MetricsService {
    /// Get metrics for a ticker, from cache when fresh, otherwise from the provider.
    ///
    /// Concurrent lookups of the same ticker run one at a time; a caller that
    /// waited behind a successful refresh is answered from the cache.
    pub async fn fetch_metrics(
        state: &AppState,
        ticker: &str,
    ) -> std::result::Result<MetricsRecord, LookupError> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Err(LookupError::NotFound);
        }

        let slot = state.lookup_slot(&ticker);
        let _guard = slot.lock().await;
        Self::fetch_locked(state, &ticker).await
    }

    /// Whether the cached record for a ticker is missing or stale
    pub fn should_refresh(state: &AppState, ticker: &str) -> bool {
        let ticker = normalize_ticker(ticker);

        match state.sqlite.get_metrics(&ticker) {
            Ok(Some(_)) => {}
            Ok(None) => return true,
            Err(e) => {
                warn!("Cache lookup for {} failed, refreshing: {}", ticker, e);
                return true;
            }
        }

        match state.sqlite.get_last_fetch(&ticker) {
            Ok(Some(fetched_at)) => Utc::now() - fetched_at > Self::refresh_interval(state),
            Ok(None) => true,
            Err(e) => {
                warn!("Fetch time for {} unreadable, refreshing: {}", ticker, e);
                true
            }
        }
    }

    /// Drop the cached record and fetch time so the next lookup refreshes
    pub fn forget(state: &AppState, ticker: &str) -> Result<bool> {
        let ticker = normalize_ticker(ticker);
        let existed = state.sqlite.delete_metrics(&ticker)?;
        state.sqlite.clear_last_fetch(&ticker)?;

        info!("Forgot cached metrics for {}", ticker);
        Ok(existed)
    }

    // ========================================================================
    // Private Helper Methods
    // ========================================================================

    async fn fetch_locked(
        state: &AppState,
        ticker: &str,
    ) -> std::result::Result<MetricsRecord, LookupError> {
        if Self::should_refresh(state, ticker) {
            return Self::refresh(state, ticker).await;
        }

        match state.sqlite.get_metrics(ticker) {
            Ok(Some(record)) => {
                debug!("Serving cached metrics for {}", ticker);
                Ok(record)
            }
            Ok(None) => Err(LookupError::NotFound),
            Err(e) => {
                warn!("Failed to read cached metrics for {}: {}", ticker, e);
                Err(LookupError::NotFound)
            }
        }
    }

    async fn refresh(
        state: &AppState,
        ticker: &str,
    ) -> std::result::Result<MetricsRecord, LookupError> {
        let api_key = state.credentials.load().ok_or(LookupError::MissingApiKey)?;

        info!("Refreshing metrics for {} from {}", ticker, state.provider.name());

        let primary = match state.provider.fetch_key_metrics(&api_key, ticker).await {
            Ok(KeyMetricsOutcome::Found(metrics)) => metrics,
            Ok(KeyMetricsOutcome::PremiumOnly) => {
                info!("Metrics for {} require a premium plan", ticker);
                return Err(LookupError::PremiumOnly);
            }
            Ok(KeyMetricsOutcome::Empty) => {
                debug!("No key metrics returned for {}", ticker);
                return Err(LookupError::NotFound);
            }
            Err(e) => {
                warn!("Key metrics request for {} failed: {}", ticker, e);
                return Err(LookupError::NotFound);
            }
        };

        if !primary.is_meaningful() {
            debug!("Key metrics for {} carry no P/E, ROE or market cap", ticker);
            return Err(LookupError::NotFound);
        }

        let ratios = state.provider.fetch_ratios(&api_key, ticker).await;
        let record = Self::merge(ticker, primary, ratios);

        Self::persist(state, ticker, &record);
        Ok(record)
    }

    /// Combine the primary metrics with the outcome of the ratios request
    fn merge(ticker: &str, mut primary: TtmMetrics, ratios: Result<RatiosOutcome>) -> MetricsRecord {
        let is_premium_restricted = match ratios {
            Ok(RatiosOutcome::Found(ratios)) => {
                primary.overlay_margins(&ratios);
                false
            }
            Ok(RatiosOutcome::Empty) => false,
            Ok(RatiosOutcome::PremiumOnly) => {
                debug!("Margins for {} require a premium plan", ticker);
                true
            }
            Err(e) => {
                warn!("Ratios request for {} failed, keeping key metrics only: {}", ticker, e);
                false
            }
        };

        MetricsRecord::new(ticker, primary, is_premium_restricted)
    }

    /// Store the record and mark the ticker fresh.
    ///
    /// Failures are reported as alerts; the fetched record is still returned.
    fn persist(state: &AppState, ticker: &str, record: &MetricsRecord) {
        if let Err(e) = state.sqlite.put_metrics(ticker, record) {
            error!("Failed to save metrics for {}: {}", ticker, e);
            state.alert("[DB] Failed to save data", e.to_string());
            return;
        }

        if let Err(e) = state.sqlite.set_last_fetch(ticker, Utc::now()) {
            error!("Failed to record fetch time for {}: {}", ticker, e);
            state.alert("[DB] Failed to record fetch time", e.to_string());
        }
    }

    fn refresh_interval(state: &AppState) -> Duration {
        match state.sqlite.get_settings() {
            Ok(settings) => settings.refresh_interval(),
            Err(e) => {
                warn!("Failed to read settings, using default refresh interval: {}", e);
                Duration::seconds(DEFAULT_REFRESH_INTERVAL_SECS)
            }
        }
    }
}
