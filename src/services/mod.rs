//! Services Layer
//!
//! Business logic shared by every front end (the CLI today, a desktop
//! window later). Services take the [`AppState`](crate::state::AppState)
//! and coordinate the cache, the credential store and the provider.
//!
//! # Architecture
//!
//! ```text
//! CLI / UI --> Services --> SQLite cache
//!                       \-> Credential store
//!                       \-> Metrics provider (HTTP)
//! ```
//!
//! # Services
//!
//! - `MetricsService` - Cached metrics lookup with daily refresh
//! - `ApiKeyService` - Verify, store and remove the provider API key

pub mod metrics_service;
pub mod api_key_service;

pub use metrics_service::MetricsService;
pub use api_key_service::{ApiKeyService, ApiKeyStatus};

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted provider and state builders shared by service tests

    use crate::db::sqlite::SqliteDb;
    use crate::error::{AppError, Result};
    use crate::provider::types::*;
    use crate::provider::MetricsProvider;
    use crate::security::InMemoryCredentialStore;
    use crate::state::AppState;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Scripted reply; `Fail` becomes a provider error
    #[derive(Clone)]
    pub enum Reply<T> {
        Ok(T),
        Fail,
    }

    impl<T> Reply<T> {
        fn into_result(self) -> Result<T> {
            match self {
                Reply::Ok(value) => Ok(value),
                Reply::Fail => Err(AppError::Provider("Server error - Try again later".into())),
            }
        }
    }

    pub struct ScriptedProvider {
        pub key_metrics: Mutex<Reply<KeyMetricsOutcome>>,
        pub ratios: Mutex<Reply<RatiosOutcome>>,
        pub key_check: Mutex<Reply<ApiKeyCheck>>,
        pub delay: Duration,
        pub key_metrics_calls: AtomicUsize,
        pub ratios_calls: AtomicUsize,
        pub verify_calls: AtomicUsize,
        pub tickers_seen: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub fn new(key_metrics: Reply<KeyMetricsOutcome>, ratios: Reply<RatiosOutcome>) -> Self {
            Self {
                key_metrics: Mutex::new(key_metrics),
                ratios: Mutex::new(ratios),
                key_check: Mutex::new(Reply::Fail),
                delay: Duration::ZERO,
                key_metrics_calls: AtomicUsize::new(0),
                ratios_calls: AtomicUsize::new(0),
                verify_calls: AtomicUsize::new(0),
                tickers_seen: Mutex::new(Vec::new()),
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn calls(&self) -> (usize, usize) {
            (
                self.key_metrics_calls.load(Ordering::SeqCst),
                self.ratios_calls.load(Ordering::SeqCst),
            )
        }
    }

    #[async_trait]
    impl MetricsProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "Scripted"
        }

        async fn fetch_key_metrics(&self, _api_key: &str, ticker: &str) -> Result<KeyMetricsOutcome> {
            self.key_metrics_calls.fetch_add(1, Ordering::SeqCst);
            self.tickers_seen.lock().push(ticker.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let reply = self.key_metrics.lock().clone();
            reply.into_result()
        }

        async fn fetch_ratios(&self, _api_key: &str, _ticker: &str) -> Result<RatiosOutcome> {
            self.ratios_calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.ratios.lock().clone();
            reply.into_result()
        }

        async fn verify_api_key(&self, _api_key: &str) -> Result<ApiKeyCheck> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.key_check.lock().clone();
            reply.into_result()
        }
    }

    /// Key metrics resembling a large listed company
    pub fn apple_metrics() -> TtmMetrics {
        TtmMetrics {
            pe_ratio: Some(28.5),
            roe: Some(1.47),
            market_cap: Some(3.4e12),
            roic: Some(0.55),
            current_ratio: Some(0.87),
            ..Default::default()
        }
    }

    pub fn state_with(provider: Arc<ScriptedProvider>, api_key: Option<&str>) -> AppState {
        AppState::with_components(
            Arc::new(SqliteDb::in_memory().unwrap()),
            Arc::new(InMemoryCredentialStore::new(api_key)),
            provider,
        )
    }
}
