//! Application state management

use crate::db::sqlite::SqliteDb;
use crate::error::{AppError, Result};
use crate::provider::fmp::FmpProvider;
use crate::provider::MetricsProvider;
use crate::security::{CredentialStore, FileCredentialStore, SecurityManager};
use dashmap::DashMap;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, MutexGuard};

const DATABASE_FILE: &str = "StockData.sqlite";
const ALERT_CHANNEL_CAPACITY: usize = 32;

/// Storage problem the user should be told about
#[derive(Debug, Clone, Serialize)]
pub struct StorageAlert {
    pub title: String,
    pub message: String,
}

/// Application state shared across all entry points
pub struct AppState {
    /// SQLite database holding the metrics cache, freshness marks and settings
    pub sqlite: Arc<SqliteDb>,

    /// Where the provider API key is kept
    pub credentials: Arc<dyn CredentialStore>,

    /// Remote metrics source
    pub provider: Arc<dyn MetricsProvider>,

    /// In-flight lookups (ticker -> lock), one refresh per ticker at a time
    pub lookup_locks: DashMap<String, Arc<Mutex<()>>>,

    /// Storage alerts for the presentation layer
    alerts: broadcast::Sender<StorageAlert>,
}

impl AppState {
    /// Create new application state rooted at a data directory
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| {
            AppError::Config(format!("Failed to create data directory {:?}: {}", data_dir, e))
        })?;

        tracing::info!("Data directory: {:?}", data_dir);

        let sqlite = Arc::new(SqliteDb::new(&data_dir.join(DATABASE_FILE))?);
        let settings = sqlite.get_settings()?;

        let provider = Arc::new(FmpProvider::new(
            &settings.api_base_url,
            settings.request_timeout(),
        )?);

        let security = SecurityManager::new(data_dir.to_path_buf())?;
        let credentials = Arc::new(FileCredentialStore::new(data_dir.to_path_buf(), security));

        Ok(Self::with_components(sqlite, credentials, provider))
    }

    /// Assemble state from explicit components
    pub fn with_components(
        sqlite: Arc<SqliteDb>,
        credentials: Arc<dyn CredentialStore>,
        provider: Arc<dyn MetricsProvider>,
    ) -> Self {
        let (alerts, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);

        Self {
            sqlite,
            credentials,
            provider,
            lookup_locks: DashMap::new(),
            alerts,
        }
    }

    /// Subscribe to storage alerts
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<StorageAlert> {
        self.alerts.subscribe()
    }

    /// Publish a storage alert; dropped silently when nobody listens
    pub fn alert(&self, title: &str, message: impl Into<String>) {
        let _ = self.alerts.send(StorageAlert {
            title: title.to_string(),
            message: message.into(),
        });
    }

    /// Join the lookups of a ticker; the map entry goes away with the last slot
    pub fn lookup_slot(&self, ticker: &str) -> LookupSlot<'_> {
        let lock = self
            .lookup_locks
            .entry(ticker.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        LookupSlot {
            state: self,
            ticker: ticker.to_string(),
            lock,
        }
    }
}

/// A caller's share of a ticker's lookup lock
pub struct LookupSlot<'a> {
    state: &'a AppState,
    ticker: String,
    lock: Arc<Mutex<()>>,
}

impl LookupSlot<'_> {
    /// Wait until no other lookup of this ticker is running
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for LookupSlot<'_> {
    fn drop(&mut self) {
        // One reference is the map's own, one is this slot's
        self.state
            .lookup_locks
            .remove_if(&self.ticker, |_, lock| Arc::strong_count(lock) <= 2);
    }
}
