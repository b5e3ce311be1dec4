//! SQLite database module

pub mod models;
mod migrations;
mod metrics;
mod freshness;
mod settings;

use crate::error::Result;
use chrono::{DateTime, Utc};
use models::*;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Create new SQLite database connection
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::from_connection(conn)
    }

    /// Create a database that lives only in memory
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };

        // Run migrations
        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Metrics Cache Methods ==========

    /// Insert or replace the cached metrics for a ticker
    pub fn put_metrics(&self, ticker: &str, record: &MetricsRecord) -> Result<()> {
        let conn = self.conn.lock();
        metrics::put_metrics(&conn, ticker, record)
    }

    /// Get the cached metrics for a ticker
    pub fn get_metrics(&self, ticker: &str) -> Result<Option<MetricsRecord>> {
        let conn = self.conn.lock();
        metrics::get_metrics(&conn, ticker)
    }

    /// Delete the cached metrics for a ticker
    pub fn delete_metrics(&self, ticker: &str) -> Result<bool> {
        let conn = self.conn.lock();
        metrics::delete_metrics(&conn, ticker)
    }

    // ========== Freshness Methods ==========

    /// Get the last successful fetch time for a ticker
    pub fn get_last_fetch(&self, ticker: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn.lock();
        freshness::get_last_fetch(&conn, ticker)
    }

    /// Record a successful fetch for a ticker
    pub fn set_last_fetch(&self, ticker: &str, fetched_at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock();
        freshness::set_last_fetch(&conn, ticker, fetched_at)
    }

    /// Forget the fetch time for a ticker
    pub fn clear_last_fetch(&self, ticker: &str) -> Result<()> {
        let conn = self.conn.lock();
        freshness::clear_last_fetch(&conn, ticker)
    }

    // ========== Settings Methods ==========

    /// Get settings
    pub fn get_settings(&self) -> Result<Settings> {
        let conn = self.conn.lock();
        settings::get_settings(&conn)
    }

    /// Update settings
    pub fn update_settings(
        &self,
        refresh_interval_secs: Option<i64>,
        request_timeout_secs: Option<i64>,
        api_base_url: Option<String>,
    ) -> Result<Settings> {
        let conn = self.conn.lock();
        settings::update_settings(&conn, refresh_interval_secs, request_timeout_secs, api_base_url)
    }

    /// Run raw SQL, used by tests to break the schema on purpose
    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(sql)?;
        Ok(())
    }
}
