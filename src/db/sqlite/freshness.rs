//! Last successful fetch time per ticker

use crate::db::sqlite::models::normalize_ticker;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Get the last successful fetch time for a ticker
pub fn get_last_fetch(conn: &Connection, ticker: &str) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT fetched_at FROM metrics_freshness WHERE ticker = ?",
            [normalize_ticker(ticker)],
            |row| row.get(0),
        )
        .optional()?;

    raw.map(|value| {
        DateTime::parse_from_rfc3339(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AppError::Internal(format!("Invalid fetch timestamp '{}': {}", value, e)))
    })
    .transpose()
}

/// Record a successful fetch for a ticker
pub fn set_last_fetch(conn: &Connection, ticker: &str, fetched_at: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO metrics_freshness (ticker, fetched_at) VALUES (?1, ?2)
         ON CONFLICT(ticker) DO UPDATE SET fetched_at = excluded.fetched_at",
        params![normalize_ticker(ticker), fetched_at.to_rfc3339()],
    )?;
    Ok(())
}

/// Forget the fetch time for a ticker
pub fn clear_last_fetch(conn: &Connection, ticker: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM metrics_freshness WHERE ticker = ?",
        [normalize_ticker(ticker)],
    )?;
    Ok(())
}
