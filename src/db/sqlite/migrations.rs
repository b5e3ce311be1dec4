//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_stock_metrics", CREATE_STOCK_METRICS_TABLE)?;
    run_migration(conn, "002_metrics_freshness", CREATE_METRICS_FRESHNESS_TABLE)?;
    run_migration(conn, "003_settings", CREATE_SETTINGS_TABLE)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    // Check if migration already applied
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_STOCK_METRICS_TABLE: &str = r#"
CREATE TABLE stock_metrics (
    ticker TEXT PRIMARY KEY,
    pe_ratio_ttm REAL,
    roe_ttm REAL,
    roic_ttm REAL,
    price_to_sales_ratio_ttm REAL,
    return_on_tangible_assets_ttm REAL,
    net_profit_margin_ttm REAL,
    debt_to_equity_ttm REAL,
    current_ratio_ttm REAL,
    free_cash_flow_per_share_ttm REAL,
    net_income_per_share_ttm REAL,
    market_cap_ttm REAL,
    dividend_yield_ttm REAL,
    book_value_per_share_ttm REAL,
    ebit_margin_ttm REAL,
    is_premium_restricted INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_METRICS_FRESHNESS_TABLE: &str = r#"
CREATE TABLE metrics_freshness (
    ticker TEXT PRIMARY KEY,
    fetched_at TEXT NOT NULL
);
"#;

const CREATE_SETTINGS_TABLE: &str = r#"
CREATE TABLE settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    refresh_interval_secs INTEGER NOT NULL DEFAULT 86400,
    request_timeout_secs INTEGER NOT NULL DEFAULT 20,
    api_base_url TEXT NOT NULL DEFAULT 'https://financialmodelingprep.com',
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
INSERT INTO settings (id) VALUES (1);
"#;
