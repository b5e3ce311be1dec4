//! Cached stock metrics, one row per ticker

use crate::db::sqlite::models::{normalize_ticker, MetricsRecord};
use crate::error::Result;
use crate::provider::types::TtmMetrics;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Insert or fully replace the cached record for a ticker
pub fn put_metrics(conn: &Connection, ticker: &str, record: &MetricsRecord) -> Result<()> {
    let ticker = normalize_ticker(ticker);
    let m = &record.metrics;

    conn.execute(
        "INSERT INTO stock_metrics (
            ticker, pe_ratio_ttm, roe_ttm, roic_ttm, price_to_sales_ratio_ttm,
            return_on_tangible_assets_ttm, net_profit_margin_ttm, debt_to_equity_ttm,
            current_ratio_ttm, free_cash_flow_per_share_ttm, net_income_per_share_ttm,
            market_cap_ttm, dividend_yield_ttm, book_value_per_share_ttm, ebit_margin_ttm,
            is_premium_restricted
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
         ON CONFLICT(ticker) DO UPDATE SET
           pe_ratio_ttm = excluded.pe_ratio_ttm,
           roe_ttm = excluded.roe_ttm,
           roic_ttm = excluded.roic_ttm,
           price_to_sales_ratio_ttm = excluded.price_to_sales_ratio_ttm,
           return_on_tangible_assets_ttm = excluded.return_on_tangible_assets_ttm,
           net_profit_margin_ttm = excluded.net_profit_margin_ttm,
           debt_to_equity_ttm = excluded.debt_to_equity_ttm,
           current_ratio_ttm = excluded.current_ratio_ttm,
           free_cash_flow_per_share_ttm = excluded.free_cash_flow_per_share_ttm,
           net_income_per_share_ttm = excluded.net_income_per_share_ttm,
           market_cap_ttm = excluded.market_cap_ttm,
           dividend_yield_ttm = excluded.dividend_yield_ttm,
           book_value_per_share_ttm = excluded.book_value_per_share_ttm,
           ebit_margin_ttm = excluded.ebit_margin_ttm,
           is_premium_restricted = excluded.is_premium_restricted,
           updated_at = datetime('now')",
        params![
            ticker,
            m.pe_ratio,
            m.roe,
            m.roic,
            m.price_to_sales_ratio,
            m.return_on_tangible_assets,
            m.net_profit_margin,
            m.debt_to_equity,
            m.current_ratio,
            m.free_cash_flow_per_share,
            m.net_income_per_share,
            m.market_cap,
            m.dividend_yield,
            m.book_value_per_share,
            m.ebit_margin,
            record.is_premium_restricted as i32,
        ],
    )?;

    Ok(())
}

/// Get the cached record for a ticker
pub fn get_metrics(conn: &Connection, ticker: &str) -> Result<Option<MetricsRecord>> {
    let record = conn
        .query_row(
            "SELECT ticker, pe_ratio_ttm, roe_ttm, roic_ttm, price_to_sales_ratio_ttm,
                    return_on_tangible_assets_ttm, net_profit_margin_ttm, debt_to_equity_ttm,
                    current_ratio_ttm, free_cash_flow_per_share_ttm, net_income_per_share_ttm,
                    market_cap_ttm, dividend_yield_ttm, book_value_per_share_ttm, ebit_margin_ttm,
                    is_premium_restricted
             FROM stock_metrics WHERE ticker = ?",
            [normalize_ticker(ticker)],
            row_to_record,
        )
        .optional()?;

    Ok(record)
}

/// Delete the cached record for a ticker, returns whether a row existed
pub fn delete_metrics(conn: &Connection, ticker: &str) -> Result<bool> {
    let rows = conn.execute(
        "DELETE FROM stock_metrics WHERE ticker = ?",
        [normalize_ticker(ticker)],
    )?;
    Ok(rows > 0)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<MetricsRecord> {
    Ok(MetricsRecord {
        ticker: row.get(0)?,
        metrics: TtmMetrics {
            pe_ratio: row.get(1)?,
            roe: row.get(2)?,
            roic: row.get(3)?,
            price_to_sales_ratio: row.get(4)?,
            return_on_tangible_assets: row.get(5)?,
            net_profit_margin: row.get(6)?,
            debt_to_equity: row.get(7)?,
            current_ratio: row.get(8)?,
            free_cash_flow_per_share: row.get(9)?,
            net_income_per_share: row.get(10)?,
            market_cap: row.get(11)?,
            dividend_yield: row.get(12)?,
            book_value_per_share: row.get(13)?,
            ebit_margin: row.get(14)?,
        },
        is_premium_restricted: row.get::<_, i32>(15)? == 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::migrations;

    fn create_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn sample_record(ticker: &str) -> MetricsRecord {
        MetricsRecord::new(
            ticker,
            TtmMetrics {
                pe_ratio: Some(28.5),
                roe: Some(1.47),
                market_cap: Some(3.4e12),
                net_profit_margin: Some(0.25),
                ebit_margin: Some(0.30),
                dividend_yield: Some(0.0),
                ..Default::default()
            },
            false,
        )
    }

    #[test]
    fn test_round_trip_keeps_nulls() {
        let conn = create_test_db();
        let record = sample_record("AAPL");

        put_metrics(&conn, "AAPL", &record).unwrap();
        let loaded = get_metrics(&conn, "AAPL").unwrap().unwrap();

        assert_eq!(loaded, record);
        assert_eq!(loaded.metrics.roic, None);
        assert_eq!(loaded.metrics.dividend_yield, Some(0.0));
    }

    #[test]
    fn test_get_missing_is_none() {
        let conn = create_test_db();
        assert!(get_metrics(&conn, "MSFT").unwrap().is_none());
    }

    #[test]
    fn test_put_replaces_entire_record() {
        let conn = create_test_db();
        put_metrics(&conn, "AAPL", &sample_record("AAPL")).unwrap();

        let replacement = MetricsRecord::new(
            "AAPL",
            TtmMetrics {
                market_cap: Some(3.5e12),
                ..Default::default()
            },
            true,
        );
        put_metrics(&conn, "AAPL", &replacement).unwrap();

        let loaded = get_metrics(&conn, "AAPL").unwrap().unwrap();
        assert_eq!(loaded, replacement);
        assert_eq!(loaded.metrics.pe_ratio, None);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM stock_metrics", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_ticker_is_normalized() {
        let conn = create_test_db();
        put_metrics(&conn, " aapl ", &sample_record("aapl")).unwrap();

        let loaded = get_metrics(&conn, "AAPL").unwrap().unwrap();
        assert_eq!(loaded.ticker, "AAPL");
    }

    #[test]
    fn test_delete() {
        let conn = create_test_db();
        put_metrics(&conn, "AAPL", &sample_record("AAPL")).unwrap();

        assert!(delete_metrics(&conn, "AAPL").unwrap());
        assert!(get_metrics(&conn, "AAPL").unwrap().is_none());

        // Deleting again is a no-op
        assert!(!delete_metrics(&conn, "AAPL").unwrap());
    }
}
