//! Settings management

use crate::db::sqlite::models::Settings;
use crate::error::{AppError, Result};
use rusqlite::Connection;

const MIN_REFRESH_INTERVAL_SECS: i64 = 60;
const MAX_REFRESH_INTERVAL_SECS: i64 = 10 * 365 * 24 * 60 * 60;
const MAX_REQUEST_TIMEOUT_SECS: i64 = 120;

/// Get settings
pub fn get_settings(conn: &Connection) -> Result<Settings> {
    let settings = conn.query_row(
        "SELECT refresh_interval_secs, request_timeout_secs, api_base_url, updated_at
         FROM settings WHERE id = 1",
        [],
        |row| {
            Ok(Settings {
                refresh_interval_secs: row.get(0)?,
                request_timeout_secs: row.get(1)?,
                api_base_url: row.get(2)?,
                updated_at: row.get(3)?,
            })
        },
    )?;

    Ok(settings)
}

/// Update settings
pub fn update_settings(
    conn: &Connection,
    refresh_interval_secs: Option<i64>,
    request_timeout_secs: Option<i64>,
    api_base_url: Option<String>,
) -> Result<Settings> {
    let mut updates = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(r) = refresh_interval_secs {
        if !(MIN_REFRESH_INTERVAL_SECS..=MAX_REFRESH_INTERVAL_SECS).contains(&r) {
            return Err(AppError::Validation(format!(
                "Refresh interval must be between {} and {} seconds",
                MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS
            )));
        }
        updates.push("refresh_interval_secs = ?");
        params.push(Box::new(r));
    }
    if let Some(t) = request_timeout_secs {
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&t) {
            return Err(AppError::Validation(format!(
                "Request timeout must be between 1 and {} seconds",
                MAX_REQUEST_TIMEOUT_SECS
            )));
        }
        updates.push("request_timeout_secs = ?");
        params.push(Box::new(t));
    }
    if let Some(u) = api_base_url {
        let parsed = url::Url::parse(&u)
            .map_err(|e| AppError::Validation(format!("Invalid API base URL: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AppError::Validation(
                "API base URL must use http or https".to_string(),
            ));
        }
        updates.push("api_base_url = ?");
        params.push(Box::new(u));
    }

    if !updates.is_empty() {
        updates.push("updated_at = datetime('now')");

        let sql = format!("UPDATE settings SET {} WHERE id = 1", updates.join(", "));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;
    }

    get_settings(conn)
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

    #[test]
    fn test_default_settings() {
        let conn = create_test_db();
        let settings = get_settings(&conn).unwrap();

        assert_eq!(settings.refresh_interval_secs, 86_400);
        assert_eq!(settings.request_timeout_secs, 20);
        assert_eq!(settings.api_base_url, "https://financialmodelingprep.com");
    }

    #[test]
    fn test_partial_update() {
        let conn = create_test_db();
        let settings = update_settings(&conn, Some(3_600), None, None).unwrap();

        assert_eq!(settings.refresh_interval_secs, 3_600);
        assert_eq!(settings.request_timeout_secs, 20);
    }

    #[test]
    fn test_update_rejects_invalid_values() {
        let conn = create_test_db();

        assert!(update_settings(&conn, Some(10), None, None).is_err());
        assert!(update_settings(&conn, Some(i64::MAX), None, None).is_err());
        assert!(update_settings(&conn, Some(MAX_REFRESH_INTERVAL_SECS + 1), None, None).is_err());
        assert!(update_settings(&conn, None, Some(0), None).is_err());
        assert!(update_settings(&conn, None, None, Some("ftp://example.com".into())).is_err());
        assert!(update_settings(&conn, None, None, Some("not a url".into())).is_err());

        // Nothing was written
        let settings = get_settings(&conn).unwrap();
        assert_eq!(settings.refresh_interval_secs, 86_400);
    }
}
