//! QuickStock - stock valuation metrics at a glance
//!
//! Looks up a ticker, fetches trailing-twelve-month valuation and
//! profitability metrics from Financial Modeling Prep, and caches them
//! locally for a day.

pub mod db;
pub mod error;
pub mod provider;
pub mod security;
pub mod services;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use db::sqlite::models::MetricsRecord;
pub use error::{AppError, LookupError};
pub use services::{ApiKeyService, MetricsService};
pub use state::AppState;

/// Initialize tracing/logging; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickstock=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
