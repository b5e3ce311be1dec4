use anyhow::{bail, Context, Result};
use clap::Parser;
use quickstock::error::ErrorResponse;
use quickstock::{ApiKeyService, AppState, LookupError, MetricsService};
use serde_json::json;
use std::path::PathBuf;

mod cli;

use cli::{Command, KeyCommand, SettingsCommand};

const SECONDS_PER_HOUR: i64 = 60 * 60;

fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .context("Cannot determine the home directory, pass --data-dir")?;

    Ok(PathBuf::from(home).join("Documents").join("QuickStock"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Message shown to the user for a failed lookup
fn lookup_message(ticker: &str, err: LookupError) -> String {
    match err {
        LookupError::NotFound => format!("Ticker '{}' not found.", ticker.trim()),
        other => format!("{}.", other),
    }
}

async fn lookup(state: &AppState, tickers: &[String]) -> Result<()> {
    let mut failures = 0;

    for ticker in tickers {
        match MetricsService::fetch_metrics(state, ticker).await {
            Ok(record) => print_json(&record)?,
            Err(err) => {
                failures += 1;
                let mut response = ErrorResponse::from(err);
                response.message = lookup_message(ticker, err);
                print_json(&json!({ "ticker": ticker.trim(), "error": response }))?;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} lookups failed", failures, tickers.len());
    }
    Ok(())
}

async fn run(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Lookup { tickers } => lookup(state, &tickers).await?,

        Command::Forget { ticker } => {
            let existed = MetricsService::forget(state, &ticker)?;
            print_json(&json!({ "ticker": ticker.trim().to_uppercase(), "removed": existed }))?;
        }

        Command::Key(KeyCommand::Set { api_key }) => {
            let check = ApiKeyService::verify_and_save(state, &api_key).await?;
            print_json(&check)?;
            if !check.valid {
                bail!("API key was rejected");
            }
        }
        Command::Key(KeyCommand::Status) => print_json(&ApiKeyService::status(state))?,
        Command::Key(KeyCommand::Delete) => {
            ApiKeyService::delete(state)?;
            print_json(&ApiKeyService::status(state))?;
        }

        Command::Settings(SettingsCommand::Show) => print_json(&state.sqlite.get_settings()?)?,
        Command::Settings(SettingsCommand::Set(args)) => {
            let refresh_secs = args
                .refresh_hours
                .map(|hours| hours.saturating_mul(SECONDS_PER_HOUR));
            let settings =
                state
                    .sqlite
                    .update_settings(refresh_secs, args.timeout_secs, args.base_url)?;
            print_json(&settings)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    quickstock::init_tracing();

    let cli = cli::Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    let state = AppState::new(&data_dir).context("Failed to initialize QuickStock")?;
    let mut alerts = state.subscribe_alerts();

    let result = run(&state, cli.command).await;

    while let Ok(alert) = alerts.try_recv() {
        eprintln!("{}: {}", alert.title, alert.message);
    }

    result
}
