//! Command line interface
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lookup` | Show metrics for one or more tickers |
//! | `forget` | Drop a ticker from the local cache |
//! | `key` | Verify, store, inspect or delete the API key |
//! | `settings` | Show or change refresh and provider settings |

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "quickstock",
    version,
    about = "Stock valuation metrics at a glance, cached for a day"
)]
pub struct Cli {
    /// Directory holding the database, API key and encryption key
    #[arg(long, global = true, env = "QUICKSTOCK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show metrics for one or more tickers
    Lookup {
        #[arg(required = true)]
        tickers: Vec<String>,
    },

    /// Drop a ticker from the local cache so the next lookup refetches it
    Forget { ticker: String },

    /// Manage the Financial Modeling Prep API key
    #[command(subcommand)]
    Key(KeyCommand),

    /// Show or change settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Verify the key with the provider and store it if accepted
    Set { api_key: String },
    /// Show whether a key is stored
    Status,
    /// Delete the stored key
    Delete,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    Set(SettingsArgs),
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Hours before a cached ticker is refetched
    #[arg(long)]
    pub refresh_hours: Option<i64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<i64>,

    /// Provider base URL
    #[arg(long)]
    pub base_url: Option<String>,
}
