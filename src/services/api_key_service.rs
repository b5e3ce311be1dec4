//! API Key Service
//!
//! Verifies the provider API key before it is stored.

use crate::error::{AppError, Result};
use crate::provider::types::ApiKeyCheck;
use crate::state::AppState;
use serde::Serialize;
use tracing::{info, warn};

/// Whether an API key is configured, with a masked preview
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyStatus {
    pub configured: bool,
    pub key_masked: Option<String>,
}

pub struct ApiKeyService;

impl ApiKeyService {
    /// Verify a key with the provider, then store it or discard the stored one.
    ///
    /// Transport failures are returned as errors and leave the stored key alone.
    pub async fn verify_and_save(state: &AppState, api_key: &str) -> Result<ApiKeyCheck> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(AppError::Validation("API key cannot be empty".to_string()));
        }

        let check = state.provider.verify_api_key(api_key).await?;

        if check.valid {
            state.credentials.save(api_key)?;
            info!("API key verified with {}", state.provider.name());
        } else {
            state.credentials.delete()?;
            warn!("API key rejected: {}", check.message);
        }

        Ok(check)
    }

    pub fn status(state: &AppState) -> ApiKeyStatus {
        let key = state.credentials.load();

        ApiKeyStatus {
            configured: key.is_some(),
            key_masked: key.as_deref().map(mask_api_key),
        }
    }

    pub fn delete(state: &AppState) -> Result<()> {
        state.credentials.delete()
    }
}

fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
