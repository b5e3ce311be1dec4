//! API credential storage

use crate::error::{AppError, Result};
use crate::security::SecurityManager;
use parking_lot::RwLock;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

const CREDENTIAL_FILE: &str = "ApiKey.data";

/// Source of the provider API key
pub trait CredentialStore: Send + Sync {
    /// Load the stored credential, `None` when absent or unreadable
    fn load(&self) -> Option<String>;

    /// Store a credential, replacing any previous one
    fn save(&self, credential: &str) -> Result<()>;

    /// Remove the stored credential
    fn delete(&self) -> Result<()>;
}

fn validate_credential(credential: &str) -> Result<&str> {
    let trimmed = credential.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("API key cannot be empty".to_string()));
    }
    Ok(trimmed)
}

/// Credential encrypted with AES-256-GCM in a file under the data directory
pub struct FileCredentialStore {
    path: PathBuf,
    security: SecurityManager,
}

impl FileCredentialStore {
    pub fn new(data_dir: PathBuf, security: SecurityManager) -> Self {
        Self {
            path: data_dir.join(CREDENTIAL_FILE),
            security,
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<String> {
        let sealed = match fs::read_to_string(&self.path) {
            Ok(sealed) => sealed,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::debug!("Failed to read API key file: {}", e);
                return None;
            }
        };

        match self.security.open(&sealed) {
            Ok(credential) => Some(credential),
            Err(e) => {
                tracing::debug!("Failed to decrypt API key: {}", e);
                None
            }
        }
    }

    fn save(&self, credential: &str) -> Result<()> {
        let credential = validate_credential(credential)?;
        let sealed = self.security.seal(credential)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, sealed)?;

        tracing::info!("API key saved");
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("API key deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local credential store
#[derive(Default)]
pub struct InMemoryCredentialStore {
    credential: RwLock<Option<String>>,
}

impl InMemoryCredentialStore {
    pub fn new(credential: Option<&str>) -> Self {
        Self {
            credential: RwLock::new(credential.map(str::to_string)),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Option<String> {
        self.credential.read().clone()
    }

    fn save(&self, credential: &str) -> Result<()> {
        let credential = validate_credential(credential)?;
        *self.credential.write() = Some(credential.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self.credential.write() = None;
        Ok(())
    }
}
