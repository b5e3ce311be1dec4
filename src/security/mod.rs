//! Security module for credential encryption and file-based storage
//!
//! Uses file-based storage instead of OS keychain to avoid password prompts.

mod file_storage;
mod encryption;
mod credential_store;

use crate::error::Result;
use std::path::PathBuf;

pub use credential_store::{CredentialStore, FileCredentialStore, InMemoryCredentialStore};
pub use encryption::EncryptionManager;

/// Security manager wrapping the app's encryption key
pub struct SecurityManager {
    encryption: encryption::EncryptionManager,
}

impl SecurityManager {
    /// Create new security manager with file-based key storage
    pub fn new(config_dir: PathBuf) -> Result<Self> {
        let storage = file_storage::FileStorage::new(config_dir);
        let master_key = storage.get_or_create_master_key()?;

        Ok(Self {
            encryption: encryption::EncryptionManager::new(&master_key)?,
        })
    }

    /// Create a security manager with a throwaway key
    #[cfg(test)]
    pub fn new_for_testing() -> Result<Self> {
        let master_key = encryption::EncryptionManager::generate_key();

        Ok(Self {
            encryption: encryption::EncryptionManager::new(&master_key)?,
        })
    }

    /// Encrypt data into a single storable string
    pub fn seal(&self, plaintext: &str) -> Result<String> {
        self.encryption.seal(plaintext)
    }

    /// Decrypt a string produced by [`SecurityManager::seal`]
    pub fn open(&self, sealed: &str) -> Result<String> {
        self.encryption.open(sealed)
    }
}
