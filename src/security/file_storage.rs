//! File-based storage for the master encryption key
//!
//! The key is kept next to the encrypted credential with basic obfuscation,
//! so the app never prompts for an OS keychain password.

use crate::error::{AppError, Result};
use crate::security::encryption::{EncryptionManager, KEY_SIZE};
use base64::Engine;
use std::fs;
use std::path::PathBuf;

const SECRETS_FILE: &str = "secrets.dat";

/// File-based storage for app secrets
pub struct FileStorage {
    config_dir: PathBuf,
}

impl FileStorage {
    pub fn new(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get or create the master key
    pub fn get_or_create_master_key(&self) -> Result<Vec<u8>> {
        let secrets_path = self.config_dir.join(SECRETS_FILE);

        if secrets_path.exists() {
            let data = fs::read(&secrets_path)
                .map_err(|e| AppError::Config(format!("Failed to read secrets: {}", e)))?;

            return self.decode_key(&data);
        }

        let master_key = EncryptionManager::generate_key();

        fs::create_dir_all(&self.config_dir)
            .map_err(|e| AppError::Config(format!("Failed to create config dir: {}", e)))?;

        fs::write(&secrets_path, self.encode_key(&master_key))
            .map_err(|e| AppError::Config(format!("Failed to write secrets: {}", e)))?;

        tracing::info!("Generated new master key in {:?}", secrets_path);
        Ok(master_key)
    }

    fn encode_key(&self, master_key: &[u8]) -> Vec<u8> {
        base64::engine::general_purpose::STANDARD
            .encode(Self::obfuscate(master_key))
            .into_bytes()
    }

    fn decode_key(&self, data: &[u8]) -> Result<Vec<u8>> {
        let data_str = std::str::from_utf8(data)
            .map_err(|e| AppError::Config(format!("Invalid secrets format: {}", e)))?;

        let obfuscated = base64::engine::general_purpose::STANDARD
            .decode(data_str.trim())
            .map_err(|e| AppError::Config(format!("Failed to decode master key: {}", e)))?;

        let master_key = Self::obfuscate(&obfuscated);
        if master_key.len() != KEY_SIZE {
            return Err(AppError::Config("Invalid master key length".to_string()));
        }

        Ok(master_key)
    }

    /// XOR with a fixed app-specific key; applying it twice restores the input
    fn obfuscate(bytes: &[u8]) -> Vec<u8> {
        const APP_KEY: &[u8] = b"QuickStock-Desktop-v1-Obfuscator";

        bytes
            .iter()
            .zip(APP_KEY.iter().cycle())
            .map(|(a, b)| a ^ b)
            .collect()
    }
}
