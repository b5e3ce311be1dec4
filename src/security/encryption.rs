//! AES-256-GCM sealing of short secrets
//!
//! Sealed strings have the form `nonce:ciphertext`, both standard base64,
//! and fit on a single line of a file.

use crate::error::{AppError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;

const NONCE_SIZE: usize = 12;
pub const KEY_SIZE: usize = 32;

const SEALED_SEPARATOR: char = ':';

/// Seals and opens secrets with one AES-256-GCM key
pub struct EncryptionManager {
    cipher: Aes256Gcm,
}

impl EncryptionManager {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != KEY_SIZE {
            return Err(AppError::Encryption(format!(
                "Master key must be {} bytes, got {}",
                KEY_SIZE,
                key.len()
            )));
        }

        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|e| AppError::Encryption(e.to_string()))?;

        Ok(Self { cipher })
    }

    /// Fresh random master key
    pub fn generate_key() -> Vec<u8> {
        let mut key = vec![0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt under a fresh nonce into `nonce:ciphertext`
    pub fn seal(&self, plaintext: &str) -> Result<String> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self.encrypt_bytes(&nonce, plaintext.as_bytes())?;

        Ok(format!(
            "{}{}{}",
            STANDARD.encode(nonce),
            SEALED_SEPARATOR,
            STANDARD.encode(ciphertext)
        ))
    }

    /// Decrypt a string produced by [`EncryptionManager::seal`]
    pub fn open(&self, sealed: &str) -> Result<String> {
        let (nonce, ciphertext) = sealed
            .trim()
            .split_once(SEALED_SEPARATOR)
            .ok_or_else(|| AppError::Encryption("Sealed secret has no nonce".to_string()))?;

        let nonce = decode_part("nonce", nonce)?;
        if nonce.len() != NONCE_SIZE {
            return Err(AppError::Encryption(format!(
                "Nonce must be {} bytes, got {}",
                NONCE_SIZE,
                nonce.len()
            )));
        }
        let ciphertext = decode_part("ciphertext", ciphertext)?;

        let plaintext = self.decrypt_bytes(&nonce, &ciphertext)?;
        String::from_utf8(plaintext)
            .map_err(|e| AppError::Encryption(format!("Secret is not UTF-8: {}", e)))
    }

    fn encrypt_bytes(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| AppError::Encryption(e.to_string()))
    }

    fn decrypt_bytes(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| AppError::Encryption(format!("Decryption failed: {}", e)))
    }
}

fn decode_part(what: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| AppError::Encryption(format!("Invalid {} base64: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> EncryptionManager {
        EncryptionManager::new(&EncryptionManager::generate_key()).unwrap()
    }

    #[test]
    fn test_seal_open() {
        let manager = manager();

        let sealed = manager.seal("fmp-api-key-123").unwrap();
        assert!(sealed.contains(':'));
        assert!(!sealed.contains("fmp-api-key-123"));
        assert_eq!(manager.open(&sealed).unwrap(), "fmp-api-key-123");
    }

    #[test]
    fn test_same_secret_seals_differently() {
        let manager = manager();

        let first = manager.seal("Same text").unwrap();
        let second = manager.seal("Same text").unwrap();

        assert_ne!(first, second);
        assert_eq!(manager.open(&first).unwrap(), manager.open(&second).unwrap());
    }

    #[test]
    fn test_open_rejects_foreign_or_malformed_input() {
        let owner = manager();
        let sealed = owner.seal("abc123").unwrap();

        assert!(manager().open(&sealed).is_err());
        assert!(owner.open("garbage").is_err());
        assert!(owner.open("AAAA:AAAA").is_err());
    }

    #[test]
    fn test_rejects_short_key() {
        assert!(EncryptionManager::new(&[0u8; 16]).is_err());
    }
}
