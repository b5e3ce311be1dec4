//! Application error types

use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap a reqwest error with the request URL removed.
    ///
    /// Request URLs carry the API key as a query parameter.
    pub fn http(err: reqwest::Error) -> Self {
        AppError::Http(err.without_url())
    }
}

/// Outcome of a metrics lookup that did not produce a record.
///
/// These are the only failures that cross the retrieval boundary; every
/// network, parsing and validation failure collapses into `NotFound`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    #[error("Ticker not found")]
    NotFound,

    #[error("This ticker requires a premium API plan")]
    PremiumOnly,

    #[error("API key is missing")]
    MissingApiKey,
}

impl LookupError {
    /// Stable code for display layers
    pub fn code(&self) -> &'static str {
        match self {
            LookupError::NotFound => "NOT_FOUND",
            LookupError::PremiumOnly => "PREMIUM_ONLY",
            LookupError::MissingApiKey => "MISSING_API_KEY",
        }
    }
}

/// Serializable error response for the presentation layer
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        let (code, message) = match &err {
            AppError::Database(_) => ("DATABASE_ERROR", err.to_string()),
            AppError::Serialization(_) => ("SERIALIZATION_ERROR", err.to_string()),
            AppError::Http(_) => ("HTTP_ERROR", err.to_string()),
            AppError::Encryption(_) => ("ENCRYPTION_ERROR", err.to_string()),
            AppError::Provider(_) => ("PROVIDER_ERROR", err.to_string()),
            AppError::Validation(_) => ("VALIDATION_ERROR", err.to_string()),
            AppError::Config(_) => ("CONFIG_ERROR", err.to_string()),
            AppError::Io(_) => ("IO_ERROR", err.to_string()),
            AppError::Internal(_) => ("INTERNAL_ERROR", err.to_string()),
        };

        ErrorResponse {
            code: code.to_string(),
            message,
        }
    }
}

impl From<LookupError> for ErrorResponse {
    fn from(err: LookupError) -> Self {
        ErrorResponse {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
