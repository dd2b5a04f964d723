//! Error types for credential storage.

use tenantvault_core::error::ConfigError;
use thiserror::Error;

/// Errors that can occur during credential operations.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("CREDENTIALS_MASTER_KEY is not set")]
    MissingMasterKey,

    #[error("Invalid master key: {0}")]
    InvalidMasterKey(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SecretError {
    /// Whether the error is a startup configuration problem rather than a
    /// per-request failure.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            SecretError::MissingMasterKey | SecretError::InvalidMasterKey(_) | SecretError::Config(_)
        )
    }
}

/// Convenience result alias for credential operations.
pub type Result<T> = std::result::Result<T, SecretError>;
