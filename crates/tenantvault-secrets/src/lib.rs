//! Encrypted credential storage for TenantVault.
//!
//! Values are encrypted with AES-256-GCM under a per-token key derived from
//! the deployment master key, then stored in SQLite keyed by
//! `(tenant_id, user_id, credential_id)`.

pub mod bundle;
pub mod crypto;
pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use bundle::CredentialBundle;
pub use crypto::EncryptionHelper;
pub use error::{Result, SecretError};
pub use store::{CredentialStore, SecretsService};
pub use types::{CredentialSecret, DecryptedSecret};
