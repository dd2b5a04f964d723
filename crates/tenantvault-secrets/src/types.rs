//! Core types for credential storage.
//!
//! [`CredentialSecret`] is the at-rest row; [`DecryptedSecret`] is the
//! in-memory plaintext handed back to callers.

use std::fmt;

use tenantvault_core::SecretString;

/// A stored credential row.
///
/// `secret` holds the ciphertext token produced by
/// [`EncryptionHelper`](crate::crypto::EncryptionHelper), never plaintext.
#[derive(Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CredentialSecret {
    /// Storage-assigned row id.
    pub id: i64,

    /// Owning tenant.
    pub tenant_id: String,

    /// Owning user within the tenant; `None` means tenant-shared.
    pub user_id: Option<String>,

    /// Caller-chosen logical name of the secret.
    pub credential_id: String,

    /// Encrypted value.
    pub secret: Vec<u8>,
}

impl fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSecret")
            .field("id", &self.id)
            .field("tenant_id", &self.tenant_id)
            .field("user_id", &self.user_id)
            .field("credential_id", &self.credential_id)
            .field("secret", &format_args!("<{} bytes>", self.secret.len()))
            .finish()
    }
}

/// A decrypted credential value held in memory.
///
/// Wraps `SecretString` so the plaintext is zeroed on drop. Debug and Display
/// both emit `[REDACTED]`.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptedSecret {
    inner: SecretString,
}

impl DecryptedSecret {
    /// Create a new decrypted secret from raw plaintext.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::new(value),
        }
    }

    /// Expose the plaintext value. Use sparingly.
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// `*` repeated once per character of the value.
    pub fn masked(&self) -> String {
        self.inner.masked()
    }
}

impl fmt::Debug for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<SecretString> for DecryptedSecret {
    fn from(inner: SecretString) -> Self {
        Self { inner }
    }
}

impl From<String> for DecryptedSecret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
