//! Authenticated encryption of credential values.
//!
//! AES-256-GCM with a per-token key derived from the master key via
//! HKDF-SHA256. Tokens are self-contained:
//!
//! ```text
//! version (1) || salt (32) || nonce (12) || ciphertext || tag (16)
//! ```
//!
//! The version byte and salt are bound as associated data, so any change to
//! the token fails authentication.

use std::fmt;

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use tenantvault_core::config::CredentialsConfig;
use zeroize::Zeroizing;

use crate::error::{Result, SecretError};

const TOKEN_VERSION: u8 = 1;
const NONCE_SIZE: usize = 12;
const SALT_SIZE: usize = 32;
const TAG_SIZE: usize = 16;
const HEADER_SIZE: usize = 1 + SALT_SIZE + NONCE_SIZE;

/// Length of the raw master key in bytes.
pub const KEY_SIZE: usize = 32;

/// HKDF info string used to domain-separate derived keys.
const HKDF_INFO: &[u8] = b"tenantvault-credential-v1";

/// Symmetric authenticated encryption keyed by the deployment master key.
pub struct EncryptionHelper {
    master_key: Zeroizing<Vec<u8>>,
}

impl EncryptionHelper {
    /// Create a helper from raw key bytes. The key must be exactly 32 bytes.
    pub fn new(master_key: &[u8]) -> Result<Self> {
        if master_key.len() != KEY_SIZE {
            return Err(SecretError::InvalidMasterKey(format!(
                "expected {KEY_SIZE} bytes, got {}",
                master_key.len()
            )));
        }
        Ok(Self {
            master_key: Zeroizing::new(master_key.to_vec()),
        })
    }

    /// Create a helper from a base64url-encoded key (padded or unpadded).
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim();
        let key = URL_SAFE
            .decode(encoded)
            .or_else(|_| URL_SAFE_NO_PAD.decode(encoded))
            .map_err(|e| SecretError::InvalidMasterKey(format!("not base64url: {e}")))?;
        let key = Zeroizing::new(key);
        Self::new(&key)
    }

    /// Create a helper from the `credentials` config section.
    ///
    /// A missing master key is fatal: the store cannot run without one.
    pub fn from_config(config: &CredentialsConfig) -> Result<Self> {
        let key = config
            .master_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or(SecretError::MissingMasterKey)?;
        Self::from_encoded(key.expose_secret())
    }

    /// Generate a new master key, base64url-encoded for configuration.
    pub fn generate_key() -> String {
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        rand::thread_rng().fill_bytes(&mut key[..]);
        URL_SAFE.encode(&key[..])
    }

    /// Encrypt `plaintext` into a self-contained token.
    ///
    /// Salt and nonce are random, so equal plaintexts give unequal tokens.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut token = Vec::with_capacity(HEADER_SIZE + plaintext.len() + TAG_SIZE);
        token.push(TOKEN_VERSION);

        let mut salt = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut salt);
        token.extend_from_slice(&salt);

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        token.extend_from_slice(&nonce_bytes);

        let cipher = self.cipher(&salt).map_err(SecretError::EncryptionFailed)?;
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext,
                    aad: &token[..1 + SALT_SIZE],
                },
            )
            .map_err(|e| SecretError::EncryptionFailed(e.to_string()))?;

        token.extend_from_slice(&ciphertext);
        Ok(token)
    }

    /// Decrypt a token produced by [`EncryptionHelper::encrypt`].
    ///
    /// Fails on truncated tokens, unknown versions, the wrong key, or any
    /// modified byte.
    pub fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>> {
        if token.len() < HEADER_SIZE + TAG_SIZE {
            return Err(SecretError::DecryptionFailed("token too short".to_string()));
        }
        if token[0] != TOKEN_VERSION {
            return Err(SecretError::DecryptionFailed(format!(
                "unsupported token version {}",
                token[0]
            )));
        }

        let (aad, rest) = token.split_at(1 + SALT_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let cipher = self.cipher(&aad[1..]).map_err(SecretError::DecryptionFailed)?;
        cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| {
                SecretError::DecryptionFailed("invalid token or wrong master key".to_string())
            })
    }

    fn cipher(&self, salt: &[u8]) -> std::result::Result<Aes256Gcm, String> {
        let hk = Hkdf::<Sha256>::new(Some(salt), &self.master_key);
        let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
        hk.expand(HKDF_INFO, &mut okm[..])
            .map_err(|e| format!("key derivation failed: {e}"))?;
        Aes256Gcm::new_from_slice(&okm[..]).map_err(|e| e.to_string())
    }
}

impl fmt::Debug for EncryptionHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionHelper")
            .field("master_key", &"[REDACTED]")
            .finish()
    }
}
