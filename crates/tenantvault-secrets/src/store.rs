//! Credential storage.
//!
//! Defines the [`CredentialStore`] trait and provides [`SecretsService`], a
//! SQLite-backed implementation that keeps one encrypted row per
//! `(tenant_id, user_id, credential_id)`.

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::SqlitePool;
use tenantvault_core::config::{Config, CREDENTIALS_SERVICE};
use tenantvault_core::SecretString;
use tracing::{debug, info};

use crate::crypto::EncryptionHelper;
use crate::db;
use crate::error::{Result, SecretError};
use crate::types::{CredentialSecret, DecryptedSecret};

/// Tenant/user-scoped encrypted key-value store.
///
/// Every operation is keyed by the exact scope; a value stored for one user
/// is invisible to another user or to the tenant-shared scope (`user_id =
/// None`), and vice versa.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Encrypt and store `secret`, replacing any existing value for the key.
    async fn set_credential(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        credential_id: &str,
        secret: &str,
    ) -> Result<CredentialSecret>;

    /// Look up and decrypt a value. `Ok(None)` when no row matches.
    async fn get_credential(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        credential_id: &str,
    ) -> Result<Option<DecryptedSecret>>;

    /// Delete a value. Deleting a missing key succeeds.
    async fn delete_credential(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        credential_id: &str,
    ) -> Result<()>;

    /// Delete several values of one scope in a single statement.
    async fn delete_credentials(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        credential_ids: &[&str],
    ) -> Result<()>;

    /// Credential ids in the scope, optionally restricted to a literal,
    /// case-sensitive prefix. Sorted ascending.
    async fn list_credential_ids(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<Vec<String>>;

    /// Like [`CredentialStore::list_credential_ids`], paired with decrypted
    /// values.
    async fn list_credentials_with_values(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<Vec<(String, DecryptedSecret)>>;
}

// Shared rows carry an empty `user_key`; it reads back as `user_id = None`.
const UPSERT: &str = r#"
    INSERT INTO credential_secrets (tenant_id, user_key, credential_id, secret)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT (tenant_id, user_key, credential_id)
    DO UPDATE SET secret = excluded.secret
    RETURNING id, tenant_id, NULLIF(user_key, '') AS user_id, credential_id, secret
"#;

const SELECT_ONE: &str = r#"
    SELECT secret FROM credential_secrets
    WHERE tenant_id = ?1 AND user_key = ?2 AND credential_id = ?3
"#;

const DELETE_ONE: &str = r#"
    DELETE FROM credential_secrets
    WHERE tenant_id = ?1 AND user_key = ?2 AND credential_id = ?3
"#;

/// Ids per `DELETE .. IN` statement.
const DELETE_BATCH_SIZE: usize = 900;

// Literal prefix comparison; `%` and `_` carry no pattern meaning here.
const LIST_IDS: &str = r#"
    SELECT credential_id FROM credential_secrets
    WHERE tenant_id = ?1 AND user_key = ?2
      AND (?3 IS NULL OR substr(credential_id, 1, length(?3)) = ?3)
    ORDER BY credential_id
"#;

const LIST_WITH_VALUES: &str = r#"
    SELECT credential_id, secret FROM credential_secrets
    WHERE tenant_id = ?1 AND user_key = ?2
      AND (?3 IS NULL OR substr(credential_id, 1, length(?3)) = ?3)
    ORDER BY credential_id
"#;

/// SQLite-backed [`CredentialStore`].
///
/// The pool handle is shared by all operations and replaced wholesale by
/// [`SecretsService::reconnect`].
pub struct SecretsService {
    pool: RwLock<SqlitePool>,
    encrypter: EncryptionHelper,
    database_url: String,
    pool_size: u32,
}

impl SecretsService {
    /// Connect to `database_url` and ensure the schema exists.
    pub async fn new(
        database_url: impl Into<String>,
        encrypter: EncryptionHelper,
        pool_size: u32,
    ) -> Result<Self> {
        let database_url = database_url.into();
        let pool = Self::open(&database_url, pool_size).await?;
        info!("credential store connected");
        Ok(Self {
            pool: RwLock::new(pool),
            encrypter,
            database_url,
            pool_size,
        })
    }

    /// Build the service from configuration.
    ///
    /// The master key is checked before any connection is attempted.
    pub async fn connect(config: &Config) -> Result<Self> {
        let encrypter = EncryptionHelper::from_config(&config.credentials)?;
        config.validate()?;
        let url = config.database_url(CREDENTIALS_SERVICE)?;
        Self::new(url, encrypter, config.credentials.pool_size).await
    }

    /// The connection string this service was opened with.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Drop the current pool and open a fresh one.
    ///
    /// Manual recovery for stale connections; never invoked automatically.
    pub async fn reconnect(&self) -> Result<()> {
        let fresh = Self::open(&self.database_url, self.pool_size).await?;
        let stale = std::mem::replace(&mut *self.pool.write(), fresh);
        stale.close().await;
        info!("credential store reconnected");
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool()).await?;
        Ok(())
    }

    async fn open(database_url: &str, pool_size: u32) -> Result<SqlitePool> {
        let pool = db::connect(database_url, pool_size).await?;
        db::migrate(&pool).await?;
        Ok(pool)
    }

    fn pool(&self) -> SqlitePool {
        self.pool.read().clone()
    }

    fn decrypt_value(&self, token: &[u8]) -> Result<DecryptedSecret> {
        let plaintext = self.encrypter.decrypt(token)?;
        let value = SecretString::from_utf8(plaintext)
            .map_err(|e| SecretError::DecryptionFailed(format!("invalid UTF-8: {e}")))?;
        Ok(value.into())
    }
}

/// Reject empty identifiers. No other format rules apply.
fn validate_scope(tenant_id: &str, user_id: Option<&str>) -> Result<()> {
    if tenant_id.is_empty() {
        return Err(SecretError::InvalidIdentifier(
            "tenant_id must not be empty".to_string(),
        ));
    }
    if user_id == Some("") {
        return Err(SecretError::InvalidIdentifier(
            "user_id must be absent or non-empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_key(tenant_id: &str, user_id: Option<&str>, credential_id: &str) -> Result<()> {
    validate_scope(tenant_id, user_id)?;
    if credential_id.is_empty() {
        return Err(SecretError::InvalidIdentifier(
            "credential_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl CredentialStore for SecretsService {
    async fn set_credential(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        credential_id: &str,
        secret: &str,
    ) -> Result<CredentialSecret> {
        validate_key(tenant_id, user_id, credential_id)?;
        let encrypted = self.encrypter.encrypt(secret.as_bytes())?;

        // Drain RETURNING and commit so other pooled connections see the row
        let pool = self.pool();
        let mut tx = pool.begin().await?;
        let row = sqlx::query_as::<_, CredentialSecret>(UPSERT)
            .bind(tenant_id)
            .bind(db::user_key(user_id))
            .bind(credential_id)
            .bind(encrypted)
            .fetch_all(&mut *tx)
            .await?
            .pop()
            .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;

        debug!(tenant_id, user_id, credential_id, id = row.id, "stored credential");
        Ok(row)
    }

    async fn get_credential(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        credential_id: &str,
    ) -> Result<Option<DecryptedSecret>> {
        validate_key(tenant_id, user_id, credential_id)?;

        let token: Option<Vec<u8>> = sqlx::query_scalar(SELECT_ONE)
            .bind(tenant_id)
            .bind(db::user_key(user_id))
            .bind(credential_id)
            .fetch_optional(&self.pool())
            .await?;

        match token {
            Some(token) => {
                debug!(tenant_id, user_id, credential_id, "read credential");
                self.decrypt_value(&token).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn delete_credential(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        credential_id: &str,
    ) -> Result<()> {
        validate_key(tenant_id, user_id, credential_id)?;

        let result = sqlx::query(DELETE_ONE)
            .bind(tenant_id)
            .bind(db::user_key(user_id))
            .bind(credential_id)
            .execute(&self.pool())
            .await?;

        debug!(
            tenant_id,
            user_id,
            credential_id,
            removed = result.rows_affected(),
            "deleted credential"
        );
        Ok(())
    }

    async fn delete_credentials(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        credential_ids: &[&str],
    ) -> Result<()> {
        validate_scope(tenant_id, user_id)?;
        if credential_ids.is_empty() {
            return Ok(());
        }
        if credential_ids.iter().any(|id| id.is_empty()) {
            return Err(SecretError::InvalidIdentifier(
                "credential_id must not be empty".to_string(),
            ));
        }

        // One transaction, batched below SQLite's bound parameter limit
        let pool = self.pool();
        let mut tx = pool.begin().await?;
        let mut removed = 0;
        for batch in credential_ids.chunks(DELETE_BATCH_SIZE) {
            let placeholders: Vec<&str> = batch.iter().map(|_| "?").collect();
            let sql = format!(
                "DELETE FROM credential_secrets WHERE tenant_id = ? AND user_key = ? AND credential_id IN ({})",
                placeholders.join(", ")
            );

            let mut query = sqlx::query(&sql).bind(tenant_id).bind(db::user_key(user_id));
            for id in batch {
                query = query.bind(*id);
            }
            removed += query.execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        debug!(
            tenant_id,
            user_id,
            requested = credential_ids.len(),
            removed,
            "deleted credentials"
        );
        Ok(())
    }

    async fn list_credential_ids(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<Vec<String>> {
        validate_scope(tenant_id, user_id)?;

        let ids: Vec<String> = sqlx::query_scalar(LIST_IDS)
            .bind(tenant_id)
            .bind(db::user_key(user_id))
            .bind(prefix)
            .fetch_all(&self.pool())
            .await?;

        Ok(ids)
    }

    async fn list_credentials_with_values(
        &self,
        tenant_id: &str,
        user_id: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<Vec<(String, DecryptedSecret)>> {
        validate_scope(tenant_id, user_id)?;

        let rows: Vec<(String, Vec<u8>)> = sqlx::query_as(LIST_WITH_VALUES)
            .bind(tenant_id)
            .bind(db::user_key(user_id))
            .bind(prefix)
            .fetch_all(&self.pool())
            .await?;

        debug!(tenant_id, user_id, count = rows.len(), "decrypting listed credentials");
        rows.into_iter()
            .map(|(id, token)| Ok((id, self.decrypt_value(&token)?)))
            .collect()
    }
}
