//! Multi-field credentials.
//!
//! A connection credential (a Slack app, a database login) usually carries
//! several secret fields. A [`CredentialBundle`] stores each field as its own
//! credential under `"{bundle_id}:{field}"` and hands back a redacted copy of
//! the payload that is safe to keep alongside the owning record.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::store::CredentialStore;
use crate::types::DecryptedSecret;

/// Separator between bundle id and field name.
const FIELD_SEPARATOR: char = ':';

/// A named group of secret fields in one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    tenant_id: String,
    user_id: Option<String>,
    bundle_id: String,
}

impl CredentialBundle {
    pub fn new(
        tenant_id: impl Into<String>,
        user_id: Option<impl Into<String>>,
        bundle_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.map(Into::into),
            bundle_id: bundle_id.into(),
        }
    }

    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    /// Storage key of `field`.
    pub fn field_key(&self, field: &str) -> String {
        format!("{}{FIELD_SEPARATOR}{field}", self.bundle_id)
    }

    fn prefix(&self) -> String {
        format!("{}{FIELD_SEPARATOR}", self.bundle_id)
    }

    /// Encrypt and store every field of `payload`.
    ///
    /// String values are stored as-is; any other JSON value is stored as its
    /// JSON text. Returns the payload with each stored value replaced by one
    /// `*` per character.
    pub async fn store(
        &self,
        store: &dyn CredentialStore,
        payload: &Map<String, Value>,
    ) -> Result<BTreeMap<String, String>> {
        let mut redacted = BTreeMap::new();
        for (field, value) in payload {
            let text = match value {
                Value::String(s) => s.clone(),
                other => serde_json::to_string(other)?,
            };
            store
                .set_credential(
                    &self.tenant_id,
                    self.user_id.as_deref(),
                    &self.field_key(field),
                    &text,
                )
                .await?;
            redacted.insert(field.clone(), "*".repeat(text.chars().count()));
        }

        debug!(
            tenant_id = %self.tenant_id,
            bundle_id = %self.bundle_id,
            fields = redacted.len(),
            "stored credential bundle"
        );
        Ok(redacted)
    }

    /// Fetch the named fields. Fields with no stored value map to `None`.
    pub async fn retrieve(
        &self,
        store: &dyn CredentialStore,
        fields: &[&str],
    ) -> Result<BTreeMap<String, Option<DecryptedSecret>>> {
        let mut values = BTreeMap::new();
        for field in fields {
            let value = store
                .get_credential(
                    &self.tenant_id,
                    self.user_id.as_deref(),
                    &self.field_key(field),
                )
                .await?;
            values.insert(field.to_string(), value);
        }
        Ok(values)
    }

    /// Remove the named fields in one batch.
    pub async fn delete(&self, store: &dyn CredentialStore, fields: &[&str]) -> Result<()> {
        let keys: Vec<String> = fields.iter().map(|f| self.field_key(f)).collect();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        store
            .delete_credentials(&self.tenant_id, self.user_id.as_deref(), &keys)
            .await
    }

    /// Field names currently in storage, sorted.
    pub async fn field_names(&self, store: &dyn CredentialStore) -> Result<Vec<String>> {
        let prefix = self.prefix();
        let ids = store
            .list_credential_ids(&self.tenant_id, self.user_id.as_deref(), Some(&prefix))
            .await?;
        Ok(ids
            .into_iter()
            .filter_map(|id| id.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }
}
