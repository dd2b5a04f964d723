//! Connection and schema bootstrap for the credential table.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;

/// Table holding encrypted credential rows.
pub const TABLE: &str = "credential_secrets";

/// `user_key` value of tenant-shared rows. Real user ids are never empty.
pub const SHARED_SCOPE: &str = "";

/// Schema statements, applied in order on every connect.
///
/// The owning user is stored as `user_key`, with `SHARED_SCOPE` standing in
/// for "no user", so one full unique index covers both scopes.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS credential_secrets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tenant_id TEXT NOT NULL,
        user_key TEXT NOT NULL DEFAULT '',
        credential_id TEXT NOT NULL,
        secret BLOB NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_credential_secrets_scope_key
        ON credential_secrets (tenant_id, user_key, credential_id)
    "#,
];

/// Map an optional user id onto the stored `user_key` column.
pub fn user_key(user_id: Option<&str>) -> &str {
    user_id.unwrap_or(SHARED_SCOPE)
}

/// Open a pool for `database_url`, creating the database file if needed.
pub async fn connect(database_url: &str, pool_size: u32) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(pool_size.max(1))
        .connect_with(opts)
        .await?;

    debug!(max_connections = pool_size.max(1), "opened credential database pool");
    Ok(pool)
}

/// Create the credential table and its unique indexes if missing.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
