//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be written to disk and loaded
//! back with identical field values, and that a loaded config is enough to
//! open the credential store.

use std::path::Path;

use tempfile::TempDir;
use tenantvault_core::config::{Config, ConfigBuilder, LogLevel};
use tenantvault_integration_tests::{sqlite_url, Fixture};
use tenantvault_secrets::{CredentialStore, EncryptionHelper, SecretsService};

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tenantvault.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.credentials.pool_size, config.credentials.pool_size);
    assert_eq!(loaded.logging.level, config.logging.level);
    assert!(loaded.credentials.master_key.is_none());
    assert!(loaded.credentials.database_url.is_none());
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tenantvault.json5");

    let config = ConfigBuilder::new()
        .pool_size(8)
        .database_url(sqlite_url(dir.path(), "c.db"))
        .log_level(LogLevel::Warn)
        .build();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.credentials.pool_size, 8);
    assert_eq!(loaded.credentials.database_url, config.credentials.database_url);
    assert_eq!(loaded.logging.level, LogLevel::Warn);
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/tenantvault.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json5");
    assert!(result.is_err());
}

#[test]
fn test_config_parse_json5_features() {
    let config = Config::parse(
        r#"{
            // trailing commas and comments
            credentials: { pool_size: 4, },
            logging: { level: 'debug', json: true },
        }"#,
    )
    .unwrap();
    assert_eq!(config.credentials.pool_size, 4);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert!(config.logging.json);
}

#[tokio::test]
async fn test_saved_config_opens_store() {
    let fixture = Fixture::new();

    let loaded = Config::load(&fixture.config_path).unwrap();
    let service = SecretsService::connect(&loaded).await.unwrap();
    service
        .set_credential("T1", None, "k", "from-config")
        .await
        .unwrap();

    assert!(fixture.database_path().exists());
    let value = service.get_credential("T1", None, "k").await.unwrap().unwrap();
    assert_eq!(value.expose(), "from-config");
}

#[test]
fn test_generated_key_survives_config_file() {
    let fixture = Fixture::new();
    let loaded = Config::load(&fixture.config_path).unwrap();

    let original = EncryptionHelper::from_config(&fixture.config.credentials).unwrap();
    let reloaded = EncryptionHelper::from_config(&loaded.credentials).unwrap();
    let token = original.encrypt(b"portable").unwrap();
    assert_eq!(reloaded.decrypt(&token).unwrap(), b"portable");
}
