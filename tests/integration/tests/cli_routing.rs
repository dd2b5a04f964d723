//! CLI routing integration tests.
//!
//! These tests parse argument vectors exactly as the `tenantvault` binary
//! does and run them in-process against a temporary config and database.

use clap::Parser;
use tenantvault_cli::{run, Cli};
use tenantvault_integration_tests::Fixture;
use tenantvault_secrets::{CredentialStore, SecretsService};

type CliResult = Result<(), String>;

async fn tenantvault(fixture: &Fixture, args: &[&str]) -> CliResult {
    let config = fixture.config_path.to_str().unwrap();
    let mut argv = vec!["tenantvault", "--config", config];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
    run(cli).await.map_err(|e| e.to_string())
}

#[tokio::test]
async fn test_secrets_set_get_delete() {
    let fixture = Fixture::new();

    tenantvault(
        &fixture,
        &["secrets", "set", "acme", "github:token", "--user", "alice", "--value", "ghp_1"],
    )
    .await
    .unwrap();
    tenantvault(&fixture, &["secrets", "get", "acme", "github:token", "--user", "alice"])
        .await
        .unwrap();

    // Shared scope has no such credential
    let missing = tenantvault(&fixture, &["secrets", "get", "acme", "github:token"]).await;
    assert!(missing.unwrap_err().contains("not found"));

    tenantvault(&fixture, &["secrets", "delete", "acme", "github:token", "-u", "alice"])
        .await
        .unwrap();
    assert!(
        tenantvault(&fixture, &["secrets", "get", "acme", "github:token", "-u", "alice"])
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_secrets_values_land_in_store() {
    let fixture = Fixture::new();

    for id in ["db_1", "db_2", "api_1"] {
        tenantvault(&fixture, &["secrets", "set", "acme", id, "--value", id])
            .await
            .unwrap();
    }
    tenantvault(&fixture, &["secrets", "list", "acme", "--prefix", "db_", "--values"])
        .await
        .unwrap();
    tenantvault(&fixture, &["secrets", "delete", "acme", "db_1", "db_2"])
        .await
        .unwrap();

    let service = SecretsService::connect(&fixture.config).await.unwrap();
    let ids = service.list_credential_ids("acme", None, None).await.unwrap();
    assert_eq!(ids, vec!["api_1".to_string()]);
    let value = service.get_credential("acme", None, "api_1").await.unwrap().unwrap();
    assert_eq!(value.expose(), "api_1");
}

#[tokio::test]
async fn test_secrets_set_rejects_empty_value() {
    let fixture = Fixture::new();
    let result = tenantvault(&fixture, &["secrets", "set", "acme", "k", "--value", ""]).await;
    assert!(result.unwrap_err().contains("must not be empty"));
}

#[tokio::test]
async fn test_config_commands() {
    let fixture = Fixture::new();
    tenantvault(&fixture, &["config", "validate"]).await.unwrap();
    tenantvault(&fixture, &["config", "show"]).await.unwrap();
    tenantvault(&fixture, &["config", "path"]).await.unwrap();

    // Existing file is not overwritten without --force
    assert!(tenantvault(&fixture, &["config", "init"]).await.is_err());
}

#[tokio::test]
async fn test_doctor_passes_with_valid_setup() {
    let fixture = Fixture::new();
    tenantvault(&fixture, &["doctor"]).await.unwrap();
}

#[tokio::test]
async fn test_unknown_command() {
    let fixture = Fixture::new();
    assert!(tenantvault(&fixture, &["nonexistent-command"]).await.is_err());
}

#[tokio::test]
async fn test_version_and_keygen() {
    let fixture = Fixture::new();
    tenantvault(&fixture, &["version"]).await.unwrap();
    tenantvault(&fixture, &["keygen"]).await.unwrap();
}
