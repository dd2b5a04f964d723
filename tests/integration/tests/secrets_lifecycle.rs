//! Credential store lifecycle across service instances.
//!
//! Each test opens the store, writes, then reopens it the way a restarted
//! process would, checking that values, scoping and failures persist.

use serde_json::json;
use tenantvault_core::config::ConfigBuilder;
use tenantvault_integration_tests::Fixture;
use tenantvault_secrets::{
    CredentialBundle, CredentialStore, EncryptionHelper, SecretError, SecretsService,
};

#[tokio::test]
async fn test_values_survive_restart() {
    let fixture = Fixture::new();

    let first = SecretsService::connect(&fixture.config).await.unwrap();
    first
        .set_credential("acme", Some("alice"), "github:token", "ghp_abc")
        .await
        .unwrap();
    first
        .set_credential("acme", None, "slack:signing-secret", "s3cr3t")
        .await
        .unwrap();
    drop(first);

    let second = SecretsService::connect(&fixture.config).await.unwrap();
    let user = second
        .get_credential("acme", Some("alice"), "github:token")
        .await
        .unwrap()
        .unwrap();
    let shared = second
        .get_credential("acme", None, "slack:signing-secret")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.expose(), "ghp_abc");
    assert_eq!(shared.expose(), "s3cr3t");
}

#[tokio::test]
async fn test_reconnect_mid_session() {
    let fixture = Fixture::new();
    let service = SecretsService::connect(&fixture.config).await.unwrap();

    service.set_credential("acme", None, "a", "1").await.unwrap();
    service.reconnect().await.unwrap();
    service.set_credential("acme", None, "b", "2").await.unwrap();
    service.reconnect().await.unwrap();

    let pairs = service
        .list_credentials_with_values("acme", None, None)
        .await
        .unwrap();
    let pairs: Vec<(String, String)> = pairs
        .into_iter()
        .map(|(id, v)| (id, v.expose().to_string()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string())
        ]
    );
}

#[tokio::test]
async fn test_rotated_master_key_cannot_read_old_values() {
    let fixture = Fixture::new();
    let service = SecretsService::connect(&fixture.config).await.unwrap();
    service.set_credential("acme", None, "k", "v").await.unwrap();
    drop(service);

    let rotated = ConfigBuilder::new()
        .master_key(EncryptionHelper::generate_key())
        .database_url(fixture.config.credentials.database_url.clone().unwrap())
        .build();
    let service = SecretsService::connect(&rotated).await.unwrap();

    let result = service.get_credential("acme", None, "k").await;
    assert!(matches!(result, Err(SecretError::DecryptionFailed(_))));

    // Listing ids needs no decryption
    let ids = service.list_credential_ids("acme", None, None).await.unwrap();
    assert_eq!(ids, vec!["k".to_string()]);
}

#[tokio::test]
async fn test_malformed_master_key_is_config_error() {
    let fixture = Fixture::new();
    let config = ConfigBuilder::new()
        .master_key("not-a-key")
        .database_url(fixture.config.credentials.database_url.clone().unwrap())
        .build();

    let err = SecretsService::connect(&config).await.err().unwrap();
    assert!(matches!(err, SecretError::InvalidMasterKey(_)));
    assert!(err.is_config());
}

#[tokio::test]
async fn test_tenants_share_a_database_without_leaking() {
    let fixture = Fixture::new();
    let service = SecretsService::connect(&fixture.config).await.unwrap();

    for tenant in ["acme", "globex"] {
        service
            .set_credential(tenant, Some("bob"), "db_password", tenant)
            .await
            .unwrap();
    }

    for tenant in ["acme", "globex"] {
        let value = service
            .get_credential(tenant, Some("bob"), "db_password")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value.expose(), tenant);
    }

    service
        .delete_credential("acme", Some("bob"), "db_password")
        .await
        .unwrap();
    assert!(service
        .get_credential("globex", Some("bob"), "db_password")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_bundle_through_trait_object() {
    let fixture = Fixture::new();
    let service = SecretsService::connect(&fixture.config).await.unwrap();
    let store: &dyn CredentialStore = &service;

    let bundle = CredentialBundle::new("acme", Some("alice"), "slackcreds1");
    let payload = json!({"bot-token": "xoxb-1", "app-token": "xapp-22"});
    let redacted = bundle
        .store(store, payload.as_object().unwrap())
        .await
        .unwrap();
    assert_eq!(redacted["app-token"], "*******");

    drop(service);
    let reopened = SecretsService::connect(&fixture.config).await.unwrap();
    assert_eq!(
        bundle.field_names(&reopened).await.unwrap(),
        vec!["app-token".to_string(), "bot-token".to_string()]
    );

    let values = bundle
        .retrieve(&reopened, &["bot-token"])
        .await
        .unwrap();
    assert_eq!(values["bot-token"].as_ref().unwrap().expose(), "xoxb-1");
}
