// crates/data-lichen-server/tests/bootstrap.rs
// ============================================================================
// Module: Bootstrap Tests
// Description: Startup wiring from config, secrets, and an on-disk store.
// Purpose: Ensure secret failures are fatal and a valid config serves traffic.
// Dependencies: data-lichen-config, data-lichen-server, tempfile
// ============================================================================

//! ## Overview
//! Uses the file secret provider and a temporary `SQLite` database so the full
//! bootstrap path runs without external services.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::Path;

use data_lichen_config::BrokerKind;
use data_lichen_config::DataLichenConfig;
use data_lichen_config::SecretProviderKind;
use data_lichen_server::DataLichenServer;
use data_lichen_server::ServerError;
use data_lichen_server::build_secret_provider;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn local_config(dir: &Path, secrets: &str) -> DataLichenConfig {
    let secrets_path = dir.join("secrets.json");
    std::fs::write(&secrets_path, secrets).unwrap();
    let mut config = DataLichenConfig::default();
    config.store.path = dir.join("metadata.db");
    config.broker.kind = BrokerKind::Log;
    config.secrets.provider = SecretProviderKind::File;
    config.secrets.file = Some(secrets_path);
    config
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn bootstrap_serves_with_file_secrets_and_sqlite() {
    let dir = TempDir::new().unwrap();
    let config = local_config(dir.path(), r#"{"bearer_tokens":["boot-token"],"realm":"boot"}"#);
    let server = DataLichenServer::bootstrap(&config).await.unwrap();
    assert!(dir.path().join("metadata.db").exists());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.serve_on(listener).await;
    });
    let client = reqwest::Client::new();

    let response = client.get(format!("http://{addr}/readyz")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("http://{addr}/some-protected-route"))
        .header(AUTHORIZATION, "Bearer boot-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(format!("http://{addr}/register"))
        .json(&serde_json::json!({"uniqueIdentifier": "A1", "serviceName": "svc1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let records: serde_json::Value =
        client.get(format!("http://{addr}/metadata")).send().await.unwrap().json().await.unwrap();
    assert_eq!(records[0]["serviceName"], serde_json::json!("svc1"));
}

#[tokio::test]
async fn missing_secrets_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = local_config(dir.path(), "{}");
    config.secrets.file = Some(dir.path().join("absent.json"));
    let result = DataLichenServer::bootstrap(&config).await;
    assert!(matches!(result, Err(ServerError::Secrets(_))));
    assert!(!dir.path().join("metadata.db").exists());
}

#[tokio::test]
async fn malformed_gate_settings_are_fatal() {
    let dir = TempDir::new().unwrap();
    let config = local_config(dir.path(), r#"{"bearer_tokens":"not-a-list"}"#);
    let result = DataLichenServer::bootstrap(&config).await;
    let Err(ServerError::Secrets(message)) = result else {
        panic!("expected secret failure");
    };
    assert!(!message.contains("not-a-list"));
}

#[test]
fn vault_provider_requires_token() {
    let config = DataLichenConfig::default();
    let result = build_secret_provider(&config.secrets, None);
    let Err(ServerError::Secrets(message)) = result else {
        panic!("expected missing token failure");
    };
    assert!(message.contains("VAULT_TOKEN"));
    let provider = build_secret_provider(&config.secrets, Some("root".to_string())).unwrap();
    assert_eq!(provider.name(), "vault");
}
