// crates/data-lichen-cli/tests/cli.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Runs the `data-lichen` binary against temporary configs.
// Purpose: Verify config validation, store listing, publishing, and fatal startup.
// Dependencies: data-lichen-cli binary, data-lichen-store-sqlite, tempfile
// ============================================================================

//! ## Overview
//! Every test writes a config into a temporary directory that points the store
//! at a fresh `SQLite` file and the broker at the stdout log sink, so no
//! external services are needed.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use data_lichen_core::FieldValue;
use data_lichen_core::MetadataRecord;
use data_lichen_core::MetadataStore;
use data_lichen_core::UniqueIdentifier;
use data_lichen_store_sqlite::SqliteMetadataStore;
use data_lichen_store_sqlite::SqliteStoreConfig;
use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn data_lichen_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_data-lichen"))
}

fn write_config(dir: &Path) -> PathBuf {
    let config_path = dir.join("data-lichen.toml");
    let db_path = dir.join("metadata.db");
    let secrets_path = dir.join("secrets.json");
    let config = format!(
        r#"
[store]
path = "{}"

[broker]
kind = "log"

[secrets]
provider = "file"
file = "{}"

[logging]
filter = "warn"
"#,
        toml_path(&db_path),
        toml_path(&secrets_path)
    );
    std::fs::write(&config_path, config.trim()).unwrap();
    config_path
}

fn toml_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "\\\\")
}

fn run(args: &[&str], config: &Path) -> Output {
    Command::new(data_lichen_bin())
        .args(args)
        .arg("--config")
        .arg(config)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

async fn seed(dir: &Path, ids: &[&str]) {
    let store = SqliteMetadataStore::open(SqliteStoreConfig::for_path(dir.join("metadata.db"))).unwrap();
    for (index, id) in ids.iter().enumerate() {
        let mut record = MetadataRecord::new(UniqueIdentifier::parse(*id).unwrap());
        record.service_name = Some(format!("svc-{index}"));
        record.validity = FieldValue::real(97.5);
        store.upsert(record).await.unwrap();
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn config_validate_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let output = run(&["config", "validate"], &config);
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_text(&output).trim(), "config ok");
}

#[test]
fn config_validate_rejects_invalid_bind() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[server]\nbind = \"not-an-address\"\n").unwrap();
    let output = run(&["config", "validate"], &config);
    assert!(!output.status.success());
    let stderr = stderr_text(&output);
    assert!(stderr.contains("failed to load config"), "stderr: {stderr}");
    assert!(stderr.contains("server.bind"), "stderr: {stderr}");
}

#[test]
fn config_validate_reports_missing_explicit_file() {
    let dir = TempDir::new().unwrap();
    let output = run(&["config", "validate"], &dir.path().join("absent.toml"));
    assert!(!output.status.success());
    assert!(stderr_text(&output).contains("config io error"));
}

#[test]
fn store_list_prints_empty_snapshot() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let output = run(&["store", "list"], &config);
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let parsed: Value = serde_json::from_str(&stdout_text(&output)).unwrap();
    assert_eq!(parsed, Value::Array(Vec::new()));
}

#[tokio::test]
async fn store_list_prints_seeded_records() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    seed(dir.path(), &["orders", "users"]).await;
    let output = run(&["store", "list"], &config);
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let parsed: Value = serde_json::from_str(&stdout_text(&output)).unwrap();
    let records = parsed.as_array().unwrap();
    assert_eq!(records.len(), 2);
    let mut ids: Vec<&str> =
        records.iter().map(|record| record["uniqueIdentifier"].as_str().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["orders", "users"]);
    assert_eq!(records[0].as_object().unwrap().len(), 9);
}

#[tokio::test]
async fn publish_writes_batch_and_prints_report() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    seed(dir.path(), &["orders", "users"]).await;
    let output = run(&["publish"], &config);
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let stdout = stdout_text(&output);
    let lines: Vec<&str> = stdout.lines().filter(|line| !line.trim().is_empty()).collect();
    assert_eq!(lines.len(), 2, "stdout: {stdout}");

    let batch: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(batch["topic"], "data-discovery");
    assert_eq!(batch["records"].as_array().unwrap().len(), 2);
    assert!(batch["records"][0]["value"]["uniqueIdentifier"].is_string());
    assert_eq!(batch["records"][0]["value"]["validity"], 97.5);

    let report: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(report["topic"], "data-discovery");
    assert_eq!(report["mode"], "full_resync");
    assert_eq!(report["published"], 2);
}

#[test]
fn publish_with_empty_store_sends_empty_batch() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let output = run(&["publish"], &config);
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let stdout = stdout_text(&output);
    let lines: Vec<&str> = stdout.lines().filter(|line| !line.trim().is_empty()).collect();
    assert_eq!(lines.len(), 2, "stdout: {stdout}");

    let batch: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(batch["topic"], "data-discovery");
    assert_eq!(batch["records"], Value::Array(Vec::new()));

    let report: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(report["published"], 0);
}

#[test]
fn serve_fails_when_secrets_are_missing() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    let output = run(&["serve"], &config);
    assert!(!output.status.success());
    let stderr = stderr_text(&output);
    assert!(stderr.contains("startup failed"), "stderr: {stderr}");
    assert!(stderr.contains("secret fetch failed"), "stderr: {stderr}");
    assert!(!dir.path().join("metadata.db").exists());
}
