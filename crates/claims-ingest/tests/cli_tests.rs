//! End-to-end tests for the claims-ingest binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn ingest(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("claims-ingest").unwrap();
    cmd.current_dir(dir.path())
        .env("DATABASE_URL", format!("sqlite://{}", dir.path().join("claims.db").display()))
        .env_remove("LOG_LEVEL")
        .env_remove("LOG_OUTPUT");
    cmd
}

#[test]
fn test_load_prints_summary_and_confirmation() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("claims.csv"),
        "claim_id,patient_name,billed_amount,paid_amount,status,insurer_name,discharge_date\n\
         100,Jane Doe,500.00,100.00,pending,Acme,2024-01-15\n",
    )
    .unwrap();

    ingest(&dir)
        .arg("load")
        .arg("claims.csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("Claims Created"))
        .stdout(predicate::str::contains("Total records processed"))
        .stdout(predicate::str::contains("Data loaded successfully!"));

    ingest(&dir)
        .args(["load", "claims.csv", "--mode", "append"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Claims Skipped"));
}

#[test]
fn test_missing_file_exits_with_error() {
    let dir = TempDir::new().unwrap();

    ingest(&dir)
        .args(["load", "missing.csv"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_unknown_extension_requires_format() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("claims.dat"), "claim_id,patient_name\n1,Ann\n").unwrap();

    ingest(&dir)
        .args(["load", "claims.dat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--format"));

    ingest(&dir)
        .args(["load", "claims.dat", "--format", "csv"])
        .assert()
        .success();
}

#[test]
fn test_invalid_mode_is_rejected_by_parser() {
    let dir = TempDir::new().unwrap();

    ingest(&dir)
        .args(["load", "claims.csv", "--mode", "replace"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("replace"));
}

#[test]
fn test_export_writes_loadable_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("claims.json"),
        r#"[{"claim_id": 5, "patient_name": "Ann", "billed_amount": "12.34"}]"#,
    )
    .unwrap();

    ingest(&dir).args(["load", "claims.json"]).assert().success();
    ingest(&dir)
        .args(["export", "out.json", "--with-details"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 claims"));

    let exported = fs::read_to_string(dir.path().join("out.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(value["claims"][0]["billed_amount"], "12.34");
    assert!(value["claim_details"].as_array().unwrap().is_empty());
}
