//! Integration tests for load runs
//!
//! Every test runs against a private in-memory SQLite database with the
//! migrations applied, and writes its input files into a temp directory.

use chrono::NaiveDate;
use claims_common::db::{connect_in_memory, Claim, CLAIM_COLUMNS};
use claims_common::ClaimStatus;
use claims_ingest::{
    export_claims, load_file, FileFormat, IngestError, LoadMode, LoadOptions, LoadSummary,
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

const JANE_DOE: &str = r#"[{"claim_id": 100, "patient_name": "Jane Doe", "billed_amount": "500.00",
"paid_amount": "100.00", "status": "pending", "insurer_name": "Acme", "discharge_date": "2024-01-15"}]"#;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write input file");
    path
}

fn options(path: PathBuf, mode: LoadMode) -> LoadOptions {
    LoadOptions::new(path)
        .mode(mode)
        .reference_date(reference_date())
}

async fn load(pool: &SqlitePool, path: PathBuf, mode: LoadMode) -> LoadSummary {
    load_file(pool, &options(path, mode))
        .await
        .expect("Load failed")
}

async fn stored_claims(pool: &SqlitePool) -> Vec<Claim> {
    sqlx::query_as(&format!("SELECT {} FROM claims ORDER BY claim_id", CLAIM_COLUMNS))
        .fetch_all(pool)
        .await
        .expect("Failed to read claims")
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

// ============================================================================
// Claims
// ============================================================================

#[tokio::test]
async fn test_fresh_claim_is_created_exactly() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(&dir, "claims.json", JANE_DOE);

    let summary = load(&pool, path, LoadMode::Append).await;

    assert_eq!(summary.claims.created, 1);
    assert_eq!(summary.claims.updated, 0);
    assert_eq!(summary.claims.skipped, 0);
    assert_eq!(summary.details, Default::default());
    assert_eq!(summary.total_processed(), 1);

    let claims = stored_claims(&pool).await;
    assert_eq!(claims.len(), 1);
    let claim = &claims[0];
    assert_eq!(claim.claim_id, 100);
    assert_eq!(claim.patient_name, "Jane Doe");
    assert_eq!(claim.billed_amount.to_string(), "500.00");
    assert_eq!(claim.paid_amount.to_string(), "100.00");
    assert_eq!(claim.status, ClaimStatus::Pending);
    assert_eq!(claim.insurer_name, "Acme");
    assert_eq!(
        claim.discharge_date,
        NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid date")
    );

    let cents: i64 = sqlx::query_scalar("SELECT billed_amount_cents FROM claims")
        .fetch_one(&pool)
        .await
        .expect("cents");
    assert_eq!(cents, 50_000);
}

#[tokio::test]
async fn test_append_skips_existing_claim() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    load(&pool, write_file(&dir, "a.json", JANE_DOE), LoadMode::Append).await;

    let changed = JANE_DOE.replace("500.00", "600.00");
    let summary = load(&pool, write_file(&dir, "b.json", &changed), LoadMode::Append).await;

    assert_eq!(summary.claims.skipped, 1);
    assert_eq!(summary.claims.created, 0);
    assert_eq!(summary.claims.updated, 0);
    assert_eq!(stored_claims(&pool).await[0].billed_amount.to_string(), "500.00");
}

#[tokio::test]
async fn test_update_existing_and_overwrite_replace_every_field() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    load(&pool, write_file(&dir, "a.json", JANE_DOE), LoadMode::Append).await;

    let changed = r#"[{"id": 100, "patient_name": "Jane Roe", "billed_amount": 650.5,
        "paid_amount": "0", "status": "Under Review", "insurer_name": "Globex",
        "discharge_date": "02/29/2024"}]"#;
    let path = write_file(&dir, "b.json", changed);

    let with_update = options(path.clone(), LoadMode::Append).update_existing(true);
    let summary = load_file(&pool, &with_update).await.expect("load");
    assert_eq!(summary.claims.updated, 1);

    let claim = stored_claims(&pool).await.remove(0);
    assert_eq!(claim.patient_name, "Jane Roe");
    assert_eq!(claim.billed_amount.to_string(), "650.50");
    assert_eq!(claim.paid_amount.to_string(), "0.00");
    assert_eq!(claim.status, ClaimStatus::UnderReview);
    assert_eq!(claim.insurer_name, "Globex");
    assert_eq!(
        claim.discharge_date,
        NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date")
    );

    let summary = load(&pool, write_file(&dir, "c.json", JANE_DOE), LoadMode::Overwrite).await;
    assert_eq!(summary.claims.updated, 1);
    assert_eq!(stored_claims(&pool).await[0].patient_name, "Jane Doe");
}

#[tokio::test]
async fn test_record_errors_do_not_stop_the_run() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    let csv = "claim_id,patient_name,billed_amount,status\n\
               1,Ann,10.00,paid\n\
               x,Bad Id,1.00,paid\n\
               3,Bad Amount,ten,paid\n\
               4,Bad Status,1.00,lost\n\
               5,Bo,,\n";
    let summary = load(&pool, write_file(&dir, "claims.csv", csv), LoadMode::Append).await;

    assert_eq!(summary.claims.created, 3);
    assert_eq!(summary.claims.errors, 2);
    assert_eq!(summary.total_processed(), 3);

    let claims = stored_claims(&pool).await;
    assert_eq!(claims[1].claim_id, 4);
    assert_eq!(claims[1].status, ClaimStatus::Other("lost".to_string()));
    assert_eq!(claims[2].claim_id, 5);
    assert_eq!(claims[2].billed_amount.to_string(), "0.00");
    assert_eq!(claims[2].status, ClaimStatus::Pending);
    assert_eq!(claims[2].discharge_date, reference_date());
}

#[tokio::test]
async fn test_pipe_delimited_claims() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    let csv = "claim_id|patient_name|billed_amount|insurer_name\n7|Smith, Al|1,5|Acme\n";
    let path = write_file(&dir, "claims.txt", csv);

    let opts = options(path, LoadMode::Append).format(FileFormat::Csv);
    let summary = load_file(&pool, &opts).await.expect("load");

    // "1,5" is not a valid amount, so the only row is an error
    assert_eq!(summary.claims.errors, 1);

    let csv = "claim_id|patient_name|billed_amount|insurer_name\n7|Smith, Al|15|Acme\n";
    let path = write_file(&dir, "claims2.txt", csv);
    let opts = options(path, LoadMode::Append).format(FileFormat::Csv);
    let summary = load_file(&pool, &opts).await.expect("load");
    assert_eq!(summary.claims.created, 1);
    assert_eq!(stored_claims(&pool).await[0].patient_name, "Smith, Al");
}

// ============================================================================
// Details
// ============================================================================

#[tokio::test]
async fn test_detail_fan_out_never_duplicates_rows() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    load(&pool, write_file(&dir, "claims.json", JANE_DOE), LoadMode::Append).await;

    let details = r#"[{"claim_id": 100, "cpt_codes": "A,B,B", "denial_reason": "Not covered"}]"#;
    let path = write_file(&dir, "details.json", details);

    let summary = load(&pool, path.clone(), LoadMode::Append).await;
    assert_eq!(summary.details.created, 1);
    assert_eq!(count(&pool, "claim_details").await, 2);

    let summary = load(&pool, path.clone(), LoadMode::Append).await;
    assert_eq!(summary.details.skipped, 1);

    let summary = load(&pool, path, LoadMode::Overwrite).await;
    assert_eq!(summary.details.updated, 1);
    assert_eq!(count(&pool, "claim_details").await, 2);
}

#[tokio::test]
async fn test_detail_for_missing_claim_is_error() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    let csv = "claim_id,cpt_code,denial_reason\n999,99213,\n";

    let summary = load(&pool, write_file(&dir, "details.csv", csv), LoadMode::Append).await;

    assert_eq!(summary.details.errors, 1);
    assert_eq!(summary.total_processed(), 0);
    assert_eq!(count(&pool, "claim_details").await, 0);
}

#[tokio::test]
async fn test_envelope_loads_claims_before_details() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    let json = r#"{
        "claim_details": [{"claim_id": 1, "cpt_codes": ["99213", "99214"]}],
        "claims": [{"id": 1, "patient_name": "Ann", "billed_amount": 10}]
    }"#;

    let summary = load(&pool, write_file(&dir, "all.json", json), LoadMode::Append).await;

    assert_eq!(summary.claims.created, 1);
    assert_eq!(summary.details.created, 1);
    assert_eq!(count(&pool, "claim_details").await, 2);
}

#[tokio::test]
async fn test_unrecognised_status_keeps_claim_and_details() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    let json = r#"{"claims": [{"claim_id": 7, "patient_name": "Al", "status": "Approved"}],
                   "claim_details": [{"claim_id": 7, "cpt_code": "99213"}]}"#;

    let summary = load(&pool, write_file(&dir, "all.json", json), LoadMode::Append).await;

    assert_eq!(summary.claims.created, 1);
    assert_eq!(summary.claims.errors, 0);
    assert_eq!(summary.details.created, 1);
    assert_eq!(summary.details.errors, 0);

    let stored: String = sqlx::query_scalar("SELECT status FROM claims WHERE claim_id = 7")
        .fetch_one(&pool)
        .await
        .expect("status");
    assert_eq!(stored, "approved");
    assert_eq!(stored_claims(&pool).await[0].status.label(), "Approved");
    assert_eq!(count(&pool, "claim_details").await, 1);
}

// ============================================================================
// Clear mode and transactions
// ============================================================================

#[tokio::test]
async fn test_clear_empties_store_first() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    let seed = r#"{"claims": [{"id": 1, "patient_name": "Ann"}, {"id": 2, "patient_name": "Bo"}],
                  "claim_details": [{"claim_id": 1, "cpt_code": "A"}]}"#;
    load(&pool, write_file(&dir, "seed.json", seed), LoadMode::Append).await;

    let replacement = r#"[{"claim_id": 3, "patient_name": "Cy"}, {"claim_id": 3, "patient_name": "Cy again"}]"#;
    let summary = load(&pool, write_file(&dir, "new.json", replacement), LoadMode::Clear).await;

    assert_eq!(summary.claims.created, 1);
    assert_eq!(summary.claims.skipped, 1);
    let claims = stored_claims(&pool).await;
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].patient_name, "Cy");
    assert_eq!(count(&pool, "claim_details").await, 0);
}

#[tokio::test]
async fn test_clear_with_empty_file_still_clears() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    load(&pool, write_file(&dir, "seed.json", JANE_DOE), LoadMode::Append).await;

    let summary = load(&pool, write_file(&dir, "empty.json", "[]"), LoadMode::Clear).await;

    assert_eq!(summary.total_processed(), 0);
    assert_eq!(count(&pool, "claims").await, 0);
}

#[tokio::test]
async fn test_failed_commit_is_reported_as_aborted() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");

    // A deferred foreign key is only checked at COMMIT
    for ddl in [
        "CREATE TABLE audit_parent (id INTEGER PRIMARY KEY)",
        "CREATE TABLE audit_log (parent_id INTEGER REFERENCES audit_parent(id) \
         DEFERRABLE INITIALLY DEFERRED)",
        "CREATE TRIGGER audit_claims AFTER INSERT ON claims \
         BEGIN INSERT INTO audit_log (parent_id) VALUES (-1); END",
    ] {
        sqlx::query(ddl).execute(&pool).await.expect("audit schema");
    }

    let path = write_file(&dir, "claims.json", JANE_DOE);
    let err = load_file(&pool, &options(path, LoadMode::Append))
        .await
        .expect_err("commit should fail");

    assert!(matches!(err, IngestError::Aborted(_)));
    assert!(err.to_string().starts_with("Error loading data:"));
    assert_eq!(count(&pool, "claims").await, 0);
}

#[tokio::test]
async fn test_fatal_error_rolls_back_everything() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    load(&pool, write_file(&dir, "seed.json", JANE_DOE), LoadMode::Append).await;

    sqlx::query(
        "CREATE TRIGGER reject_boom BEFORE INSERT ON claim_details \
         WHEN NEW.cpt_code = 'BOOM' BEGIN SELECT RAISE(ABORT, 'boom'); END",
    )
    .execute(&pool)
    .await
    .expect("trigger");

    let json = r#"{"claims": [{"id": 1, "patient_name": "Ann"}],
                   "claim_details": [{"claim_id": 1, "cpt_code": "BOOM"}]}"#;
    let path = write_file(&dir, "bad.json", json);
    let err = load_file(&pool, &options(path, LoadMode::Clear))
        .await
        .expect_err("load should abort");

    assert!(matches!(err, IngestError::Aborted(_)));
    assert!(err.to_string().starts_with("Error loading data:"));

    // The clear and the new claim are both undone
    let claims = stored_claims(&pool).await;
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].claim_id, 100);
}

// ============================================================================
// Pre-transaction failures
// ============================================================================

#[tokio::test]
async fn test_missing_file_fails_before_any_change() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    load(&pool, write_file(&dir, "seed.json", JANE_DOE), LoadMode::Append).await;

    let err = load_file(&pool, &options(dir.path().join("nope.csv"), LoadMode::Clear))
        .await
        .expect_err("missing file");
    assert!(matches!(err, IngestError::FileNotFound(_)));
    assert_eq!(count(&pool, "claims").await, 1);
}

#[tokio::test]
async fn test_unrecognized_header_fails_before_clear() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    load(&pool, write_file(&dir, "seed.json", JANE_DOE), LoadMode::Append).await;

    let path = write_file(&dir, "odd.csv", "foo,bar\n1,2\n");
    let err = load_file(&pool, &options(path, LoadMode::Clear))
        .await
        .expect_err("bad header");
    assert!(matches!(err, IngestError::FormatNotRecognized(_)));
    assert_eq!(count(&pool, "claims").await, 1);
}

#[tokio::test]
async fn test_undetectable_format() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(&dir, "claims.xml", "<claims/>");

    let err = load_file(&pool, &options(path, LoadMode::Append))
        .await
        .expect_err("undetectable");
    assert!(matches!(err, IngestError::FormatUndetectable(_)));
}

// ============================================================================
// Export round trip
// ============================================================================

#[tokio::test]
async fn test_json_export_round_trips_through_overwrite() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    let seed = r#"{"claims": [
            {"id": 1, "patient_name": "Ann", "billed_amount": "1234.56", "paid_amount": "0.01",
             "status": "denied", "insurer_name": "Acme", "discharge_date": "2023-12-31"},
            {"id": 2, "patient_name": "Bo", "billed_amount": "10", "status": "Under Review"}
        ],
        "claim_details": [{"claim_id": 1, "cpt_codes": "A,B", "denial_reason": "Not covered"}]}"#;
    load(&pool, write_file(&dir, "seed.json", seed), LoadMode::Append).await;
    let original = stored_claims(&pool).await;

    let export_path = dir.path().join("export.json");
    let exported = export_claims(&pool, &export_path, None, true)
        .await
        .expect("export");
    assert_eq!(exported.claims, 2);
    assert_eq!(exported.details, 2);

    // Scramble the stored rows, then restore them from the export
    sqlx::query("UPDATE claims SET patient_name = 'x', billed_amount_cents = 0, status = 'paid'")
        .execute(&pool)
        .await
        .expect("scramble");

    let summary = load(&pool, export_path, LoadMode::Overwrite).await;
    assert_eq!(summary.claims.updated, 2);
    assert_eq!(summary.details.updated, 2);
    assert_eq!(stored_claims(&pool).await, original);
}

#[tokio::test]
async fn test_csv_export_round_trips_through_clear() {
    let pool = connect_in_memory().await.expect("pool");
    let dir = TempDir::new().expect("tempdir");
    load(&pool, write_file(&dir, "seed.json", JANE_DOE), LoadMode::Append).await;
    let original = stored_claims(&pool).await;

    let export_path = dir.path().join("claims.csv");
    let exported = export_claims(&pool, &export_path, None, true)
        .await
        .expect("export");
    assert_eq!(exported.files.len(), 2);

    let summary = load(&pool, export_path, LoadMode::Clear).await;
    assert_eq!(summary.claims.created, 1);
    assert_eq!(stored_claims(&pool).await, original);
}
