//! Test helpers for claims server integration tests
//!
//! - In-memory database setup with the schema applied
//! - Router construction with default configuration
//! - Row fixtures and request/response shortcuts

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use claims_server::{api, config::Config};

/// Fresh in-memory database with migrations applied
pub async fn setup_test_db() -> SqlitePool {
    claims_common::db::connect_in_memory()
        .await
        .expect("Failed to create test database")
}

/// Application router over the given pool
pub async fn setup_test_app(pool: SqlitePool) -> Router {
    api::create_router(pool, &Config::default())
}

/// Insert a claim with amounts given in cents
pub async fn insert_claim(
    pool: &SqlitePool,
    claim_id: i64,
    patient_name: &str,
    billed_cents: i64,
    paid_cents: i64,
    status: &str,
) {
    sqlx::query(
        "INSERT INTO claims (claim_id, patient_name, billed_amount_cents, paid_amount_cents,
             status, insurer_name, discharge_date)
         VALUES (?1, ?2, ?3, ?4, ?5, 'Acme Health', '2024-06-03')",
    )
    .bind(claim_id)
    .bind(patient_name)
    .bind(billed_cents)
    .bind(paid_cents)
    .bind(status)
    .execute(pool)
    .await
    .expect("Failed to insert claim");
}

/// Insert a reviewer and return its id
pub async fn insert_user(pool: &SqlitePool, username: &str) -> i64 {
    sqlx::query("INSERT INTO users (username, created_at) VALUES (?1, '2024-01-01T00:00:00+00:00')")
        .bind(username)
        .execute(pool)
        .await
        .expect("Failed to insert user")
        .last_insert_rowid()
}

/// Send one request and decode the JSON body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

/// JSON request acting as the given user
pub fn json_request(method: &str, uri: &str, user_id: Option<i64>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id.to_string());
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}
