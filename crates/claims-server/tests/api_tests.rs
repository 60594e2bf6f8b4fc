//! Integration tests for the claims review API

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

mod helpers;
use helpers::{
    get, insert_claim, insert_user, json_request, send, setup_test_app, setup_test_db,
};

#[tokio::test]
async fn test_health_check() {
    let pool = setup_test_db().await;
    let app = setup_test_app(pool).await;

    let (status, json) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let pool = setup_test_db().await;
    let app = setup_test_app(pool).await;

    let (status, json) = send(&app, get("/api/v1/nothing-here")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_claims_with_pagination_meta() {
    let pool = setup_test_db().await;
    for id in 1..=3 {
        insert_claim(&pool, id, "Jane Doe", 50_000, 20_000, "pending").await;
    }
    let app = setup_test_app(pool).await;

    let (status, json) = send(&app, get("/api/v1/claims?page=1&per_page=2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["data"][0]["claim_id"], 3);
    assert_eq!(json["data"][0]["underpayment"], "300.00");
    assert_eq!(json["meta"]["pagination"]["total"], 3);
    assert_eq!(json["meta"]["pagination"]["pages"], 2);
}

#[tokio::test]
async fn test_list_claims_rejects_bad_page() {
    let pool = setup_test_db().await;
    let app = setup_test_app(pool).await;

    let (status, json) = send(&app, get("/api/v1/claims?page=0")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_claim_not_found() {
    let pool = setup_test_db().await;
    let app = setup_test_app(pool).await;

    let (status, json) = send(&app, get("/api/v1/claims/999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_flag_lifecycle() {
    let pool = setup_test_db().await;
    insert_claim(&pool, 7, "Ann Lee", 10_000, 0, "denied").await;
    let user = insert_user(&pool, "reviewer").await;
    let app = setup_test_app(pool).await;

    let body = json!({ "reason": "Upcoding" });

    let (status, json) =
        send(&app, json_request("POST", "/api/v1/claims/7/flags", Some(user), body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["reason"], "Upcoding");
    assert_eq!(json["data"]["username"], "reviewer");
    assert_eq!(json["data"]["flag_count"], 1);
    let flag_id = json["data"]["id"].as_i64().expect("flag id");

    let (status, json) =
        send(&app, json_request("POST", "/api/v1/claims/7/flags", Some(user), body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");

    let resolve_uri = format!("/api/v1/claims/7/flags/{}/resolve", flag_id);
    let (status, json) =
        send(&app, json_request("POST", &resolve_uri, Some(user), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["resolved"], true);
    assert_eq!(json["data"]["resolved_by"], user);
    assert_eq!(json["data"]["flag_count"], 0);

    let (status, _) = send(&app, json_request("POST", &resolve_uri, Some(user), json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_flag_without_body_uses_default_reason() {
    let pool = setup_test_db().await;
    insert_claim(&pool, 7, "Ann Lee", 10_000, 0, "denied").await;
    let user = insert_user(&pool, "reviewer").await;
    let app = setup_test_app(pool).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/claims/7/flags")
        .header("x-user-id", user.to_string())
        .body(Body::empty())
        .expect("request");
    let (status, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["reason"], "Flagged for review");
}

#[tokio::test]
async fn test_acting_user_header_required() {
    let pool = setup_test_db().await;
    insert_claim(&pool, 7, "Ann Lee", 10_000, 0, "denied").await;
    let app = setup_test_app(pool).await;

    let (status, json) = send(
        &app,
        json_request("POST", "/api/v1/claims/7/notes", None, json!({ "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(
        &app,
        json_request("POST", "/api/v1/claims/7/notes", Some(42), json!({ "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_note_create_and_edit() {
    let pool = setup_test_db().await;
    insert_claim(&pool, 7, "Ann Lee", 10_000, 0, "denied").await;
    let author = insert_user(&pool, "author").await;
    let other = insert_user(&pool, "other").await;
    let app = setup_test_app(pool).await;

    let (status, json) = send(
        &app,
        json_request("POST", "/api/v1/claims/7/notes", Some(author), json!({ "content": " Called payer " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["content"], "Called payer");
    assert_eq!(json["data"]["note_count"], 1);
    let note_id = json["data"]["id"].as_i64().expect("note id");

    let (status, _) = send(
        &app,
        json_request("POST", "/api/v1/claims/7/notes", Some(author), json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/claims/7/notes/{}", note_id);
    let (status, _) =
        send(&app, json_request("PUT", &uri, Some(other), json!({ "content": "mine now" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) =
        send(&app, json_request("PUT", &uri, Some(author), json!({ "content": "Payer called back" })))
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["content"], "Payer called back");

    let (status, json) = send(&app, get("/api/v1/claims/7/flags-notes")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["note_count"], 1);
    assert_eq!(json["data"]["notes"][0]["content"], "Payer called back");
}

#[tokio::test]
async fn test_create_user_conflict() {
    let pool = setup_test_db().await;
    let app = setup_test_app(pool).await;

    let body = json!({ "username": "alice" });
    let (status, json) = send(&app, json_request("POST", "/api/v1/users", None, body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["username"], "alice");

    let (status, json) = send(&app, json_request("POST", "/api/v1/users", None, body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_dashboard_totals() {
    let pool = setup_test_db().await;
    insert_claim(&pool, 1, "Jane Doe", 50_000, 20_000, "paid").await;
    insert_claim(&pool, 2, "John Roe", 25_000, 0, "denied").await;
    insert_user(&pool, "reviewer").await;
    let app = setup_test_app(pool).await;

    let (status, json) = send(&app, get("/api/v1/dashboard?as_of=2024-06-30")).await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["as_of"], "2024-06-30");
    assert_eq!(data["totals"]["claims"], 2);
    assert_eq!(data["totals"]["users"], 1);
    assert_eq!(data["financials"]["total_billed"], "750.00");
    assert_eq!(data["financials"]["total_underpayment"], "550.00");
    assert_eq!(data["financials"]["avg_paid"], "100.00");
    assert_eq!(data["financials"]["underpayment_percentage"], "73.33");
    assert_eq!(data["weekly_claims"].as_array().map(Vec::len), Some(8));
    assert_eq!(data["monthly_trends"][0]["month"], "2024-06");
}

#[tokio::test]
async fn test_unrecognised_status_rows_are_served() {
    let pool = setup_test_db().await;
    insert_claim(&pool, 1, "Jane Doe", 50_000, 50_000, "paid").await;
    insert_claim(&pool, 2, "John Roe", 2_500_000, 0, "Lost").await;
    let app = setup_test_app(pool).await;

    let (status, json) = send(&app, get("/api/v1/claims?status=lost")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["claim_id"], 2);
    assert_eq!(json["data"][0]["status"], "lost");

    let (status, json) = send(&app, get("/api/v1/dashboard?as_of=2024-06-30")).await;
    assert_eq!(status, StatusCode::OK);
    let buckets = json["data"]["status_breakdown"].as_array().cloned().unwrap_or_default();
    assert!(buckets
        .iter()
        .any(|b| b["status"] == "lost" && b["label"] == "Lost"));
    assert_eq!(json["data"]["high_value_underpaid"][0]["claim_id"], 2);
    assert_eq!(json["data"]["high_value_underpaid"][0]["status"], "lost");
}
