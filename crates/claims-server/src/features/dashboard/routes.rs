//! Dashboard API routes
//!
//! - `GET /api/v1/dashboard` - Aggregated review statistics

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::SqlitePool;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::queries::{DashboardError, DashboardQuery};

pub fn dashboard_routes() -> Router<SqlitePool> {
    Router::new().route("/", get(dashboard))
}

/// Dashboard statistics
///
/// # Endpoint
///
/// `GET /api/v1/dashboard?as_of=2024-06-30`
///
/// `as_of` anchors the monthly, weekly and 30-day windows; it defaults to
/// today (UTC).
///
/// # Response
///
/// - `200 OK` - Totals, financials, breakdowns and top lists
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(pool))]
async fn dashboard(
    State(pool): State<SqlitePool>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, DashboardApiError> {
    let response = super::queries::stats::handle(pool, query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
struct DashboardApiError(DashboardError);

impl From<DashboardError> for DashboardApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for DashboardApiError {
    fn into_response(self) -> Response {
        tracing::error!("Database error during dashboard query: {}", self.0);
        let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
    }
}
