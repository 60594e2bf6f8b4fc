//! HTTP surface: router assembly, health and fallback

pub mod response;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::error::AppError;
use crate::features;
use crate::middleware;

/// Build the application router with all routes and middleware
///
/// Feature routes live under `/api/v1`; anything unmatched gets a JSON 404.
pub fn create_router(pool: SqlitePool, config: &Config) -> Router {
    let feature_state = features::FeatureState { db: pool.clone() };
    let api_v1 = features::router(feature_state);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(pool)
        .nest("/api/v1", api_v1)
        .fallback(not_found)
        // Outermost first: tracing sees the final status and headers
        .layer(
            ServiceBuilder::new()
                .layer(middleware::tracing_layer())
                .layer(middleware::cors_layer(&config.cors))
                .layer(CompressionLayer::new()),
        )
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Claims Review Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Health check with a database round trip
async fn health_check(State(pool): State<SqlitePool>) -> Result<Response, AppError> {
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(AppError::Unavailable("database unreachable".to_string()))
        },
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
