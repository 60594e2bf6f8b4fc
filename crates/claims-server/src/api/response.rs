//! API response types
//!
//! Every endpoint answers with `{"success": true, "data": ...}` or
//! `{"success": false, "error": {"code": ..., "message": ...}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new success response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    /// Create a success response with metadata
    pub fn success_with_meta(data: T, meta: serde_json::Value) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an error response with details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Pair the body with a status code
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(ApiResponse::success(json!({"id": 1}))).unwrap();
        assert_eq!(value, json!({"success": true, "data": {"id": 1}}));
    }

    #[test]
    fn test_meta_is_kept() {
        let value = serde_json::to_value(ApiResponse::success_with_meta(
            Vec::<i64>::new(),
            json!({"pagination": {"page": 1}}),
        ))
        .unwrap();
        assert_eq!(value["meta"]["pagination"]["page"], 1);
    }

    #[test]
    fn test_error_shape() {
        let value = serde_json::to_value(ErrorResponse::new("NOT_FOUND", "Claim 7 not found")).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": {"code": "NOT_FOUND", "message": "Claim 7 not found"}})
        );

        let detailed =
            serde_json::to_value(ErrorResponse::with_details("VALIDATION_ERROR", "bad", json!(["x"])))
                .unwrap();
        assert_eq!(detailed["error"]["details"][0], "x");
    }
}
