//! API error types with IntoResponse
//!
//! Errors are converted to responses with the status codes and `detail`
//! bodies the website expects.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::{ReadError, StoreError};
use crate::models::ValidationErrors;

/// Detail returned when no store is configured
pub const NOT_CONFIGURED_DETAIL: &str = "Database not configured";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// No store handle (500)
    NotConfigured,

    /// Request body failed validation (422)
    Validation(ValidationErrors),

    /// Insert failed (500, raw error text as detail)
    Insert(StoreError),

    /// Request body could not be read (status taken from the rejection)
    Rejected { status: StatusCode, message: String },

    /// Anything not handled above (500, plain text, logged)
    Unhandled { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": NOT_CONFIGURED_DETAIL })),
            )
                .into_response(),
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": errors.into_errors() })),
            )
                .into_response(),
            Self::Insert(e) => {
                tracing::error!("Insert failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": e.to_string() })),
                )
                    .into_response()
            }
            Self::Rejected { status, message } => {
                (status, Json(json!({ "detail": message }))).into_response()
            }
            Self::Unhandled { message } => {
                tracing::error!("Unhandled error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl From<ReadError> for ApiError {
    fn from(e: ReadError) -> Self {
        Self::Unhandled {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use crate::models::FieldError;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_configured_is_500_with_detail() {
        let response = ApiError::NotConfigured.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "detail": "Database not configured" }));
    }

    #[tokio::test]
    async fn validation_error_is_422_with_field_list() {
        let errors = ValidationErrors::new(vec![FieldError::new(
            "missing",
            "email",
            "Field required",
            json!({}),
        )])
        .located_at("body");

        let response = ApiError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["detail"][0]["type"], "missing");
        assert_eq!(body["detail"][0]["loc"], json!(["body", "email"]));
        assert!(body["detail"][0].get("ctx").is_none());
    }

    #[tokio::test]
    async fn insert_error_surfaces_raw_text() {
        let err = ApiError::Insert(StoreError::Backend("connection refused".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "detail": "connection refused" }));
    }

    #[tokio::test]
    async fn rejection_keeps_its_status() {
        let err = ApiError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await, json!({ "detail": "length limit exceeded" }));
    }

    #[tokio::test]
    async fn unhandled_is_plain_500() {
        let err = ApiError::Unhandled {
            message: "secret detail".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Internal Server Error");
    }
}
