//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every error body has the shape `{"detail": "<message>"}` so existing
//! ANP clients, which expect that field on auth failures and missing
//! resources alike, keep working. Internal details never reach clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use anp_wba::WbaError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable failure description.
    pub detail: String,
}

impl ErrorBody {
    /// Render a status + detail pair as a response.
    pub fn response(status: StatusCode, detail: impl Into<String>) -> Response {
        (
            status,
            Json(ErrorBody {
                detail: detail.into(),
            }),
        )
            .into_response()
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request is syntactically valid but unacceptable (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let detail = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal server error occurred".to_string()
            }
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Unauthorized(msg)
            | Self::Forbidden(msg) => msg.clone(),
        };

        ErrorBody::response(status, detail)
    }
}

/// Auth failures map through the verifier's status codes; internal kinds
/// collapse to the generic 500 detail.
impl From<WbaError> for AppError {
    fn from(err: WbaError) -> Self {
        match err.status_code() {
            401 => Self::Unauthorized(err.to_string()),
            403 => Self::Forbidden(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn not_found_has_detail() {
        let (status, body) = response_parts(AppError::NotFound("no such file".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.detail.contains("no such file"));
    }

    #[tokio::test]
    async fn bad_request_has_detail() {
        let (status, body) = response_parts(AppError::BadRequest("wrong extension".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.detail.contains("wrong extension"));
    }

    #[tokio::test]
    async fn unauthorized_has_detail() {
        let (status, body) =
            response_parts(AppError::Unauthorized("missing authorization header".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.detail.contains("missing"));
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("pem unreadable".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            !body.detail.contains("pem"),
            "internal details must not leak: {}",
            body.detail
        );
    }

    #[test]
    fn wba_errors_map_by_status() {
        let err = AppError::from(WbaError::MissingCredential);
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = AppError::from(WbaError::UnauthorizedPrincipal("did:wba:x:y".into()));
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = AppError::from(WbaError::Internal("boom".into()));
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn error_body_serializes_as_detail() {
        let body = ErrorBody {
            detail: "nope".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "nope"}));
    }
}
