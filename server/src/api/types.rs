//! Shared API types
//!
//! Error responses are JSON `{"error", "code", "message"}` documents.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::data::RefreshError;
use crate::domain::DashboardError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::UnknownCaseType(_) => {
                Self::bad_request("UNKNOWN_CASE_TYPE", e.to_string())
            }
            DashboardError::UpstreamDataShape { .. } | DashboardError::MalformedHistory(_) => {
                tracing::error!(error = %e, "Cached stats are malformed");
                Self::internal(e.to_string())
            }
            DashboardError::Cache(ref inner) => {
                tracing::error!(error = %inner, "Cache error");
                Self::service_unavailable("Cache is unavailable")
            }
        }
    }
}

impl From<RefreshError> for ApiError {
    fn from(e: RefreshError) -> Self {
        match e {
            RefreshError::Disabled => Self::service_unavailable(e.to_string()),
            RefreshError::Request(_) | RefreshError::Status(_) => {
                tracing::error!(error = %e, "Cache refresh failed");
                Self::service_unavailable(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "SERVICE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;
    use crate::data::CacheError;
    use crate::domain::Product;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = body_of(ApiError::not_found("UNKNOWN_PRODUCT", "nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["code"], "UNKNOWN_PRODUCT");
        assert_eq!(body["message"], "nope");
    }

    #[tokio::test]
    async fn test_dashboard_error_mapping() {
        let (status, _) = body_of(
            DashboardError::UpstreamDataShape {
                day: "2024-01-01".to_string(),
                reason: "missing field `bugs`".to_string(),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = body_of(DashboardError::MalformedHistory(Product::Cnv).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = body_of(
            DashboardError::Cache(CacheError::Connection("refused".to_string())).into(),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Cache is unavailable");
    }

    #[tokio::test]
    async fn test_refresh_error_mapping() {
        let (status, body) = body_of(RefreshError::Disabled.into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "No refresh hook configured");

        let (status, _) = body_of(RefreshError::Status(500).into()).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
