//! Health check endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::data::CacheService;

#[derive(Serialize)]
pub struct CacheHealth {
    pub backend: &'static str,
    pub healthy: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub cache: CacheHealth,
}

#[derive(Clone)]
pub struct HealthState {
    pub cache: Arc<CacheService>,
}

pub fn routes(cache: Arc<CacheService>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .with_state(HealthState { cache })
}

/// Health check endpoint. Answers 503 while the cache is unreachable.
pub async fn health(State(state): State<HealthState>) -> impl IntoResponse {
    let healthy = match state.cache.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Cache health check failed");
            false
        }
    };
    let (code, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            cache: CacheHealth {
                backend: state.cache.backend_name(),
                healthy,
            },
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::data::source::tests::{FailingBackend, memory_cache};

    async fn check(cache: Arc<CacheService>) -> (StatusCode, Value) {
        let response = routes(cache)
            .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_ok() {
        let (status, body) = check(memory_cache().await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["cache"]["backend"], "memory");
        assert_eq!(body["cache"]["healthy"], true);
    }

    #[tokio::test]
    async fn test_health_degraded_when_cache_down() {
        let cache = Arc::new(CacheService::from_backend(Arc::new(FailingBackend)));
        let (status, body) = check(cache).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["cache"]["backend"], "failing");
    }
}
