//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware;
use super::routes::{dashboard, health, refresh, stats};
use crate::core::CoreApp;
use crate::data::{CacheService, DashboardSource, RefreshService};
use crate::domain::{SnapshotLoader, StatsReshaper};

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until the shutdown signal fires and in-flight requests drain
    pub async fn start(self) -> Result<()> {
        let Self { app } = self;
        let shutdown = app.shutdown.clone();

        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);
        let router = router(app.cache.clone(), app.source.clone(), app.refresh.clone());

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "Listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(())
    }
}

/// Full application router
pub fn router(
    cache: Arc<CacheService>,
    source: Arc<dyn DashboardSource>,
    refresh: Arc<RefreshService>,
) -> Router {
    Router::new()
        .merge(dashboard::routes(SnapshotLoader::new(source.clone())))
        .merge(stats::routes(StatsReshaper::new(source)))
        .merge(refresh::routes(refresh))
        .merge(health::routes(cache))
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::data::CachedDashboardSource;
    use crate::data::refresh::DisabledRefresh;
    use crate::data::source::tests::memory_cache;

    async fn app_router() -> Router {
        let cache = memory_cache().await;
        let source = Arc::new(CachedDashboardSource::new(cache.clone()));
        let refresh = Arc::new(RefreshService::new(Arc::new(DisabledRefresh), Vec::new()));
        router(cache, source, refresh)
    }

    async fn status_of(uri: &str) -> StatusCode {
        app_router()
            .await
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_all_routes_mounted() {
        assert_eq!(status_of("/").await, StatusCode::OK);
        assert_eq!(status_of("/trends").await, StatusCode::OK);
        assert_eq!(status_of("/updates/telco5g").await, StatusCode::OK);
        assert_eq!(status_of("/updates/cnv/all").await, StatusCode::OK);
        assert_eq!(status_of("/updates/cnv/severity").await, StatusCode::OK);
        assert_eq!(status_of("/updates/telco5g/all/severity").await, StatusCode::OK);
        assert_eq!(status_of("/stats/cnv").await, StatusCode::OK);
        assert_eq!(status_of("/api/v1/health").await, StatusCode::OK);
        assert_eq!(status_of("/refresh").await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let response = app_router()
            .await
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "not_found");
    }
}
