//! Dashboard pages: landing page, account updates, trends and severity tables

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use super::views::{IndexView, TableView, UpdatesView};
use crate::api::types::ApiError;
use crate::domain::{
    CommentGroup, CommentScope, Product, SnapshotLoader, TrendingSnapshot, severity_table,
};

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct DashboardState {
    pub loader: SnapshotLoader,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(loader: SnapshotLoader) -> Router {
    let state = DashboardState { loader };

    Router::new()
        .route("/", get(index))
        .route("/trends", get(trends))
        .route("/updates/{product}", get(recent_updates))
        .route("/updates/{product}/all", get(all_updates))
        .route("/updates/{product}/severity", get(recent_severity))
        .route("/updates/{product}/all/severity", get(all_severity))
        .with_state(state)
}

fn parse_product(raw: &str) -> Result<Product, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found("UNKNOWN_PRODUCT", format!("Unknown product: {raw}")))
}

/// `telco5g`, `all-telco5g`, `telco5g-severity`, `all-telco5g-severity`
fn page_title(product: Product, scope: CommentScope, severity: bool) -> String {
    let mut title = match scope {
        CommentScope::Recent => product.to_string(),
        CommentScope::All => format!("all-{product}"),
    };
    if severity {
        title.push_str("-severity");
    }
    title
}

// ============================================================================
// Handlers
// ============================================================================

async fn index(State(state): State<DashboardState>) -> Json<IndexView> {
    let snapshot = state.loader.load(&Product::ALL).await;
    Json(IndexView::from(snapshot))
}

async fn trends(State(state): State<DashboardState>) -> Json<UpdatesView> {
    let TrendingSnapshot {
        trending,
        as_of,
        gaps,
        consistent,
    } = state.loader.load_trending().await;

    Json(UpdatesView {
        as_of,
        comments: CommentGroup::group_cards(trending),
        page_title: "trends".to_string(),
        gaps,
        consistent,
    })
}

async fn recent_updates(
    state: State<DashboardState>,
    product: Path<String>,
) -> Result<Json<UpdatesView>, ApiError> {
    updates(state, product, CommentScope::Recent).await
}

async fn all_updates(
    state: State<DashboardState>,
    product: Path<String>,
) -> Result<Json<UpdatesView>, ApiError> {
    updates(state, product, CommentScope::All).await
}

async fn recent_severity(
    state: State<DashboardState>,
    product: Path<String>,
) -> Result<Json<TableView>, ApiError> {
    table(state, product, CommentScope::Recent).await
}

async fn all_severity(
    state: State<DashboardState>,
    product: Path<String>,
) -> Result<Json<TableView>, ApiError> {
    table(state, product, CommentScope::All).await
}

async fn updates(
    State(state): State<DashboardState>,
    Path(product): Path<String>,
    scope: CommentScope,
) -> Result<Json<UpdatesView>, ApiError> {
    let product = parse_product(&product)?;
    let snapshot = state.loader.load(&[product]).await;

    Ok(Json(UpdatesView {
        comments: snapshot.comments(product, scope).to_vec(),
        as_of: snapshot.as_of,
        page_title: page_title(product, scope, false),
        gaps: snapshot.gaps,
        consistent: snapshot.consistent,
    }))
}

async fn table(
    State(state): State<DashboardState>,
    Path(product): Path<String>,
    scope: CommentScope,
) -> Result<Json<TableView>, ApiError> {
    let product = parse_product(&product)?;
    let snapshot = state.loader.load(&[product]).await;

    Ok(Json(TableView {
        rows: severity_table(snapshot.comments(product, scope)),
        as_of: snapshot.as_of,
        page_title: page_title(product, scope, true),
        gaps: snapshot.gaps,
        consistent: snapshot.consistent,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::data::CachedDashboardSource;
    use crate::data::CacheService;
    use crate::data::source::tests::memory_cache;

    fn router(cache: Arc<CacheService>) -> Router {
        routes(SnapshotLoader::new(Arc::new(CachedDashboardSource::new(cache))))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn seeded_cache() -> Arc<CacheService> {
        let cache = memory_cache().await;
        cache
            .set(
                "cases:shift_telco5g",
                &json!([{ "case_number": "03000002", "account": "Beta" }]),
            )
            .await
            .unwrap();
        cache
            .set(
                "comments:recent",
                &json!({
                    "telco5g": [
                        { "account": "Acme", "cards": [
                            { "card": "KNIECO-1", "severity": "3 (Normal)" },
                            { "card": "KNIECO-2", "severity": "1 (Urgent)" }
                        ]},
                        { "account": "Beta", "cards": [
                            { "card": "KNIECO-3", "severity": "2 (High)" }
                        ]}
                    ]
                }),
            )
            .await
            .unwrap();
        cache
            .set(
                "trending_cards",
                &json!([
                    { "card": "KNIECO-4", "account": "Acme" },
                    { "card": "KNIECO-5", "account": "Beta" },
                    { "card": "KNIECO-6", "account": "Acme" }
                ]),
            )
            .await
            .unwrap();
        cache
            .set("timestamp", &"2024-01-02 08:00:00")
            .await
            .unwrap();
        cache
    }

    #[test]
    fn test_page_title() {
        assert_eq!(page_title(Product::Cnv, CommentScope::Recent, false), "cnv");
        assert_eq!(page_title(Product::Cnv, CommentScope::All, false), "all-cnv");
        assert_eq!(
            page_title(Product::Telco5g, CommentScope::Recent, true),
            "telco5g-severity"
        );
        assert_eq!(
            page_title(Product::Telco5g, CommentScope::All, true),
            "all-telco5g-severity"
        );
    }

    #[tokio::test]
    async fn test_index_on_empty_cache() {
        let (status, body) = get_json(router(memory_cache().await), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["new_cnv_cases"], json!([]));
        assert_eq!(body["new_telco_cases"], json!([]));
        assert_eq!(body["plot_series"], json!([]));
        assert_eq!(body["as_of"], Value::Null);
        assert_eq!(body["consistent"], true);
    }

    #[tokio::test]
    async fn test_index_with_data() {
        let (status, body) = get_json(router(seeded_cache().await), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["new_telco_cases"][0]["case_number"], "03000002");
        assert_eq!(body["new_cnv_cases"], json!([]));
        assert_eq!(body["as_of"], "2024-01-02 08:00:00");
    }

    #[tokio::test]
    async fn test_recent_updates() {
        let (status, body) = get_json(router(seeded_cache().await), "/updates/telco5g").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page_title"], "telco5g");
        assert_eq!(body["comments"][0]["account"], "Acme");
        assert_eq!(body["comments"][1]["account"], "Beta");
    }

    #[tokio::test]
    async fn test_all_updates_missing_is_empty() {
        let (status, body) = get_json(router(seeded_cache().await), "/updates/cnv/all").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page_title"], "all-cnv");
        assert_eq!(body["comments"], json!([]));
        assert!(body["gaps"]["missing"]
            .as_array()
            .unwrap()
            .contains(&json!("comments:all")));
    }

    #[tokio::test]
    async fn test_trends_grouped_by_account() {
        let (status, body) = get_json(router(seeded_cache().await), "/trends").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page_title"], "trends");
        assert_eq!(body["comments"][0]["account"], "Acme");
        assert_eq!(body["comments"][0]["cards"].as_array().unwrap().len(), 2);
        assert_eq!(body["comments"][1]["account"], "Beta");
    }

    #[tokio::test]
    async fn test_trends_gaps_name_only_trends_data() {
        let (status, body) = get_json(router(memory_cache().await), "/trends").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["comments"], json!([]));
        assert_eq!(body["gaps"]["missing"], json!(["trending", "timestamp"]));
        assert_eq!(body["gaps"]["failed"], json!([]));
    }

    #[tokio::test]
    async fn test_severity_table_sorted() {
        let (status, body) =
            get_json(router(seeded_cache().await), "/updates/telco5g/severity").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page_title"], "telco5g-severity");
        let cards: Vec<&str> = body["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["card"]["card"].as_str().unwrap())
            .collect();
        assert_eq!(cards, vec!["KNIECO-2", "KNIECO-3", "KNIECO-1"]);
    }

    #[tokio::test]
    async fn test_all_severity_title() {
        let (status, body) =
            get_json(router(seeded_cache().await), "/updates/cnv/all/severity").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page_title"], "all-cnv-severity");
        assert_eq!(body["rows"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (status, body) = get_json(router(memory_cache().await), "/updates/openshift").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNKNOWN_PRODUCT");
    }
}
