//! Per-product statistics page

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use super::views::{ErrorView, StatsView};
use crate::api::types::ApiError;
use crate::domain::{DashboardError, StatsReshaper};

#[derive(Clone)]
pub struct StatsApiState {
    pub reshaper: StatsReshaper,
}

pub fn routes(reshaper: StatsReshaper) -> Router {
    Router::new()
        .route("/stats/{case_type}", get(stats))
        .with_state(StatsApiState { reshaper })
}

/// Render time, in the same shape the refresh job stamps its timestamps
fn now_as_of() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

async fn stats(State(state): State<StatsApiState>, Path(case_type): Path<String>) -> Response {
    match state.reshaper.reshape(&case_type).await {
        Ok(report) => Json(StatsView::new(report, now_as_of())).into_response(),
        // The page script reads this exact body
        Err(e @ DashboardError::UnknownCaseType(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorView {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
