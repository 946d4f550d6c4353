//! Cache refresh endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use crate::api::types::ApiError;
use crate::data::RefreshService;

/// Page shown once a refresh completes
const AFTER_REFRESH: &str = "/updates/telco5g";

#[derive(Clone)]
pub struct RefreshApiState {
    pub refresh: Arc<RefreshService>,
}

pub fn routes(refresh: Arc<RefreshService>) -> Router {
    Router::new()
        .route("/refresh", get(refresh_cache))
        .with_state(RefreshApiState { refresh })
}

/// Waits for the refresh job, then `303`s to the telco5g updates page
async fn refresh_cache(State(state): State<RefreshApiState>) -> Result<Redirect, ApiError> {
    state.refresh.refresh().await?;
    Ok(Redirect::to(AFTER_REFRESH))
}
