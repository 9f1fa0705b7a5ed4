//! Statistics endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::http::error::ApiError;
use crate::models::CongregationStats;
use crate::state::AppState;

/// Most entries returned by GET /api/stats
pub const STATS_LIMIT: usize = 5;

/// GET /api/stats - up to five entries in storage order
#[instrument(skip(state))]
async fn list_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CongregationStats>>, ApiError> {
    let stats = state.repo()?.list::<CongregationStats>(STATS_LIMIT).await?;
    tracing::debug!(count = stats.len(), "stats loaded");
    Ok(Json(stats))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/stats", get(list_stats))
}
