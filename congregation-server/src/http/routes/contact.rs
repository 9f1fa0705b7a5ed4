//! Contact form endpoint

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::http::error::ApiError;
use crate::http::extractors::ValidJson;
use crate::models::ContactMessage;
use crate::state::AppState;

/// Acknowledgement for a stored message
#[derive(Debug, Serialize)]
pub struct ContactAck {
    pub status: &'static str,
    pub id: String,
}

/// POST /api/contact - validate and store one message
#[instrument(skip(state, payload))]
async fn submit_contact(
    State(state): State<Arc<AppState>>,
    ValidJson(payload): ValidJson<ContactMessage>,
) -> Result<Json<ContactAck>, ApiError> {
    let id = state
        .repo()?
        .create(&payload)
        .await
        .map_err(ApiError::Insert)?;

    Ok(Json(ContactAck { status: "ok", id }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/contact", post(submit_contact))
}
