//! Gallery endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::http::error::ApiError;
use crate::models::GalleryImage;
use crate::state::AppState;

/// Most images returned by GET /api/gallery
pub const GALLERY_LIMIT: usize = 8;

/// GET /api/gallery - up to eight images, ascending by `order`
///
/// The cap is applied by the store before sorting.
#[instrument(skip(state))]
async fn list_gallery(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GalleryImage>>, ApiError> {
    let mut images = state.repo()?.list::<GalleryImage>(GALLERY_LIMIT).await?;
    GalleryImage::sort_for_display(&mut images);
    tracing::debug!(count = images.len(), "gallery loaded");
    Ok(Json(images))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/gallery", get(list_gallery))
}
