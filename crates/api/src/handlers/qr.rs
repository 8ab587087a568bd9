use axum::extract::{Path, Query, State};
use photobooth_core::types::RecordId;
use photobooth_notify::qr::{DEFAULT_MODULE_PX, DEFAULT_QUIET_ZONE};
use photobooth_notify::{download_link, render_qr_png};
use serde::Deserialize;

use crate::error::{join_error, AppResult};
use crate::response::ImageResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QrParams {
    pub url: String,
}

/// GET /api/v1/photos/{id}/qr
///
/// QR code for the photo's download page under `PUBLIC_BASE_URL`.
pub async fn photo_qr(
    State(state): State<AppState>,
    Path(photo_id): Path<RecordId>,
) -> AppResult<ImageResponse> {
    let photo = state.store.get_photo(photo_id).await?;
    let link = download_link(&state.config.public_base_url, &photo.asset_url);
    tracing::debug!(photo_id = %photo.id, link = %link, "Rendering download QR");
    render(link).await
}

/// GET /api/v1/qr?url=
pub async fn url_qr(Query(params): Query<QrParams>) -> AppResult<ImageResponse> {
    render(params.url).await
}

async fn render(data: String) -> AppResult<ImageResponse> {
    let png = tokio::task::spawn_blocking(move || {
        render_qr_png(&data, DEFAULT_MODULE_PX, DEFAULT_QUIET_ZONE)
    })
    .await
    .map_err(join_error)??;
    Ok(ImageResponse::png(png))
}
