//! Handlers for finished photo listing and deletion.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photobooth_core::pagination::{clamp_limit, PageCursor};
use photobooth_core::types::RecordId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::CursorParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of the batch delete endpoint.
#[derive(Debug, Deserialize)]
pub struct DeletePhotosRequest {
    pub ids: Vec<RecordId>,
}

/// GET /api/v1/photos and /api/v1/admin/photos
///
/// One page of photos, newest first, with `next_cursor` / `prev_cursor`.
pub async fn list_photos(
    State(state): State<AppState>,
    Query(params): Query<CursorParams>,
) -> AppResult<impl IntoResponse> {
    let cursor = params
        .cursor
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(PageCursor::decode)
        .transpose()?;
    let page = state
        .store
        .list_photos(clamp_limit(params.limit), cursor.as_ref())
        .await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/photos/carousel
///
/// Newest `index_carousel_limit` photos.
pub async fn carousel(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let settings = state.store.get_settings().await?;
    let photos = state
        .store
        .recent_photos(settings.index_carousel_limit as usize)
        .await?;
    Ok(Json(DataResponse { data: photos }))
}

/// DELETE /api/v1/admin/photos/{id}
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<RecordId>,
) -> AppResult<StatusCode> {
    state.store.delete_photo(photo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/photos
///
/// Best-effort batch delete. Always 200; the report lists what failed.
pub async fn delete_photos(
    State(state): State<AppState>,
    Json(input): Json<DeletePhotosRequest>,
) -> AppResult<impl IntoResponse> {
    if input.ids.is_empty() {
        return Err(AppError::BadRequest("'ids' must not be empty".into()));
    }
    let report = state.store.delete_photos(&input.ids).await;

    tracing::info!(
        requested = input.ids.len(),
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "Batch photo delete finished",
    );
    Ok(Json(DataResponse { data: report }))
}
