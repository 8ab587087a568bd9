//! Handlers for frame listing and the admin frame screens.
//!
//! Background removal rewrites the frame's asset in place. There is no
//! backup; the previous image is gone once the request succeeds.

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photobooth_core::types::RecordId;
use photobooth_pipeline::{remove_background as segment_and_mask, ColorKey};
use photobooth_store::models::FrameChanges;
use serde::Deserialize;

use crate::error::{join_error, AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the frame image.
const FRAME_FIELD: &str = "frame";

/// Optional body of the colour-key endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CleanGridRequest {
    /// `#rrggbb` colours to strip. The light checkerboard tones when absent.
    pub keys: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Kiosk
// ---------------------------------------------------------------------------

/// GET /api/v1/frames
///
/// Frames currently offered on the kiosk.
pub async fn list_available_frames(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let frames = state.store.list_available_frames().await?;
    Ok(Json(DataResponse { data: frames }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/frames
pub async fn list_frames(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let frames = state.store.list_frames().await?;
    Ok(Json(DataResponse { data: frames }))
}

/// POST /api/v1/admin/frames
///
/// Multipart upload with the image in a `frame` field. The file name
/// becomes the display name.
pub async fn upload_frame(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FRAME_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .ok_or_else(|| AppError::BadRequest("Frame upload needs a file name".into()))?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::BadRequest(format!("Missing '{FRAME_FIELD}' field")))?;
    if image::guess_format(&data).is_err() {
        return Err(AppError::BadRequest(format!(
            "'{file_name}' is not a supported image"
        )));
    }

    let frame = state.store.upload_frame(&file_name, data.to_vec()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: frame })))
}

/// PUT /api/v1/admin/frames/{id}
///
/// Rename and/or change availability.
pub async fn update_frame(
    State(state): State<AppState>,
    Path(frame_id): Path<RecordId>,
    Json(changes): Json<FrameChanges>,
) -> AppResult<impl IntoResponse> {
    if changes.is_empty() {
        return Err(AppError::BadRequest(
            "Nothing to update (expected 'name' or 'available')".into(),
        ));
    }
    let frame = state.store.update_frame(frame_id, &changes).await?;

    tracing::info!(
        frame_id = %frame.id,
        name = %frame.name,
        available = frame.available,
        "Frame updated",
    );
    Ok(Json(DataResponse { data: frame }))
}

/// DELETE /api/v1/admin/frames/{id}
///
/// Removes the image and the record.
pub async fn delete_frame(
    State(state): State<AppState>,
    Path(frame_id): Path<RecordId>,
) -> AppResult<StatusCode> {
    state.store.delete_frame(frame_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/frames/{id}/toggle
pub async fn toggle_frame(
    State(state): State<AppState>,
    Path(frame_id): Path<RecordId>,
) -> AppResult<impl IntoResponse> {
    let frame = state.store.toggle_frame_availability(frame_id).await?;
    tracing::info!(frame_id = %frame.id, available = frame.available, "Frame toggled");
    Ok(Json(DataResponse { data: frame }))
}

/// POST /api/v1/admin/frames/{id}/clean-grid
///
/// Colour-key removal. The body is optional: `{"keys": ["#ffffff", ...]}`.
pub async fn clean_grid(
    State(state): State<AppState>,
    Path(frame_id): Path<RecordId>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let request: CleanGridRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CleanGridRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };
    let key = match request.keys {
        Some(keys) => ColorKey::from_hex(keys.as_slice())?,
        None => ColorKey::default(),
    };

    let (_, source) = state.store.read_frame_asset(frame_id).await?;
    let png = tokio::task::spawn_blocking(move || key.strip_png(&source))
        .await
        .map_err(join_error)??;

    let frame = state.store.replace_frame_asset(frame_id, png).await?;
    tracing::info!(frame_id = %frame.id, "Frame background colour-keyed");
    Ok(Json(DataResponse { data: frame }))
}

/// POST /api/v1/admin/frames/{id}/remove-background
///
/// Model-based removal through the configured segmenter.
pub async fn remove_background(
    State(state): State<AppState>,
    Path(frame_id): Path<RecordId>,
) -> AppResult<impl IntoResponse> {
    let (_, source) = state.store.read_frame_asset(frame_id).await?;
    let png = segment_and_mask(state.segmenter.as_ref(), source).await?;

    let frame = state.store.replace_frame_asset(frame_id, png).await?;
    tracing::info!(
        frame_id = %frame.id,
        segmenter = state.segmenter.name(),
        "Frame background removed",
    );
    Ok(Json(DataResponse { data: frame }))
}
