//! Turning an uploaded shot into a finished photo.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use photobooth_core::types::RecordId;
use photobooth_pipeline::{composite_png, CompositeOptions, FitPolicy};

use crate::error::{join_error, AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Parsed `POST /capture` form.
struct CaptureForm {
    photo: Bytes,
    frame_id: RecordId,
    policy: Option<FitPolicy>,
}

impl CaptureForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut photo = None;
        let mut frame_id = None;
        let mut policy = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "photo" => {
                    photo = Some(
                        field
                            .bytes()
                            .await
                            .map_err(|e| AppError::BadRequest(e.to_string()))?,
                    );
                }
                "frame_id" | "frameId" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    let id = RecordId::parse_str(text.trim()).map_err(|_| {
                        AppError::BadRequest(format!("Invalid frame id '{}'", text.trim()))
                    })?;
                    frame_id = Some(id);
                }
                "policy" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !text.trim().is_empty() {
                        policy = Some(text.parse::<FitPolicy>()?);
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            photo: photo.ok_or_else(|| AppError::BadRequest("Missing 'photo' field".into()))?,
            frame_id: frame_id
                .ok_or_else(|| AppError::BadRequest("Missing 'frame_id' field".into()))?,
            policy,
        })
    }
}

/// POST /api/v1/capture
///
/// Multipart form: `photo` (the chosen shot), `frame_id`, optional `policy`
/// (`cover` or `blur-pad`, the configured default otherwise). Composites
/// the shot with the frame and stores the result as a finished photo.
///
/// A missing frame is a 404 and an unreadable image a 422; nothing is
/// stored in either case.
pub async fn create_capture(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = CaptureForm::read(multipart).await?;
    let policy = form.policy.unwrap_or(state.config.composite_policy);

    let (frame, frame_bytes) = state.store.read_frame_asset(form.frame_id).await?;
    let options = CompositeOptions::with_policy(policy);
    let photo_bytes = form.photo;
    let png = tokio::task::spawn_blocking(move || {
        composite_png(&photo_bytes, &frame_bytes, &options)
    })
    .await
    .map_err(join_error)??;

    let photo = state.store.save_photo(png).await?;
    tracing::info!(
        photo_id = %photo.id,
        frame_id = %frame.id,
        policy = %policy,
        "Finished photo created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: photo })))
}
