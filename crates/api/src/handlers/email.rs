//! Emailing finished photos and the attempt log.
//!
//! Every attempt that reaches the mail transport is logged by
//! [`PhotoMailer`](photobooth_notify::PhotoMailer), success or not. A failed
//! delivery answers 502 `DELIVERY_FAILED` after the entry is written, so the
//! admin panel can resend it later without a new capture.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use photobooth_core::pagination::clamp_limit;
use photobooth_core::types::RecordId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub to: String,
    #[serde(alias = "photoId")]
    pub photo_id: RecordId,
}

/// POST /api/v1/email
pub async fn send_email(
    State(state): State<AppState>,
    Json(input): Json<SendEmailRequest>,
) -> AppResult<impl IntoResponse> {
    let entry = state.mailer.send(input.to.trim(), input.photo_id).await?;
    Ok(Json(DataResponse { data: entry }))
}

/// GET /api/v1/admin/email-logs?limit=
pub async fn list_email_logs(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let logs = state.store.list_email_logs(clamp_limit(params.limit)).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// POST /api/v1/admin/email-logs/{id}/resend
///
/// Appends a new entry pointing at the original; the original is not
/// modified.
pub async fn resend_email(
    State(state): State<AppState>,
    Path(log_id): Path<RecordId>,
) -> AppResult<impl IntoResponse> {
    let entry = state.mailer.resend(log_id).await?;
    Ok(Json(DataResponse { data: entry }))
}
