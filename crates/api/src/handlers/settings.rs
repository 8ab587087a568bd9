//! Handlers for the kiosk settings and the email template.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use photobooth_store::models::{EmailTemplateConfig, Settings};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let settings = state.store.get_settings().await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/admin/settings
///
/// Whole replacement; omitted fields fall back to their defaults.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<Settings>,
) -> AppResult<impl IntoResponse> {
    let settings = state.store.set_settings(&input).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// GET /api/v1/admin/email-config
pub async fn get_email_config(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let config = state.store.get_email_config().await?;
    Ok(Json(DataResponse { data: config }))
}

/// PUT /api/v1/admin/email-config
///
/// The template must contain the `{{photoUrl}}` placeholder.
pub async fn update_email_config(
    State(state): State<AppState>,
    Json(input): Json<EmailTemplateConfig>,
) -> AppResult<impl IntoResponse> {
    let config = state.store.set_email_config(&input).await?;
    Ok(Json(DataResponse { data: config }))
}
