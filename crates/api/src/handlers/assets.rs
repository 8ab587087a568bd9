//! Serving stored frame and photo images.

use axum::extract::{Path, State};
use photobooth_store::blob::content_type_for;

use crate::error::AppResult;
use crate::response::ImageResponse;
use crate::state::AppState;

/// GET /assets/{*key}
///
/// Stream a stored frame or photo. Only `frames/` and `photos/` keys are
/// served; metadata documents are not reachable from here.
pub async fn get_asset(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ImageResponse> {
    let bytes = state.store.read_asset(&key).await?;
    Ok(ImageResponse {
        content_type: content_type_for(&key),
        bytes,
        cacheable: true,
    })
}
