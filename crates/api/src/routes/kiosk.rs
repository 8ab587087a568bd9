//! Routes used by the kiosk screen itself.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{capture, email, frames, photos, qr, settings};
use crate::state::AppState;

/// ```text
/// GET  /frames             -> list_available_frames
/// GET  /settings           -> get_settings
/// GET  /photos             -> list_photos
/// GET  /photos/carousel    -> carousel
/// GET  /photos/{id}/qr     -> photo_qr
/// GET  /qr                 -> url_qr
/// POST /capture            -> create_capture
/// POST /email              -> send_email
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/frames", get(frames::list_available_frames))
        .route("/settings", get(settings::get_settings))
        .route("/photos", get(photos::list_photos))
        .route("/photos/carousel", get(photos::carousel))
        .route("/photos/{id}/qr", get(qr::photo_qr))
        .route("/qr", get(qr::url_qr))
        .route("/capture", post(capture::create_capture))
        .route("/email", post(email::send_email))
}
