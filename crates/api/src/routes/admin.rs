//! Admin panel routes mounted at `/admin`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{email, frames, photos, settings};
use crate::state::AppState;

/// ```text
/// GET    /frames                            -> list_frames
/// POST   /frames                            -> upload_frame
/// PUT    /frames/{id}                       -> update_frame
/// DELETE /frames/{id}                       -> delete_frame
/// POST   /frames/{id}/toggle                -> toggle_frame
/// POST   /frames/{id}/clean-grid            -> clean_grid
/// POST   /frames/{id}/remove-background     -> remove_background
/// GET    /photos                            -> list_photos
/// DELETE /photos                            -> delete_photos
/// DELETE /photos/{id}                       -> delete_photo
/// PUT    /settings                          -> update_settings
/// GET    /email-config                      -> get_email_config
/// PUT    /email-config                      -> update_email_config
/// GET    /email-logs                        -> list_email_logs
/// POST   /email-logs/{id}/resend            -> resend_email
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/frames",
            get(frames::list_frames).post(frames::upload_frame),
        )
        .route(
            "/frames/{id}",
            put(frames::update_frame).delete(frames::delete_frame),
        )
        .route("/frames/{id}/toggle", post(frames::toggle_frame))
        .route("/frames/{id}/clean-grid", post(frames::clean_grid))
        .route(
            "/frames/{id}/remove-background",
            post(frames::remove_background),
        )
        .route(
            "/photos",
            get(photos::list_photos).delete(photos::delete_photos),
        )
        .route("/photos/{id}", axum::routing::delete(photos::delete_photo))
        .route("/settings", put(settings::update_settings))
        .route(
            "/email-config",
            get(settings::get_email_config).put(settings::update_email_config),
        )
        .route("/email-logs", get(email::list_email_logs))
        .route("/email-logs/{id}/resend", post(email::resend_email))
}
