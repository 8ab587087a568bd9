pub mod admin;
pub mod assets;
pub mod health;
pub mod kiosk;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /frames                                   kiosk: available frames
/// /settings                                 kiosk: current settings
/// /photos                                   paginated finished photos
/// /photos/carousel                          newest photos for the attract screen
/// /photos/{id}/qr                           QR code for a photo's download page
/// /qr?url=                                  QR code for any URL
/// /capture                                  upload a shot, composite with a frame (POST)
/// /email                                    email a finished photo (POST)
///
/// /admin/frames                             list, upload
/// /admin/frames/{id}                        update, delete
/// /admin/frames/{id}/toggle                 flip availability (POST)
/// /admin/frames/{id}/clean-grid             colour-key background strip (POST)
/// /admin/frames/{id}/remove-background      model-based background strip (POST)
/// /admin/photos                             list, batch delete
/// /admin/photos/{id}                        delete
/// /admin/settings                           update settings (PUT)
/// /admin/email-config                       get, update
/// /admin/email-logs                         attempt log, newest first
/// /admin/email-logs/{id}/resend             repeat an attempt (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(kiosk::router())
        .nest("/admin", admin::router())
}
