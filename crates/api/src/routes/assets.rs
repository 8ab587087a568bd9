use axum::routing::get;
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Stored asset routes mounted at `/assets`.
///
/// ```text
/// GET /{*key}  -> get_asset
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{*key}", get(assets::get_asset))
}
