use std::sync::Arc;

use photobooth_notify::PhotoMailer;
use photobooth_pipeline::Segmenter;
use photobooth_store::AssetStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Frames, photos, settings and the email log. Handlers never know
    /// which backend sits behind it.
    pub store: Arc<dyn AssetStore>,
    pub config: Arc<ServerConfig>,
    pub mailer: Arc<PhotoMailer>,
    /// Used by model-based background removal.
    pub segmenter: Arc<dyn Segmenter>,
}
