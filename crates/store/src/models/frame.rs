//! Frame records: decorative overlays offered on the kiosk.

use photobooth_core::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// A decorative overlay image and its kiosk availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: RecordId,
    /// Display name, usually the uploaded file name.
    pub name: String,
    /// Key of the image asset in the blob store.
    pub asset_key: String,
    /// Public URL of the asset. Recomputed on every read.
    #[serde(default)]
    pub asset_url: String,
    /// Whether the kiosk offers this frame for selection.
    #[serde(default = "default_available")]
    pub available: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn default_available() -> bool {
    true
}

/// Partial update applied by the admin panel. Absent fields are untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameChanges {
    pub name: Option<String>,
    pub available: Option<bool>,
}

impl FrameChanges {
    pub fn availability(available: bool) -> Self {
        Self {
            name: None,
            available: Some(available),
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            available: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.available.is_none()
    }
}
