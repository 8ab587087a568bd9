//! Finished photos: a captured shot composited with a frame.

use photobooth_core::pagination::Chronological;
use photobooth_core::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// A composited photo. Immutable once created; only deletion is allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedPhoto {
    /// Time-ordered (v7) id.
    pub id: RecordId,
    /// File name, `photo-{millis}-{suffix}.png`.
    pub name: String,
    pub asset_key: String,
    #[serde(default)]
    pub asset_url: String,
    pub created_at: Timestamp,
}

impl Chronological for FinishedPhoto {
    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn record_id(&self) -> RecordId {
        self.id
    }
}
