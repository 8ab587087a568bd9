//! The storage interface used by the HTTP layer, the mailer and startup.

use async_trait::async_trait;
use photobooth_core::pagination::{paginate, Page, PageCursor};
use photobooth_core::types::RecordId;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    EmailLogEntry, EmailTemplateConfig, FinishedPhoto, Frame, FrameChanges, Settings,
};

/// Outcome of a best-effort batch delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchDeleteReport {
    pub deleted: Vec<RecordId>,
    pub failed: Vec<BatchFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub id: RecordId,
    pub error: String,
}

/// Frames, finished photos, settings and the email log behind one
/// backend-neutral interface.
///
/// Every record returned carries a fresh public `asset_url` for the active
/// backend.
#[async_trait]
pub trait AssetStore: Send + Sync {
    // ---- infrastructure ----

    fn backend_name(&self) -> &'static str;

    /// Public URL for an asset key.
    fn asset_url(&self, key: &str) -> String;

    async fn health_check(&self) -> StoreResult<()>;

    /// Raw bytes of any stored asset.
    async fn read_asset(&self, key: &str) -> StoreResult<Vec<u8>>;

    // ---- frames ----

    /// All frames, oldest first.
    async fn list_frames(&self) -> StoreResult<Vec<Frame>>;

    async fn get_frame(&self, id: RecordId) -> StoreResult<Frame>;

    /// Store a new frame image under a fresh id. `file_name` supplies both
    /// the display name and the extension.
    async fn upload_frame(&self, file_name: &str, bytes: Vec<u8>) -> StoreResult<Frame>;

    async fn update_frame(&self, id: RecordId, changes: &FrameChanges) -> StoreResult<Frame>;

    /// Remove the record and its asset.
    async fn delete_frame(&self, id: RecordId) -> StoreResult<()>;

    /// Swap a frame's image for a processed PNG, keeping its id and name.
    async fn replace_frame_asset(&self, id: RecordId, png: Vec<u8>) -> StoreResult<Frame>;

    async fn set_frame_availability(&self, id: RecordId, available: bool) -> StoreResult<Frame> {
        self.update_frame(id, &FrameChanges::availability(available))
            .await
    }

    async fn rename_frame(&self, id: RecordId, name: &str) -> StoreResult<Frame> {
        self.update_frame(id, &FrameChanges::rename(name)).await
    }

    async fn toggle_frame_availability(&self, id: RecordId) -> StoreResult<Frame> {
        let frame = self.get_frame(id).await?;
        self.set_frame_availability(id, !frame.available).await
    }

    /// Frames the kiosk may offer.
    async fn list_available_frames(&self) -> StoreResult<Vec<Frame>> {
        let mut frames = self.list_frames().await?;
        frames.retain(|f| f.available);
        Ok(frames)
    }

    async fn read_frame_asset(&self, id: RecordId) -> StoreResult<(Frame, Vec<u8>)> {
        let frame = self.get_frame(id).await?;
        let bytes = self.read_asset(&frame.asset_key).await?;
        Ok((frame, bytes))
    }

    // ---- photos ----

    /// Persist a composited PNG as a new finished photo.
    async fn save_photo(&self, png: Vec<u8>) -> StoreResult<FinishedPhoto>;

    async fn get_photo(&self, id: RecordId) -> StoreResult<FinishedPhoto>;

    /// Every photo, in no particular order.
    async fn list_all_photos(&self) -> StoreResult<Vec<FinishedPhoto>>;

    async fn delete_photo(&self, id: RecordId) -> StoreResult<()>;

    /// One page of photos, newest first.
    async fn list_photos(
        &self,
        limit: usize,
        cursor: Option<&PageCursor>,
    ) -> StoreResult<Page<FinishedPhoto>> {
        let all = self.list_all_photos().await?;
        Ok(paginate(all, limit, cursor))
    }

    /// Newest `limit` photos.
    async fn recent_photos(&self, limit: usize) -> StoreResult<Vec<FinishedPhoto>> {
        Ok(self.list_photos(limit, None).await?.items)
    }

    /// Delete each photo independently; one failure does not stop the rest.
    async fn delete_photos(&self, ids: &[RecordId]) -> BatchDeleteReport {
        let mut report = BatchDeleteReport::default();
        for &id in ids {
            match self.delete_photo(id).await {
                Ok(()) => report.deleted.push(id),
                Err(e) => {
                    tracing::warn!(photo_id = %id, error = %e, "Batch photo delete failed");
                    report.failed.push(BatchFailure {
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    async fn read_photo_asset(&self, id: RecordId) -> StoreResult<(FinishedPhoto, Vec<u8>)> {
        let photo = self.get_photo(id).await?;
        let bytes = self.read_asset(&photo.asset_key).await?;
        Ok((photo, bytes))
    }

    // ---- settings ----

    /// Current settings, defaults when never saved.
    async fn get_settings(&self) -> StoreResult<Settings>;

    async fn set_settings(&self, settings: &Settings) -> StoreResult<Settings>;

    async fn get_email_config(&self) -> StoreResult<EmailTemplateConfig>;

    async fn set_email_config(
        &self,
        config: &EmailTemplateConfig,
    ) -> StoreResult<EmailTemplateConfig>;

    // ---- email log ----

    async fn append_email_log(&self, entry: &EmailLogEntry) -> StoreResult<()>;

    async fn list_all_email_logs(&self) -> StoreResult<Vec<EmailLogEntry>>;

    /// Newest `limit` attempts first.
    async fn list_email_logs(&self, limit: usize) -> StoreResult<Vec<EmailLogEntry>> {
        let mut logs = self.list_all_email_logs().await?;
        logs.sort_by(|a, b| b.attempted_at.cmp(&a.attempted_at).then(b.id.cmp(&a.id)));
        logs.truncate(limit);
        Ok(logs)
    }

    async fn get_email_log(&self, id: RecordId) -> StoreResult<EmailLogEntry> {
        self.list_all_email_logs()
            .await?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| StoreError::not_found("EmailLogEntry", id))
    }
}
