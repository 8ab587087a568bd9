//! [`AssetStore`] over any [`BlobStore`], with metadata kept as JSON
//! documents under `db/`.
//!
//! Each collection is a single document that is read, modified and written
//! back whole. A store-wide async mutex serialises those read-modify-write
//! cycles so concurrent requests in one process never lose updates.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use photobooth_core::error::CoreError;
use photobooth_core::naming::{
    frame_asset_key, photo_asset_key, photo_file_name, sanitize_display_name,
    validate_asset_key, validate_image_file_name, FRAMES_PREFIX, PHOTOS_PREFIX,
};
use photobooth_core::types::{new_record_id, RecordId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::asset_store::AssetStore;
use crate::blob::{content_type_for, BlobStore};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    EmailLogEntry, EmailTemplateConfig, FinishedPhoto, Frame, FrameChanges, Settings,
};

const FRAMES_DOC: &str = "db/frames.json";
const PHOTOS_DOC: &str = "db/photos.json";
const EMAIL_LOG_DOC: &str = "db/email_logs.json";
const SETTINGS_DOC: &str = "db/settings.json";
const EMAIL_CONFIG_DOC: &str = "db/email_config.json";

/// Result of reconciling frame records with the stored frame images.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameSyncReport {
    /// Images found without a record, now registered.
    pub adopted: Vec<Frame>,
    /// Records whose image was missing, now removed.
    pub dropped: Vec<Frame>,
}

impl FrameSyncReport {
    pub fn is_noop(&self) -> bool {
        self.adopted.is_empty() && self.dropped.is_empty()
    }
}

pub struct DocumentStore<B> {
    blobs: B,
    write_lock: Mutex<()>,
}

impl<B: BlobStore> DocumentStore<B> {
    pub fn new(blobs: B) -> Self {
        Self {
            blobs,
            write_lock: Mutex::new(()),
        }
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Bring the frame collection in line with the images under `frames/`.
    ///
    /// Run once at startup so frames dropped into storage by hand show up
    /// and records of deleted files disappear.
    pub async fn sync_frames(&self) -> StoreResult<FrameSyncReport> {
        let _guard = self.write_lock.lock().await;

        let keys = self.blobs.list(&format!("{FRAMES_PREFIX}/")).await?;
        let present: HashSet<&str> = keys.iter().map(String::as_str).collect();

        let frames: Vec<Frame> = self.load_list(FRAMES_DOC).await?;
        let (mut kept, dropped): (Vec<Frame>, Vec<Frame>) = frames
            .into_iter()
            .partition(|f| present.contains(f.asset_key.as_str()));

        let known: HashSet<String> = kept.iter().map(|f| f.asset_key.clone()).collect();
        let now = Utc::now();
        let mut adopted = Vec::new();
        for key in &keys {
            if known.contains(key) {
                continue;
            }
            let file_name = key.rsplit('/').next().unwrap_or(key);
            if validate_image_file_name(file_name).is_err() {
                continue;
            }
            let frame = Frame {
                id: new_record_id(),
                name: sanitize_display_name(file_name)?,
                asset_key: key.clone(),
                asset_url: String::new(),
                available: true,
                created_at: now,
                updated_at: now,
            };
            adopted.push(frame.clone());
            kept.push(frame);
        }

        let report = FrameSyncReport {
            adopted: adopted.into_iter().map(|f| self.hydrate_frame(f)).collect(),
            dropped: dropped.into_iter().map(|f| self.hydrate_frame(f)).collect(),
        };
        if !report.is_noop() {
            self.save(FRAMES_DOC, &kept).await?;
            tracing::info!(
                adopted = report.adopted.len(),
                dropped = report.dropped.len(),
                "Frame records synchronised with storage",
            );
        }
        Ok(report)
    }

    // ---- document helpers ----

    async fn load<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.blobs.get(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Vec<T>> {
        Ok(self.load(key).await?.unwrap_or_default())
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.blobs.put(key, bytes, "application/json").await
    }

    /// Append one record to a collection document.
    async fn push_record<T>(&self, key: &str, record: T) -> StoreResult<()>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _guard = self.write_lock.lock().await;
        let mut records: Vec<T> = self.load_list(key).await?;
        records.push(record);
        self.save(key, &records).await
    }

    fn hydrate_frame(&self, mut frame: Frame) -> Frame {
        frame.asset_url = self.blobs.public_url(&frame.asset_key);
        frame
    }

    fn hydrate_photo(&self, mut photo: FinishedPhoto) -> FinishedPhoto {
        photo.asset_url = self.blobs.public_url(&photo.asset_key);
        photo
    }

    async fn delete_asset_quietly(&self, key: &str) {
        if let Err(e) = self.blobs.delete(key).await {
            tracing::warn!(key, error = %e, "Failed to delete asset");
        }
    }
}

#[async_trait]
impl<B: BlobStore> AssetStore for DocumentStore<B> {
    fn backend_name(&self) -> &'static str {
        self.blobs.name()
    }

    fn asset_url(&self, key: &str) -> String {
        self.blobs.public_url(key)
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.blobs.ping().await
    }

    async fn read_asset(&self, key: &str) -> StoreResult<Vec<u8>> {
        validate_asset_key(key)?;
        let public = key.starts_with(&format!("{FRAMES_PREFIX}/"))
            || key.starts_with(&format!("{PHOTOS_PREFIX}/"));
        if !public {
            return Err(StoreError::not_found("Asset", key));
        }
        self.blobs
            .get(key)
            .await?
            .ok_or_else(|| StoreError::not_found("Asset", key))
    }

    // ---- frames ----

    async fn list_frames(&self) -> StoreResult<Vec<Frame>> {
        let mut frames: Vec<Frame> = self.load_list(FRAMES_DOC).await?;
        frames.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(frames.into_iter().map(|f| self.hydrate_frame(f)).collect())
    }

    async fn get_frame(&self, id: RecordId) -> StoreResult<Frame> {
        let frames: Vec<Frame> = self.load_list(FRAMES_DOC).await?;
        frames
            .into_iter()
            .find(|f| f.id == id)
            .map(|f| self.hydrate_frame(f))
            .ok_or_else(|| StoreError::not_found("Frame", id))
    }

    async fn upload_frame(&self, file_name: &str, bytes: Vec<u8>) -> StoreResult<Frame> {
        let ext = validate_image_file_name(file_name)?;
        let name = sanitize_display_name(file_name)?;
        if bytes.is_empty() {
            return Err(CoreError::Validation("Frame image is empty".into()).into());
        }

        let id = new_record_id();
        let key = frame_asset_key(id, &ext);
        self.blobs.put(&key, bytes, content_type_for(&key)).await?;

        let now = Utc::now();
        let frame = Frame {
            id,
            name,
            asset_key: key.clone(),
            asset_url: String::new(),
            available: true,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.push_record(FRAMES_DOC, frame.clone()).await {
            self.delete_asset_quietly(&key).await;
            return Err(e);
        }

        tracing::info!(frame_id = %id, name = %frame.name, "Frame uploaded");
        Ok(self.hydrate_frame(frame))
    }

    async fn update_frame(&self, id: RecordId, changes: &FrameChanges) -> StoreResult<Frame> {
        let name = changes
            .name
            .as_deref()
            .map(sanitize_display_name)
            .transpose()?;

        let _guard = self.write_lock.lock().await;
        let mut frames: Vec<Frame> = self.load_list(FRAMES_DOC).await?;
        let frame = frames
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StoreError::not_found("Frame", id))?;

        if let Some(name) = name {
            frame.name = name;
        }
        if let Some(available) = changes.available {
            frame.available = available;
        }
        frame.updated_at = Utc::now();
        let updated = frame.clone();

        self.save(FRAMES_DOC, &frames).await?;
        Ok(self.hydrate_frame(updated))
    }

    async fn delete_frame(&self, id: RecordId) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut frames: Vec<Frame> = self.load_list(FRAMES_DOC).await?;
        let idx = frames
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| StoreError::not_found("Frame", id))?;
        let removed = frames.remove(idx);
        self.save(FRAMES_DOC, &frames).await?;
        self.delete_asset_quietly(&removed.asset_key).await;

        tracing::info!(frame_id = %id, "Frame deleted");
        Ok(())
    }

    async fn replace_frame_asset(&self, id: RecordId, png: Vec<u8>) -> StoreResult<Frame> {
        let _guard = self.write_lock.lock().await;
        let mut frames: Vec<Frame> = self.load_list(FRAMES_DOC).await?;
        let frame = frames
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StoreError::not_found("Frame", id))?;

        let new_key = frame_asset_key(id, "png");
        self.blobs.put(&new_key, png, "image/png").await?;

        let old_key = std::mem::replace(&mut frame.asset_key, new_key.clone());
        frame.updated_at = Utc::now();
        let updated = frame.clone();
        self.save(FRAMES_DOC, &frames).await?;

        if old_key != new_key {
            self.delete_asset_quietly(&old_key).await;
        }
        Ok(self.hydrate_frame(updated))
    }

    // ---- photos ----

    async fn save_photo(&self, png: Vec<u8>) -> StoreResult<FinishedPhoto> {
        let id = new_record_id();
        let created_at = Utc::now();
        let name = photo_file_name(created_at, id);
        let key = photo_asset_key(&name);
        self.blobs.put(&key, png, "image/png").await?;

        let photo = FinishedPhoto {
            id,
            name,
            asset_key: key.clone(),
            asset_url: String::new(),
            created_at,
        };

        if let Err(e) = self.push_record(PHOTOS_DOC, photo.clone()).await {
            self.delete_asset_quietly(&key).await;
            return Err(e);
        }

        tracing::info!(photo_id = %id, name = %photo.name, "Photo saved");
        Ok(self.hydrate_photo(photo))
    }

    async fn get_photo(&self, id: RecordId) -> StoreResult<FinishedPhoto> {
        let photos: Vec<FinishedPhoto> = self.load_list(PHOTOS_DOC).await?;
        photos
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| self.hydrate_photo(p))
            .ok_or_else(|| StoreError::not_found("Photo", id))
    }

    async fn list_all_photos(&self) -> StoreResult<Vec<FinishedPhoto>> {
        let photos: Vec<FinishedPhoto> = self.load_list(PHOTOS_DOC).await?;
        Ok(photos.into_iter().map(|p| self.hydrate_photo(p)).collect())
    }

    async fn delete_photo(&self, id: RecordId) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut photos: Vec<FinishedPhoto> = self.load_list(PHOTOS_DOC).await?;
        let idx = photos
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("Photo", id))?;
        let removed = photos.remove(idx);
        self.save(PHOTOS_DOC, &photos).await?;
        self.delete_asset_quietly(&removed.asset_key).await;

        tracing::info!(photo_id = %id, "Photo deleted");
        Ok(())
    }

    // ---- settings ----

    async fn get_settings(&self) -> StoreResult<Settings> {
        Ok(self.load(SETTINGS_DOC).await?.unwrap_or_default())
    }

    async fn set_settings(&self, settings: &Settings) -> StoreResult<Settings> {
        settings.check()?;
        let _guard = self.write_lock.lock().await;
        self.save(SETTINGS_DOC, settings).await?;
        tracing::info!(?settings, "Settings updated");
        Ok(*settings)
    }

    async fn get_email_config(&self) -> StoreResult<EmailTemplateConfig> {
        Ok(self.load(EMAIL_CONFIG_DOC).await?.unwrap_or_default())
    }

    async fn set_email_config(
        &self,
        config: &EmailTemplateConfig,
    ) -> StoreResult<EmailTemplateConfig> {
        config.check()?;
        let _guard = self.write_lock.lock().await;
        self.save(EMAIL_CONFIG_DOC, config).await?;
        tracing::info!("Email template updated");
        Ok(config.clone())
    }

    // ---- email log ----

    async fn append_email_log(&self, entry: &EmailLogEntry) -> StoreResult<()> {
        self.push_record(EMAIL_LOG_DOC, entry.clone()).await
    }

    async fn list_all_email_logs(&self) -> StoreResult<Vec<EmailLogEntry>> {
        self.load_list(EMAIL_LOG_DOC).await
    }
}
