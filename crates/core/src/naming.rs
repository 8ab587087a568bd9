//! Asset key naming.
//!
//! Keys are relative, slash-separated object names shared by every storage
//! backend: `frames/{id}.{ext}` for frame art and
//! `photos/photo-{millis}-{suffix}.png` for finished photos.

use crate::error::CoreError;
use crate::types::{RecordId, Timestamp};

/// Key prefix for frame assets.
pub const FRAMES_PREFIX: &str = "frames";

/// Key prefix for finished photo assets.
pub const PHOTOS_PREFIX: &str = "photos";

/// Image extensions accepted for frame uploads.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Maximum length of a frame display name.
const MAX_DISPLAY_NAME_LEN: usize = 120;

/// Lower-cased extension of a file name, if any.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Validate that an uploaded file name carries a supported image extension.
pub fn validate_image_file_name(file_name: &str) -> Result<String, CoreError> {
    match extension_of(file_name) {
        Some(ext) if SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        Some(ext) => Err(CoreError::Validation(format!(
            "Unsupported image format '.{ext}'. Supported: {}",
            SUPPORTED_IMAGE_EXTENSIONS.join(", ")
        ))),
        None => Err(CoreError::Validation(format!(
            "File name '{file_name}' has no image extension"
        ))),
    }
}

/// Key under which a frame's asset is stored.
///
/// ```
/// use photobooth_core::naming::frame_asset_key;
///
/// let id = uuid::Uuid::nil();
/// assert_eq!(
///     frame_asset_key(id, "png"),
///     "frames/00000000-0000-0000-0000-000000000000.png"
/// );
/// ```
pub fn frame_asset_key(id: RecordId, ext: &str) -> String {
    format!("{FRAMES_PREFIX}/{id}.{ext}")
}

/// File name of a finished photo: creation millis plus the random tail of
/// its id, so two photos taken in the same millisecond never collide.
pub fn photo_file_name(created_at: Timestamp, id: RecordId) -> String {
    let simple = id.simple().to_string();
    format!(
        "photo-{}-{}.png",
        created_at.timestamp_millis(),
        &simple[simple.len() - 8..]
    )
}

/// Key under which a finished photo is stored.
pub fn photo_asset_key(file_name: &str) -> String {
    format!("{PHOTOS_PREFIX}/{file_name}")
}

/// Normalize a user-supplied display name: drop any directory part, trim
/// whitespace, cap the length.
pub fn sanitize_display_name(raw: &str) -> Result<String, CoreError> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if base.is_empty() {
        return Err(CoreError::Validation("Name must not be empty".into()));
    }
    Ok(base.chars().take(MAX_DISPLAY_NAME_LEN).collect())
}

/// Reject keys that could escape the storage root.
pub fn validate_asset_key(key: &str) -> Result<(), CoreError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        return Err(CoreError::Validation(format!("Invalid asset key '{key}'")));
    }
    Ok(())
}
