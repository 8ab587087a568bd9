//! Raw byte storage keyed by relative, slash-separated names.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Flat key/value object storage.
///
/// Keys are validated by the caller; implementations may assume they are
/// relative and free of `..` segments.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Short backend label for logs and the health endpoint.
    fn name(&self) -> &'static str;

    /// Publicly reachable URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Read an object. `Ok(None)` when it does not exist.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Create or replace an object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()>;

    /// Remove an object. Returns whether it existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Keys of all objects under `prefix` (non-recursive semantics are not
    /// guaranteed; callers filter as needed).
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Cheap reachability check.
    async fn ping(&self) -> StoreResult<()> {
        self.list("db/").await.map(|_| ())
    }
}

/// MIME type for a key, guessed from its extension.
pub fn content_type_for(key: &str) -> &'static str {
    match photobooth_core::naming::extension_of(key).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
