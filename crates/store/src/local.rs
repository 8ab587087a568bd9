//! Filesystem-backed [`BlobStore`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::blob::BlobStore;
use crate::error::StoreResult;

/// Stores each key as a file under a root directory. Writes go to a
/// temporary sibling first and are renamed into place.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    /// Prefix of public URLs, e.g. `http://kiosk.local:3000/assets`.
    public_base: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |p, s| p.join(s))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn name(&self) -> &'static str {
        "local"
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let dir_key = prefix.trim_end_matches('/');
        let mut entries = match tokio::fs::read_dir(self.path_for(dir_key)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.contains(".tmp-") {
                continue;
            }
            keys.push(if dir_key.is_empty() {
                name
            } else {
                format!("{dir_key}/{name}")
            });
        }
        keys.sort();
        Ok(keys)
    }

    async fn ping(&self) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:3000/assets/");
        (dir, store)
    }

    #[tokio::test]
    async fn put_get_delete() {
        let (_dir, store) = store();
        store.put("frames/a.png", vec![1, 2, 3], "image/png").await.unwrap();
        assert_eq!(store.get("frames/a.png").await.unwrap(), Some(vec![1, 2, 3]));
        assert!(store.delete("frames/a.png").await.unwrap());
        assert!(!store.delete("frames/a.png").await.unwrap());
        assert_eq!(store.get("frames/a.png").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let (_dir, store) = store();
        store.put("db/x.json", b"1".to_vec(), "application/json").await.unwrap();
        store.put("db/x.json", b"2".to_vec(), "application/json").await.unwrap();
        assert_eq!(store.get("db/x.json").await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn list_returns_prefixed_keys_only() {
        let (_dir, store) = store();
        store.put("frames/b.png", vec![0], "image/png").await.unwrap();
        store.put("frames/a.png", vec![0], "image/png").await.unwrap();
        store.put("photos/p.png", vec![0], "image/png").await.unwrap();

        let keys = store.list("frames/").await.unwrap();
        assert_eq!(keys, vec!["frames/a.png", "frames/b.png"]);
        assert!(store.list("missing/").await.unwrap().is_empty());
    }

    #[test]
    fn public_url_joins_base() {
        let store = LocalBlobStore::new("/tmp", "http://kiosk/assets/");
        assert_eq!(store.public_url("frames/a.png"), "http://kiosk/assets/frames/a.png");
    }
}
