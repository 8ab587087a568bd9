//! `DocumentStore` over the filesystem backend, as the server runs it.

use photobooth_store::models::FrameChanges;
use photobooth_store::{AssetStore, DocumentStore, LocalBlobStore};

fn open(dir: &tempfile::TempDir) -> DocumentStore<LocalBlobStore> {
    DocumentStore::new(LocalBlobStore::new(dir.path(), "http://kiosk:3000/assets"))
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let frame = {
        let store = open(&dir);
        let frame = store.upload_frame("wedding.png", vec![1, 2, 3]).await.unwrap();
        store
            .update_frame(frame.id, &FrameChanges::availability(false))
            .await
            .unwrap();
        store.save_photo(vec![4, 5]).await.unwrap();
        frame
    };

    let store = open(&dir);
    let frames = store.list_frames().await.unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].id, frame.id);
    assert!(!frames[0].available);
    assert_eq!(
        frames[0].asset_url,
        format!("http://kiosk:3000/assets/frames/{}.png", frame.id)
    );
    assert_eq!(store.list_all_photos().await.unwrap().len(), 1);
    assert!(dir.path().join("db").join("frames.json").is_file());
}

#[tokio::test]
async fn sync_picks_up_files_copied_into_frames_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("frames")).unwrap();
    std::fs::write(dir.path().join("frames").join("manual.png"), [0u8; 4]).unwrap();

    let store = open(&dir);
    let report = store.sync_frames().await.unwrap();
    assert_eq!(report.adopted.len(), 1);
    assert_eq!(store.list_frames().await.unwrap()[0].name, "manual.png");
}

#[tokio::test]
async fn concurrent_uploads_are_all_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let store = std::sync::Arc::new(open(&dir));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.upload_frame(&format!("f{i}.png"), vec![i]).await })
        })
        .collect();
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(store.list_frames().await.unwrap().len(), 8);
}

#[tokio::test]
async fn health_check_creates_root() {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(LocalBlobStore::new(dir.path().join("nested"), "http://x"));
    store.health_check().await.unwrap();
    assert_eq!(store.backend_name(), "local");
    assert!(dir.path().join("nested").is_dir());
}
