#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{ImageFormat, Rgba, RgbaImage};
use photobooth_api::config::{ServerConfig, StorageConfig};
use photobooth_api::router::build_app_router;
use photobooth_api::state::AppState;
use photobooth_notify::{MailError, MailTransport, PhotoEmail, PhotoMailer};
use photobooth_pipeline::{BorderFloodSegmenter, FitPolicy};
use photobooth_store::{AssetStore, DocumentStore, LocalBlobStore};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PUBLIC_BASE: &str = "http://kiosk.test";
const BOUNDARY: &str = "photobooth-test-boundary";

/// Build a test `ServerConfig` with safe defaults and a local store rooted
/// at `data_dir`.
pub fn test_config(data_dir: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 20 * 1024 * 1024,
        public_base_url: PUBLIC_BASE.to_string(),
        static_dir: format!("{data_dir}/public"),
        storage: StorageConfig::Local {
            data_dir: data_dir.to_string(),
        },
        composite_policy: FitPolicy::Cover,
        segmentation_url: None,
    }
}

/// Mail transport that records messages, or fails on demand.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<PhotoEmail>>,
    pub fail: AtomicBool,
}

impl RecordingTransport {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, email: &PhotoEmail) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Build("relay unreachable".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn AssetStore>,
    pub transport: Arc<RecordingTransport>,
    pub dir: TempDir,
}

/// Build the full application router over a fresh local store in a temp
/// directory, the same way `main.rs` does.
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

/// Like [`build_test_app`], with the config adjusted first.
pub fn build_test_app_with(configure: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().to_str().unwrap().to_string();
    let mut config = test_config(&data_dir);
    configure(&mut config);

    let store: Arc<dyn AssetStore> = Arc::new(DocumentStore::new(LocalBlobStore::new(
        dir.path(),
        format!("{PUBLIC_BASE}/assets"),
    )));
    let transport = Arc::new(RecordingTransport::default());
    let mailer = Arc::new(PhotoMailer::new(store.clone(), transport.clone()));

    let state = AppState {
        store: store.clone(),
        config: Arc::new(config.clone()),
        mailer,
        segmenter: Arc::new(BorderFloodSegmenter::default()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        transport,
        dir,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn json_request(
    app: &TestApp,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body).await
}

pub async fn put_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::PUT, uri, body).await
}

pub async fn post_empty(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        bytes: &'a [u8],
    },
}

pub async fn post_multipart(app: &TestApp, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn decode_png(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

/// 40x50 frame: 5px opaque blue border around a transparent window.
pub fn frame_png() -> Vec<u8> {
    let image = RgbaImage::from_fn(40, 50, |x, y| {
        if x < 5 || y < 5 || x >= 35 || y >= 45 {
            Rgba([0, 0, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    encode_png(&image)
}

/// 64x48 solid red shot.
pub fn photo_png() -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(64, 48, Rgba([255, 0, 0, 255])))
}

/// Upload `frame_png()` and return the created frame JSON.
pub async fn upload_test_frame(app: &TestApp, file_name: &str) -> serde_json::Value {
    let png = frame_png();
    let response = post_multipart(
        app,
        "/api/v1/admin/frames",
        &[Part::File {
            name: "frame",
            file_name,
            bytes: &png,
        }],
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Composite `photo_png()` onto `frame_id` and return the photo JSON.
pub async fn capture(app: &TestApp, frame_id: &str) -> serde_json::Value {
    let png = photo_png();
    let response = post_multipart(
        app,
        "/api/v1/capture",
        &[
            Part::File {
                name: "photo",
                file_name: "capture.png",
                bytes: &png,
            },
            Part::Text("frame_id", frame_id),
        ],
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
