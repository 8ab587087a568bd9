//! HTTP client for the photobooth service.

use photobooth_core::pagination::Page;
use photobooth_core::types::RecordId;
use photobooth_pipeline::FitPolicy;
use photobooth_store::models::{EmailLogEntry, FinishedPhoto, Frame, Settings};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::KioskConfig;
use crate::error::ClientError;

type Result<T> = std::result::Result<T, ClientError>;

/// `{ "data": ... }` success envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// `{ "error": ..., "code": ... }` failure body.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: Option<String>,
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    to: &'a str,
    photo_id: RecordId,
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: KioskConfig,
}

impl ApiClient {
    pub fn new(config: KioskConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &KioskConfig {
        &self.config
    }

    /// Frames currently offered for selection.
    pub async fn list_frames(&self) -> Result<Vec<Frame>> {
        self.get_json("frames").await
    }

    pub async fn get_settings(&self) -> Result<Settings> {
        self.get_json("settings").await
    }

    /// Newest photos for the attract-screen carousel.
    pub async fn carousel(&self) -> Result<Vec<FinishedPhoto>> {
        self.get_json("photos/carousel").await
    }

    pub async fn list_photos(&self, limit: usize, cursor: Option<&str>) -> Result<Page<FinishedPhoto>> {
        let mut path = format!("photos?limit={limit}");
        if let Some(cursor) = cursor {
            path.push_str("&cursor=");
            path.push_str(cursor);
        }
        self.get_json(&path).await
    }

    /// Upload the chosen shot for compositing with `frame_id`. `policy`
    /// overrides the service default.
    pub async fn upload_capture(
        &self,
        frame_id: RecordId,
        png: Vec<u8>,
        policy: Option<FitPolicy>,
    ) -> Result<FinishedPhoto> {
        let photo = Part::bytes(png)
            .file_name("capture.png")
            .mime_str("image/png")?;
        let mut form = Form::new()
            .part("photo", photo)
            .text("frame_id", frame_id.to_string());
        if let Some(policy) = policy {
            form = form.text("policy", policy.to_string());
        }

        tracing::info!(frame_id = %frame_id, "Uploading capture");
        let response = self
            .client
            .post(self.config.endpoint("capture"))
            .multipart(form)
            .send()
            .await?;
        let photo: FinishedPhoto = Self::parse(response).await?;
        tracing::info!(photo_id = %photo.id, "Capture composited");
        Ok(photo)
    }

    /// Email a finished photo. A delivery failure still produces a logged
    /// attempt on the service and comes back as [`ClientError::Server`].
    pub async fn send_email(&self, to: &str, photo_id: RecordId) -> Result<EmailLogEntry> {
        let response = self
            .client
            .post(self.config.endpoint("email"))
            .json(&EmailRequest { to, photo_id })
            .send()
            .await?;
        Self::parse(response).await
    }

    /// PNG QR code pointing at the photo's download page.
    pub async fn fetch_qr(&self, photo_id: RecordId) -> Result<Vec<u8>> {
        self.fetch_bytes(&self.config.endpoint(&format!("photos/{photo_id}/qr")))
            .await
    }

    /// Raw bytes of any asset URL (frame art, finished photo).
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "Fetching image");
        self.fetch_bytes(url).await
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let response = Self::check(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.client.get(self.config.endpoint(path)).send().await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let response = Self::check(response).await?;
        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(server_error(status.as_u16(), &body))
    }
}

fn server_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ClientError::Server {
            status,
            code: parsed.code,
            message: parsed.error,
        },
        Err(_) => ClientError::Server {
            status,
            code: None,
            message: body.trim().to_string(),
        },
    }
}
