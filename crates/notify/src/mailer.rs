//! Photo email sending with an append-only attempt log.

use std::sync::Arc;

use chrono::Utc;
use photobooth_core::template::render_photo_email;
use photobooth_core::types::{new_record_id, RecordId};
use photobooth_store::models::{EmailLogEntry, EmailStatus};
use photobooth_store::{AssetStore, StoreError};
use validator::ValidateEmail;

use crate::email::{MailError, MailTransport, PhotoEmail};

/// File name of the attached photo.
const ATTACHMENT_NAME: &str = "photo.png";

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("Invalid email address '{0}'")]
    InvalidAddress(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The attempt was made and logged as failed.
    #[error("Email delivery failed: {source}")]
    Delivery {
        entry: Box<EmailLogEntry>,
        #[source]
        source: MailError,
    },
}

/// Sends finished photos by email.
///
/// Every attempt for a well-formed address is appended to the email log,
/// whatever the outcome, including attempts for a photo that is gone.
/// Malformed addresses are rejected up front and not logged.
pub struct PhotoMailer {
    store: Arc<dyn AssetStore>,
    transport: Arc<dyn MailTransport>,
}

impl PhotoMailer {
    pub fn new(store: Arc<dyn AssetStore>, transport: Arc<dyn MailTransport>) -> Self {
        Self { store, transport }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Email a finished photo to `to`.
    pub async fn send(&self, to: &str, photo_id: RecordId) -> Result<EmailLogEntry, MailerError> {
        self.attempt(to, photo_id, None, String::new()).await
    }

    /// Repeat a logged attempt. A new entry is appended referencing the
    /// original, which is left untouched.
    pub async fn resend(&self, log_id: RecordId) -> Result<EmailLogEntry, MailerError> {
        let original = self.store.get_email_log(log_id).await?;
        self.attempt(
            &original.to_address,
            original.photo_id,
            Some(original.id),
            original.photo_url,
        )
        .await
    }

    /// `photo_url` is what the entry records when the photo itself can no
    /// longer be loaded.
    async fn attempt(
        &self,
        to: &str,
        photo_id: RecordId,
        resent_from: Option<RecordId>,
        photo_url: String,
    ) -> Result<EmailLogEntry, MailerError> {
        let to = to.trim();
        if !to.validate_email() {
            return Err(MailerError::InvalidAddress(to.to_string()));
        }

        let message_id = format!("<{}@{}>", uuid::Uuid::new_v4(), self.transport.message_domain());
        let mut entry = EmailLogEntry {
            id: new_record_id(),
            to_address: to.to_string(),
            photo_id,
            photo_url,
            attempted_at: Utc::now(),
            status: EmailStatus::Failed,
            message_id: None,
            error: None,
            resent_from,
        };

        let outcome = match self.compose(to, photo_id, &message_id).await {
            Ok((photo_url, email)) => {
                entry.photo_url = photo_url;
                self.transport.send(&email).await.map_err(Failure::Transport)
            }
            Err(e) => Err(Failure::Load(e)),
        };
        match &outcome {
            Ok(()) => {
                entry.status = EmailStatus::Sent;
                entry.message_id = Some(message_id);
            }
            Err(Failure::Load(e)) => entry.error = Some(e.to_string()),
            Err(Failure::Transport(e)) => entry.error = Some(e.to_string()),
        }

        if let Err(e) = self.store.append_email_log(&entry).await {
            tracing::error!(log_id = %entry.id, error = %e, "Failed to record email attempt");
            return Err(e.into());
        }

        match outcome {
            Ok(()) => {
                tracing::info!(
                    log_id = %entry.id,
                    photo_id = %photo_id,
                    resent_from = ?resent_from,
                    transport = self.transport.name(),
                    "Photo email sent",
                );
                Ok(entry)
            }
            Err(Failure::Load(e)) => {
                tracing::warn!(
                    log_id = %entry.id,
                    photo_id = %photo_id,
                    error = %e,
                    "Photo email not sent, photo unavailable",
                );
                Err(MailerError::Store(e))
            }
            Err(Failure::Transport(source)) => {
                tracing::warn!(
                    log_id = %entry.id,
                    photo_id = %photo_id,
                    error = %source,
                    "Photo email failed",
                );
                Err(MailerError::Delivery {
                    entry: Box::new(entry),
                    source,
                })
            }
        }
    }

    /// Load the photo and template and build the message.
    async fn compose(
        &self,
        to: &str,
        photo_id: RecordId,
        message_id: &str,
    ) -> Result<(String, PhotoEmail), StoreError> {
        let (photo, png) = self.store.read_photo_asset(photo_id).await?;
        let config = self.store.get_email_config().await?;
        let email = PhotoEmail {
            to: to.to_string(),
            sender_name: config.sender_name,
            subject: config.subject,
            html_body: render_photo_email(&config.html_template, &photo.asset_url),
            attachment_name: ATTACHMENT_NAME.to_string(),
            attachment: png,
            message_id: message_id.to_string(),
        };
        Ok((photo.asset_url, email))
    }
}

/// Why an attempt did not go out.
enum Failure {
    Load(StoreError),
    Transport(MailError),
}
