//! Email template configuration and the delivery log.

use photobooth_core::error::CoreError;
use photobooth_core::template::validate_template;
use photobooth_core::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_SENDER_NAME: &str = "Photo Kiosk";
pub const DEFAULT_SUBJECT: &str = "Your Themed Photo!";
pub const DEFAULT_HTML_TEMPLATE: &str =
    "<p>Here is your photo!</p><img src='{{photoUrl}}' alt='photo'/>";

/// How outgoing photo emails look.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EmailTemplateConfig {
    #[serde(alias = "senderName")]
    #[validate(length(min = 1, max = 100))]
    pub sender_name: String,

    #[validate(length(min = 1, max = 200))]
    pub subject: String,

    /// HTML body. Must contain the `{{photoUrl}}` placeholder.
    #[serde(alias = "htmlTemplate")]
    #[validate(length(min = 1, max = 20000))]
    pub html_template: String,
}

impl Default for EmailTemplateConfig {
    fn default() -> Self {
        Self {
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            html_template: DEFAULT_HTML_TEMPLATE.to_string(),
        }
    }
}

impl EmailTemplateConfig {
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(format!("Invalid email config: {e}")))?;
        validate_template(&self.html_template)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Sent,
    Failed,
}

/// One delivery attempt. Every attempt is logged, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailLogEntry {
    pub id: RecordId,
    pub to_address: String,
    pub photo_id: RecordId,
    pub photo_url: String,
    pub attempted_at: Timestamp,
    pub status: EmailStatus,
    /// Message-ID header of the sent message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Transport error for failed attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Log entry this attempt re-sent, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resent_from: Option<RecordId>,
}

impl EmailLogEntry {
    pub fn is_sent(&self) -> bool {
        self.status == EmailStatus::Sent
    }
}
