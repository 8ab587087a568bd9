//! Email transports.
//!
//! [`SmtpTransport`] wraps the `lettre` async SMTP transport. Configuration
//! is loaded from environment variables; if `SMTP_HOST` is not set,
//! [`SmtpConfig::from_env`] returns `None` and the service falls back to
//! [`DisabledTransport`], which fails every send so the attempt is still
//! logged.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    #[error("Email delivery is not configured")]
    NotConfigured,
}

// ---------------------------------------------------------------------------
// SmtpConfig
// ---------------------------------------------------------------------------

const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "noreply@photobooth.local";

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS (port 587).
    StartTls,
    /// TLS from the first byte (port 465).
    Implicit,
    /// Unencrypted. Only for local test relays.
    None,
}

impl SmtpTls {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "tls" | "implicit" | "smtps" => Self::Implicit,
            "none" | "plain" | "off" => Self::None,
            _ => Self::StartTls,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Envelope and header "From" address. The display name comes from the
    /// stored email template config.
    pub from_address: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub tls: SmtpTls,
}

impl SmtpConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default                     |
    /// |-----------------|----------|-----------------------------|
    /// | `SMTP_HOST`     | yes      | -                           |
    /// | `SMTP_PORT`     | no       | `587`                       |
    /// | `SMTP_FROM`     | no       | `noreply@photobooth.local`  |
    /// | `SMTP_USER`     | no       | -                           |
    /// | `SMTP_PASSWORD` | no       | -                           |
    /// | `SMTP_TLS`      | no       | `starttls` (`tls`, `none`)  |
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        Some(Self {
            host,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            user: std::env::var("SMTP_USER").ok(),
            password: std::env::var("SMTP_PASSWORD").ok(),
            tls: std::env::var("SMTP_TLS")
                .map(|t| SmtpTls::parse(&t))
                .unwrap_or(SmtpTls::StartTls),
        })
    }

    /// Domain used for generated Message-IDs.
    pub fn message_domain(&self) -> &str {
        self.from_address
            .rsplit_once('@')
            .map(|(_, domain)| domain)
            .filter(|d| !d.is_empty())
            .unwrap_or("photobooth.local")
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// A fully rendered photo email.
#[derive(Debug, Clone)]
pub struct PhotoEmail {
    pub to: String,
    pub sender_name: String,
    pub subject: String,
    pub html_body: String,
    pub attachment_name: String,
    pub attachment: Vec<u8>,
    /// Value for the Message-ID header, angle brackets included.
    pub message_id: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Domain for Message-IDs of mail sent through this transport.
    fn message_domain(&self) -> &str {
        "photobooth.local"
    }

    async fn send(&self, email: &PhotoEmail) -> Result<(), MailError>;
}

/// Sends through an SMTP relay.
pub struct SmtpTransport {
    config: SmtpConfig,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(config: SmtpConfig) -> Result<Self, MailError> {
        let builder = match config.tls {
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?,
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };
        let mut builder = builder.port(config.port);
        if let (Some(user), Some(pass)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        tracing::info!(host = %config.host, port = config.port, tls = ?config.tls, "SMTP transport configured");
        Ok(Self {
            mailer: builder.build(),
            config,
        })
    }

    fn build_message(&self, email: &PhotoEmail) -> Result<Message, MailError> {
        let from = Mailbox::new(
            Some(email.sender_name.clone()),
            self.config.from_address.parse()?,
        );
        let to: Mailbox = email.to.parse()?;
        let png = ContentType::parse("image/png").map_err(|e| MailError::Build(e.to_string()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .message_id(Some(email.message_id.clone()))
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::html(email.html_body.clone()))
                    .singlepart(
                        Attachment::new(email.attachment_name.clone())
                            .body(email.attachment.clone(), png),
                    ),
            )
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn message_domain(&self) -> &str {
        self.config.message_domain()
    }

    async fn send(&self, email: &PhotoEmail) -> Result<(), MailError> {
        let message = self.build_message(email)?;
        self.mailer.send(message).await?;
        Ok(())
    }
}

/// Used when no SMTP relay is configured.
pub struct DisabledTransport;

#[async_trait]
impl MailTransport for DisabledTransport {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn send(&self, _email: &PhotoEmail) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
