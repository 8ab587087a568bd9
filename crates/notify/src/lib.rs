//! Getting finished photos to guests: email delivery with an attempt log,
//! and QR codes pointing at the download page.

pub mod email;
pub mod mailer;
pub mod qr;

pub use email::{DisabledTransport, MailError, MailTransport, PhotoEmail, SmtpConfig, SmtpTransport};
pub use mailer::{MailerError, PhotoMailer};
pub use qr::{download_link, render_qr_png, QrError};
