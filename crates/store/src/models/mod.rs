//! Persisted records and their input DTOs.

pub mod email;
pub mod frame;
pub mod photo;
pub mod settings;

pub use email::{EmailLogEntry, EmailStatus, EmailTemplateConfig};
pub use frame::{Frame, FrameChanges};
pub use photo::FinishedPhoto;
pub use settings::Settings;
