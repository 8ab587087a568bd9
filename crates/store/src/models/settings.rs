//! Kiosk-wide settings.

use std::time::Duration;

use photobooth_core::error::CoreError;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;
pub const DEFAULT_PHOTO_INTERVAL_SECS: u32 = 2;
pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: u32 = 60;
pub const DEFAULT_CAROUSEL_LIMIT: u32 = 10;

/// Capture timing and idle behaviour shared by every kiosk.
///
/// Older documents used camelCase keys; those are still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    /// Seconds of countdown before the first shot.
    #[serde(alias = "countdownDuration")]
    #[validate(range(min = 1, max = 30))]
    pub countdown_duration_secs: u32,

    /// Seconds between consecutive shots.
    #[serde(alias = "photoInterval")]
    #[validate(range(min = 0, max = 30))]
    pub photo_interval_secs: u32,

    /// Idle seconds after which the kiosk returns to the attract screen.
    #[serde(alias = "inactivityTimeout")]
    #[validate(range(min = 5, max = 3600))]
    pub inactivity_timeout_secs: u32,

    /// Number of recent photos shown in the landing carousel.
    #[serde(alias = "indexCarouselLimit")]
    #[validate(range(min = 1, max = 100))]
    pub index_carousel_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            countdown_duration_secs: DEFAULT_COUNTDOWN_SECS,
            photo_interval_secs: DEFAULT_PHOTO_INTERVAL_SECS,
            inactivity_timeout_secs: DEFAULT_INACTIVITY_TIMEOUT_SECS,
            index_carousel_limit: DEFAULT_CAROUSEL_LIMIT,
        }
    }
}

impl Settings {
    /// Range-check every field.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(format!("Invalid settings: {e}")))
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_secs(u64::from(self.countdown_duration_secs))
    }

    pub fn photo_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.photo_interval_secs))
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.inactivity_timeout_secs))
    }
}
