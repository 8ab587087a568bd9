//! Kiosk client configuration.

use std::time::Duration;

/// Default service location when `KIOSK_API_BASE` is not set.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

/// Default per-request timeout.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Base URL of the photobooth service, no trailing slash.
    pub api_base: String,
    pub request_timeout: Duration,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl KioskConfig {
    /// | Variable              | Default                 |
    /// |-----------------------|-------------------------|
    /// | `KIOSK_API_BASE`      | `http://localhost:3000` |
    /// | `KIOSK_TIMEOUT_SECS`  | `30`                    |
    pub fn from_env() -> Self {
        let api_base = std::env::var("KIOSK_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let timeout = std::env::var("KIOSK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Self::new(api_base).with_timeout(Duration::from_secs(timeout))
    }

    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL of an `/api/v1` endpoint.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.api_base, path.trim_start_matches('/'))
    }
}
