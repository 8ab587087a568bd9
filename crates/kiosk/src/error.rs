use photobooth_pipeline::PipelineError;

/// Failures of a capture session.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Camera access denied or no camera present. Raised before any
    /// countdown starts.
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// The live stream stopped delivering frames mid-session.
    #[error("Camera stream failed: {0}")]
    Stream(String),

    /// Stopped by retake, inactivity or shutdown.
    #[error("Capture cancelled")]
    Cancelled,

    #[error("Invalid capture plan: {0}")]
    InvalidPlan(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Failures talking to the photobooth service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response. `code` is the service's machine-readable code when
    /// the body carried one.
    #[error("Server error {status}: {message}")]
    Server {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }
}
