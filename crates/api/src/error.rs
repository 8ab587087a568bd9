use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use photobooth_core::error::CoreError;
use photobooth_notify::{MailerError, QrError};
use photobooth_pipeline::PipelineError;
use photobooth_store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain crates' errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Decoding, compositing or background removal failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Email rejected or not delivered. Delivery failures are already logged.
    #[error(transparent)]
    Mail(#[from] MailerError),

    #[error(transparent)]
    Qr(#[from] QrError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

type Classified = (StatusCode, &'static str, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core(core),
            AppError::Store(err) => classify_store(err),
            AppError::Pipeline(err) => classify_pipeline(err),
            AppError::Mail(err) => match err {
                MailerError::InvalidAddress(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                MailerError::Store(store) => classify_store(store),
                MailerError::Delivery { entry, source } => {
                    tracing::warn!(log_id = %entry.id, error = %source, "Email delivery failed");
                    (StatusCode::BAD_GATEWAY, "DELIVERY_FAILED", err.to_string())
                }
            },
            AppError::Qr(err) => match err {
                QrError::Empty | QrError::TooLong(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                QrError::Encode(_) | QrError::Image(_) => internal(err),
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core(core: &CoreError) -> Classified {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => internal(msg),
    }
}

/// Not-found maps to 404; I/O, serialization and backend failures are
/// sanitized 500s.
fn classify_store(err: &StoreError) -> Classified {
    match err {
        StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        StoreError::Core(core) => classify_core(core),
        StoreError::Io(_) | StoreError::Serde(_) | StoreError::Backend(_) => internal(err),
    }
}

/// Unreadable inputs and failed processing are 422; the caller's assets
/// are untouched.
fn classify_pipeline(err: &PipelineError) -> Classified {
    match err {
        PipelineError::Core(core) => classify_core(core),
        PipelineError::Encode(_) | PipelineError::Worker(_) => internal(err),
        PipelineError::Decode { .. } | PipelineError::Empty(_) | PipelineError::Segmentation(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "PROCESSING_FAILED",
            err.to_string(),
        ),
    }
}

fn internal(detail: impl std::fmt::Display) -> Classified {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a failed `spawn_blocking` join into a 500.
pub fn join_error(err: tokio::task::JoinError) -> AppError {
    AppError::InternalError(format!("Image task failed: {err}"))
}
