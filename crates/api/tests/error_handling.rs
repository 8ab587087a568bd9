//! Tests for `AppError` -> HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use photobooth_api::error::AppError;
use photobooth_core::error::CoreError;
use photobooth_notify::{MailError, MailerError, QrError};
use photobooth_pipeline::PipelineError;
use photobooth_store::models::{EmailLogEntry, EmailStatus};
use photobooth_store::StoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: not-found from core and store both map to 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_errors_return_404() {
    let (status, json) = error_to_response(CoreError::not_found("Frame", "abc").into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Frame with id abc not found");

    let (status, json) = error_to_response(StoreError::not_found("Photo", "p1").into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Photo with id p1 not found");
}

// ---------------------------------------------------------------------------
// Test: validation inside the store maps to 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn store_validation_returns_400() {
    let err = StoreError::Core(CoreError::Validation("countdown out of range".into()));
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "countdown out of range");
}

// ---------------------------------------------------------------------------
// Test: unreadable images map to 422 PROCESSING_FAILED
// ---------------------------------------------------------------------------

#[tokio::test]
async fn processing_failure_returns_422() {
    let (status, json) = error_to_response(PipelineError::Empty("photo").into()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "PROCESSING_FAILED");

    let err = PipelineError::Segmentation("model returned 500".into());
    let (status, _) = error_to_response(err.into()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Test: a crashed image worker is a sanitised 500
// ---------------------------------------------------------------------------

#[tokio::test]
async fn image_worker_failure_returns_500() {
    let err = PipelineError::Worker("task 7 panicked".into());
    let (status, json) = error_to_response(err.into()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("panicked"));
}

// ---------------------------------------------------------------------------
// Test: delivery failure maps to 502 DELIVERY_FAILED
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delivery_failure_returns_502() {
    let entry = EmailLogEntry {
        id: uuid::Uuid::from_u128(1),
        to_address: "guest@example.com".into(),
        photo_id: uuid::Uuid::from_u128(2),
        photo_url: "http://kiosk.test/assets/photos/p.png".into(),
        attempted_at: chrono::Utc::now(),
        status: EmailStatus::Failed,
        message_id: None,
        error: Some("relay unreachable".into()),
        resent_from: None,
    };
    let err = MailerError::Delivery {
        entry: Box::new(entry),
        source: MailError::NotConfigured,
    };
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "DELIVERY_FAILED");
    assert!(json["error"].as_str().unwrap().contains("not configured"));
}

// ---------------------------------------------------------------------------
// Test: bad address and oversized QR payload are 400s
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_inputs_return_400() {
    let err = MailerError::InvalidAddress("nope".into());
    let (status, _) = error_to_response(err.into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = error_to_response(QrError::TooLong(5000).into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: backend failures map to 500 and sanitize the message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let err = StoreError::Backend("s3://secret-bucket access denied".into());
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");

    let (status, json) = error_to_response(AppError::InternalError("boom".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}
