//! Shared response envelope types for API handlers.
//!
//! All JSON responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Raw image bytes with their content type.
pub struct ImageResponse {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    /// Whether clients may cache the body.
    pub cacheable: bool,
}

impl ImageResponse {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            content_type: "image/png",
            bytes,
            cacheable: false,
        }
    }
}

impl IntoResponse for ImageResponse {
    fn into_response(self) -> Response {
        let cache = if self.cacheable {
            "public, max-age=300"
        } else {
            "no-store"
        };
        (
            [(CONTENT_TYPE, self.content_type), (CACHE_CONTROL, cache)],
            self.bytes,
        )
            .into_response()
    }
}
