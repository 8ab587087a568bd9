//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Cursor pagination parameters (`?limit=&cursor=`).
///
/// `limit` is clamped by `photobooth_core::pagination::clamp_limit`; `cursor`
/// is the opaque string returned as `next_cursor` / `prev_cursor`.
#[derive(Debug, Deserialize)]
pub struct CursorParams {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

/// Plain `?limit=` for newest-first listings.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
