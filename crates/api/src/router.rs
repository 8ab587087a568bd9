//! Route tree and middleware for the photobooth service.
//!
//! `main.rs` and the integration tests both call [`build_app_router`], so
//! the kiosk, the admin panel and the tests all talk to the same stack.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request id, set on the way in and echoed back.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// How long browsers may cache a CORS preflight.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(3600);

/// `/health`, `/assets/*`, `/api/v1/*`, and the kiosk and admin pages from
/// `STATIC_DIR` for everything else.
///
/// Middleware runs outermost first: CORS, request id, tracing, request id
/// echo, timeout, panic recovery, then the upload size cap.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(build_cors_layer(config))
        // Type adaptation only: CORS needs a `Default` response body.
        .map_response(IntoResponse::into_response)
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(CatchPanicLayer::new())
        // Frame and photo uploads are the only large bodies.
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    Router::new()
        .merge(routes::health::router())
        .nest("/assets", routes::assets::router())
        .nest("/api/v1", routes::api_routes())
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(middleware)
        .with_state(state)
}

/// CORS for the kiosk and admin front ends. Browsers may read the request
/// id so kiosk error reports can be matched with server logs.
///
/// Panics on an unparsable origin; startup should fail on bad config.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{origin}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([REQUEST_ID_HEADER])
        .max_age(PREFLIGHT_MAX_AGE)
}
