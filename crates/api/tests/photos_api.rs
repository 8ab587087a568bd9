//! Integration tests for photo listing, deletion and QR codes.

mod common;

use std::collections::HashSet;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

/// Store `n` photos directly, bypassing compositing.
async fn seed_photos(app: &TestApp, n: usize) -> Vec<String> {
    let mut ids = Vec::new();
    for _ in 0..n {
        let photo = app.store.save_photo(photo_png()).await.unwrap();
        ids.push(photo.id.to_string());
    }
    ids
}

fn ids_of(page: &serde_json::Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Test: page 2 follows page 1 without repeats or gaps
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pagination_neither_repeats_nor_skips() {
    let app = build_test_app();
    let seeded = seed_photos(&app, 23).await;

    let first = body_json(get(&app, "/api/v1/photos?limit=20").await).await["data"].clone();
    assert_eq!(ids_of(&first).len(), 20);
    assert!(first["prev_cursor"].is_null());
    let next = first["next_cursor"].as_str().unwrap();

    let second = body_json(get(&app, &format!("/api/v1/photos?limit=20&cursor={next}")).await)
        .await["data"]
        .clone();
    assert_eq!(ids_of(&second).len(), 3);
    assert!(second["next_cursor"].is_null());

    let all: Vec<_> = ids_of(&first).into_iter().chain(ids_of(&second)).collect();
    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(unique.len(), 23);
    assert_eq!(unique, seeded.iter().collect());

    // Back to the first page.
    let prev = second["prev_cursor"].as_str().unwrap();
    let back = body_json(get(&app, &format!("/api/v1/admin/photos?limit=20&cursor={prev}")).await)
        .await["data"]
        .clone();
    assert_eq!(ids_of(&back), ids_of(&first));
}

// ---------------------------------------------------------------------------
// Test: malformed cursor is 400
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_cursor_rejected() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/photos?cursor=zzz").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: carousel honours index_carousel_limit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn carousel_uses_settings_limit() {
    let app = build_test_app();
    seed_photos(&app, 6).await;

    let response = put_json(
        &app,
        "/api/v1/admin/settings",
        json!({"index_carousel_limit": 4}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(&app, "/api/v1/photos/carousel").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 4);
}

// ---------------------------------------------------------------------------
// Test: batch delete is best effort
// ---------------------------------------------------------------------------

#[tokio::test]
async fn batch_delete_reports_per_id() {
    let app = build_test_app();
    let ids = seed_photos(&app, 3).await;
    let missing = uuid::Uuid::new_v4().to_string();

    let response = common::json_request(
        &app,
        axum::http::Method::DELETE,
        "/api/v1/admin/photos",
        json!({"ids": [ids[0], missing, ids[2]]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await["data"].clone();

    assert_eq!(report["deleted"], json!([ids[0], ids[2]]));
    assert_eq!(report["failed"].as_array().unwrap().len(), 1);
    assert_eq!(report["failed"][0]["id"], json!(missing));

    let remaining = app.store.list_all_photos().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id.to_string(), ids[1]);
}

// ---------------------------------------------------------------------------
// Test: single delete and 404 on repeat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_single_photo() {
    let app = build_test_app();
    let ids = seed_photos(&app, 1).await;

    let response = delete(&app, &format!("/api/v1/admin/photos/{}", ids[0])).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete(&app, &format!("/api/v1/admin/photos/{}", ids[0])).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: QR endpoints return PNG images
// ---------------------------------------------------------------------------

#[tokio::test]
async fn qr_codes_are_png() {
    let app = build_test_app();
    let ids = seed_photos(&app, 1).await;

    let response = get(&app, &format!("/api/v1/photos/{}/qr", ids[0])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    let qr = decode_png(&body_bytes(response).await);
    assert_eq!(qr.width(), qr.height());

    let response = get(&app, "/api/v1/qr?url=https%3A%2F%2Fexample.com%2Fp.png").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/v1/qr?url=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, &format!("/api/v1/photos/{}/qr", uuid::Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
