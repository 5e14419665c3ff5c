//! Upload API integration tests.
//!
//! Run with: `cargo test -p dynamo-api --test upload_test`

mod helpers;

use dynamo_storage::Storage;
use helpers::{setup_memory_app, setup_null_app, video_form};

const MB: usize = 1_000_000;

#[tokio::test]
async fn test_upload_accepted_video() {
    let app = setup_null_app();

    let response = app
        .client()
        .post("/video")
        .multipart(video_form("video", "video/mp4", vec![7u8; 5 * MB]))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["file_type"], "video/mp4");
    assert_eq!(body["file_size"], 5 * MB as u64);

    let key = body["file_name"].as_str().expect("file_name");
    let suffix = key.strip_prefix("raw/").expect("key under raw/");
    assert_eq!(suffix.len(), 10);
    assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(
        body["file_url"].as_str(),
        Some(format!("https://cdn.test.local/{}", key).as_str())
    );

    assert_eq!(app.null_writes(), 1);
}

#[tokio::test]
async fn test_upload_too_large_is_rejected_without_write() {
    let app = setup_null_app();

    let response = app
        .client()
        .post("/video")
        .multipart(video_form("video", "video/mp4", vec![0u8; 20 * MB]))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.text(), "Please upload file size less than 9MB");
    assert_eq!(app.null_writes(), 0);
}

#[tokio::test]
async fn test_upload_unsupported_type_is_rejected_without_write() {
    let app = setup_null_app();

    let response = app
        .client()
        .post("/video")
        .multipart(video_form("video", "video/avi", vec![1u8; 1000]))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.text(), "Please upload these file types: mp4,webm");
    assert_eq!(app.null_writes(), 0);
}

#[tokio::test]
async fn test_upload_without_video_field() {
    let app = setup_null_app();

    let response = app
        .client()
        .post("/video")
        .multipart(video_form("file", "video/mp4", vec![1u8; 10]))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.text(), "No file provided in field 'video'");
    assert_eq!(app.null_writes(), 0);
}

#[tokio::test]
async fn test_uploaded_bytes_round_trip_through_storage() {
    let app = setup_memory_app();
    let data: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();

    let response = app
        .client()
        .post("/video")
        .multipart(video_form("video", "video/webm", data.clone()))
        .await;
    assert_eq!(response.status_code(), 200);

    let body: serde_json::Value = response.json();
    let key = body["file_name"].as_str().expect("file_name");
    assert_eq!(app.state.storage.read(key).await.expect("stored"), data);
}

#[tokio::test]
async fn test_storage_failure_returns_500() {
    let app = setup_memory_app();
    app.state.storage.close().await.expect("close");

    let response = app
        .client()
        .post("/video")
        .multipart(video_form("video", "video/mp4", vec![1u8; 100]))
        .await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(response.text(), "Failed to store upload");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = setup_memory_app();

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<String>(), "OK");

    let response = app.client().get("/health/storage").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["storage"], "healthy");
}

#[tokio::test]
async fn test_storage_health_reports_closed_backend() {
    let app = setup_null_app();
    app.state.storage.close().await.expect("close");

    let response = app.client().get("/health/storage").await;
    assert_eq!(response.status_code(), 503);
    let body: serde_json::Value = response.json();
    assert_eq!(body["backend"], "null");
}

#[tokio::test]
async fn test_config_endpoint_hides_credentials() {
    let mut settings = helpers::test_settings();
    settings.gcs.service_account_path = Some("/secrets/sa.json".to_string());
    let app = helpers::setup_app(
        settings,
        helpers::scenario_policy(),
        dynamo_storage::NullBackend::new().into(),
    );

    let response = app.client().get("/meta/config").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["server"]["http_port"], 8080);
    assert_eq!(body["video"]["max_size_mb"], 10);
    assert!(body["gcs"].get("service_account_path").is_none());
}

#[tokio::test]
async fn test_config_endpoint_can_be_disabled() {
    let mut settings = helpers::test_settings();
    settings.server.expose_config = false;
    let app = helpers::setup_app(
        settings,
        helpers::scenario_policy(),
        dynamo_storage::NullBackend::new().into(),
    );

    let response = app.client().get("/meta/config").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = setup_null_app();

    let response = app
        .client()
        .get("/health")
        .add_header("X-Request-ID", "trace-me")
        .await;
    assert_eq!(response.header("x-request-id"), "trace-me");

    let response = app.client().get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}
