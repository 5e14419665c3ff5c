//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p dynamo-api`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use dynamo_api::setup::routes;
use dynamo_api::AppState;
use dynamo_core::{Settings, StoragePolicy};
use dynamo_storage::{CloudBlobBackend, NullBackend, StorageBackend, StorageHandle};
use object_store::memory::InMemory;
use std::sync::Arc;

pub const TEST_CONFIG: &str = r#"
server:
  http_port: 8080
  drain_timeout_secs: 2
video:
  max_size_mb: 10
  allowed_types:
    mp4: true
    webm: true
cdn:
  base_url: https://cdn.test.local
"#;

pub fn test_settings() -> Settings {
    Settings::from_yaml_str(TEST_CONFIG).expect("test settings")
}

/// Policy from the upload scenario: 10,000,000 bytes, mp4 and webm.
pub fn scenario_policy() -> StoragePolicy {
    StoragePolicy::new(10_000_000, ["mp4", "webm"])
}

/// Test application: server plus the state behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn null_writes(&self) -> u64 {
        self.state
            .storage
            .null_backend()
            .map(NullBackend::write_count)
            .expect("null backend")
    }
}

pub fn setup_app(settings: Settings, policy: StoragePolicy, storage: StorageHandle) -> TestApp {
    let state = Arc::new(AppState::with_policy(settings, policy, storage));
    let router = routes::setup_routes(state.clone());
    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");
    TestApp { server, state }
}

/// Scenario policy over the null backend.
pub fn setup_null_app() -> TestApp {
    setup_app(test_settings(), scenario_policy(), NullBackend::new().into())
}

/// Scenario policy over an in-memory object store.
pub fn setup_memory_app() -> TestApp {
    let backend =
        CloudBlobBackend::from_store(Arc::new(InMemory::new()), "test-bucket", StorageBackend::S3);
    setup_app(test_settings(), scenario_policy(), backend.into())
}

pub fn video_form(field: &str, content_type: &str, data: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name("clip.mp4")
        .mime_type(content_type);
    MultipartForm::new().add_part(field.to_string(), part)
}
