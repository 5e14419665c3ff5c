//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use dynamo_storage::Storage;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const STORAGE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const PROBE_KEY: &str = "health-check-non-existent-key";

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, T, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub struct StorageHealthResponse {
    pub storage: String,
    pub backend: String,
}

/// Liveness probe - process is running.
pub async fn health() -> Json<&'static str> {
    Json("OK")
}

/// Storage probe: a HEAD on a key that never exists.
pub async fn storage_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = state.storage.clone();
    let status = run_check(
        STORAGE_CHECK_TIMEOUT,
        async move { storage.exists(PROBE_KEY).await },
        "unhealthy",
    )
    .await;

    let status_code = if status == "healthy" {
        StatusCode::OK
    } else {
        tracing::warn!(storage = %status, "Storage health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(StorageHealthResponse {
            storage: status,
            backend: state.storage.backend_type().to_string(),
        }),
    )
}
