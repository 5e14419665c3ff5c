use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::spool_field;
use axum::{
    extract::{Multipart, State},
    Json,
};
use dynamo_core::{validate, UploadDescriptor};
use dynamo_storage::{generate_storage_key, Storage};
use std::sync::Arc;
use std::time::Instant;

/// `POST /video`: spool, validate, then store the upload under a fresh key.
///
/// Rejected uploads never reach storage. Accepted ones are written exactly
/// once and made public; a storage failure is reported, not retried.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadDescriptor>, HttpAppError> {
    let start = Instant::now();
    let video = &state.settings.video;

    let spooled =
        spool_field(&mut multipart, &video.form_field, state.policy.max_size_bytes()).await?;

    let storage_key = generate_storage_key(&video.key_prefix);
    let descriptor = UploadDescriptor {
        content_type: spooled.content_type,
        size_bytes: spooled.size_bytes,
        public_url: state.settings.cdn.public_url(&storage_key),
        storage_key,
    };

    validate(&descriptor, &state.policy)?;

    let written = state
        .storage
        .write(Box::pin(spooled.file), &descriptor.storage_key, true)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                key = %descriptor.storage_key,
                size_bytes = descriptor.size_bytes,
                "Failed to store upload"
            );
            HttpAppError::from(e)
        })?;

    tracing::info!(
        key = %descriptor.storage_key,
        content_type = %descriptor.content_type,
        file_name = spooled.file_name.as_deref().unwrap_or(""),
        size_bytes = written,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Video uploaded"
    );

    Ok(Json(descriptor))
}
