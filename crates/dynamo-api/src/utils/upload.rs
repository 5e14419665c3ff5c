//! Spooling of multipart upload fields to anonymous temp files.

use axum::extract::Multipart;
use dynamo_core::AppError;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An upload field written to an unnamed temp file, positioned at its start.
///
/// The file has no path on disk and disappears when this value is dropped.
#[derive(Debug)]
pub struct SpooledUpload {
    pub file: File,
    pub size_bytes: u64,
    pub content_type: String,
    pub file_name: Option<String>,
}

/// Spool the field named `field_name` to a temp file.
///
/// At most `max_size_bytes + 1` bytes are kept. A field that reaches that
/// count is oversized and the rest of it is never read, so `size_bytes` is
/// enough for the size check without buffering the whole body.
pub async fn spool_field(
    multipart: &mut Multipart,
    field_name: &str,
    max_size_bytes: u64,
) -> Result<SpooledUpload, AppError> {
    let cap = max_size_bytes.saturating_add(1);

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let file_name = field.file_name().map(str::to_string);

        let std_file = tokio::task::spawn_blocking(tempfile::tempfile)
            .await
            .map_err(|e| AppError::Internal(format!("Spool task failed: {}", e)))??;
        let mut file = File::from_std(std_file);

        let mut size_bytes: u64 = 0;
        while size_bytes < cap {
            let chunk = field
                .chunk()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;
            let Some(chunk) = chunk else {
                break;
            };

            let remaining = cap - size_bytes;
            let take = chunk.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
            file.write_all(&chunk[..take]).await?;
            size_bytes += take as u64;
        }

        file.flush().await?;
        file.seek(SeekFrom::Start(0)).await?;

        tracing::debug!(
            field = field_name,
            content_type = %content_type,
            size_bytes,
            truncated = size_bytes >= cap,
            "Upload spooled"
        );

        return Ok(SpooledUpload {
            file,
            size_bytes,
            content_type,
            file_name,
        });
    }

    Err(AppError::InvalidInput(format!(
        "No file provided in field '{}'",
        field_name
    )))
}
