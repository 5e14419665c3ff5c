//! Storage setup and initialization

use anyhow::{Context, Result};
use dynamo_core::Settings;
use dynamo_storage::{select_backend, Storage, StorageHandle};

/// Select and build the one storage backend for this process.
pub async fn setup_storage(settings: &Settings) -> Result<StorageHandle> {
    tracing::info!("Initializing storage backend...");
    let storage = select_backend(settings)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = %storage.backend_type(),
        "Storage backend initialized successfully"
    );
    Ok(storage)
}
