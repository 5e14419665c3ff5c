use crate::cloud::CloudBlobBackend;
use crate::handle::StorageHandle;
use crate::null::NullBackend;
use crate::StorageResult;
use dynamo_core::{BackendConfig, Settings};

/// Create a storage backend based on configuration
pub async fn create_storage(config: &BackendConfig) -> StorageResult<StorageHandle> {
    match config {
        BackendConfig::CloudBlob { provider, bucket } => {
            let backend = CloudBlobBackend::new(provider, bucket).await?;
            Ok(StorageHandle::from(backend))
        }
        BackendConfig::NullStore => {
            tracing::warn!("No storage backend enabled, uploads will be discarded");
            Ok(StorageHandle::from(NullBackend::new()))
        }
    }
}

/// Pick the single enabled backend from settings and build it.
///
/// Toggle conflicts are reported before any client is constructed.
pub async fn select_backend(settings: &Settings) -> StorageResult<StorageHandle> {
    let config = BackendConfig::try_from(settings)?;
    create_storage(&config).await
}
