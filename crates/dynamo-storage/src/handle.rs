//! The process-wide storage handle.
//!
//! The set of backends is closed, so dispatch is a `match` over [`Backend`]
//! rather than a trait object. [`StorageHandle`] adds the closed flag: after
//! `close()` every operation fails with `StorageError::Closed`.

use crate::cloud::CloudBlobBackend;
use crate::null::NullBackend;
use crate::traits::{Storage, StorageError, StorageResult, UploadReader};
use crate::StorageBackend;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub enum Backend {
    Cloud(CloudBlobBackend),
    Null(NullBackend),
}

#[derive(Debug)]
pub struct StorageHandle {
    backend: Backend,
    closed: AtomicBool,
}

impl StorageHandle {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            closed: AtomicBool::new(false),
        }
    }

    /// Null backend, when that is what was selected.
    pub fn null_backend(&self) -> Option<&NullBackend> {
        match &self.backend {
            Backend::Null(backend) => Some(backend),
            Backend::Cloud(_) => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.is_closed() {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

impl From<CloudBlobBackend> for StorageHandle {
    fn from(backend: CloudBlobBackend) -> Self {
        Self::new(Backend::Cloud(backend))
    }
}

impl From<NullBackend> for StorageHandle {
    fn from(backend: NullBackend) -> Self {
        Self::new(Backend::Null(backend))
    }
}

#[async_trait]
impl Storage for StorageHandle {
    async fn write(
        &self,
        reader: UploadReader,
        key: &str,
        make_public: bool,
    ) -> StorageResult<u64> {
        self.ensure_open()?;
        match &self.backend {
            Backend::Cloud(backend) => backend.write(reader, key, make_public).await,
            Backend::Null(backend) => backend.write(reader, key, make_public).await,
        }
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.ensure_open()?;
        match &self.backend {
            Backend::Cloud(backend) => backend.delete(key).await,
            Backend::Null(backend) => backend.delete(key).await,
        }
    }

    /// Close the backend. Only the first call reaches it; later calls get `Closed`.
    async fn close(&self) -> StorageResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(StorageError::Closed);
        }
        tracing::info!(backend = %self.backend_type(), "Closing storage backend");
        match &self.backend {
            Backend::Cloud(backend) => backend.close().await,
            Backend::Null(backend) => backend.close().await,
        }
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.ensure_open()?;
        match &self.backend {
            Backend::Cloud(backend) => backend.read(key).await,
            Backend::Null(backend) => backend.read(key).await,
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.ensure_open()?;
        match &self.backend {
            Backend::Cloud(backend) => backend.exists(key).await,
            Backend::Null(backend) => backend.exists(key).await,
        }
    }

    fn backend_type(&self) -> StorageBackend {
        match &self.backend {
            Backend::Cloud(backend) => backend.backend_type(),
            Backend::Null(backend) => backend.backend_type(),
        }
    }
}
