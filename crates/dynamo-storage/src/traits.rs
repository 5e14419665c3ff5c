//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] dynamo_core::ConfigError),

    #[error("Failed to initialize storage backend: {0}")]
    InitFailed(String),

    #[error("Storage handle is closed")]
    Closed,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Reader handed to [`Storage::write`]; consumed until EOF.
pub type UploadReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Storage abstraction trait
///
/// All storage backends (cloud object stores, the null store) implement this
/// trait. Request handling only ever sees it through `StorageHandle`, so
/// providers can be swapped without touching the upload pipeline.
///
/// Backends do not check upload policy; callers validate first. Keys are
/// still checked and rejected with `InvalidKey` when malformed.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist everything read from `reader` under `key` and return the
    /// number of bytes written.
    ///
    /// Nothing is stored if the reader fails before EOF. When `make_public`
    /// is set the object is made publicly readable in the same put.
    async fn write(&self, reader: UploadReader, key: &str, make_public: bool)
        -> StorageResult<u64>;

    /// Delete an object. Missing keys are `NotFound`.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Release the backend client.
    async fn close(&self) -> StorageResult<()>;

    /// Read a whole object into memory
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
