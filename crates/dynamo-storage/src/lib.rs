//! Dynamo Storage Library
//!
//! This crate provides the storage abstraction used by the upload pipeline:
//! the `Storage` trait, the object-store backed `CloudBlobBackend` (GCS, S3
//! or a local directory), the no-op `NullBackend`, and `StorageHandle`, which
//! owns the one backend selected at startup.
//!
//! # Storage key format
//!
//! Keys are `{prefix}/{10 random alphanumerics}` (default prefix `raw`).
//! Keys must not contain `..` segments or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod cloud;
pub mod factory;
pub mod handle;
pub mod keys;
pub mod null;
pub mod traits;

// Re-export commonly used types
pub use cloud::CloudBlobBackend;
pub use dynamo_core::StorageBackend;
pub use factory::{create_storage, select_backend};
pub use handle::{Backend, StorageHandle};
pub use keys::{generate_storage_key, validate_key};
pub use null::NullBackend;
pub use traits::{Storage, StorageError, StorageResult, UploadReader};
