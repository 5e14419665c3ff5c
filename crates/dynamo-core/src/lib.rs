//! Dynamo Core Library
//!
//! This crate provides the domain models, error types, configuration and upload
//! validation shared by the storage and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Settings;
pub use error::{AppError, ConfigError, ErrorMetadata, LogLevel};
pub use models::{StoragePolicy, UploadDescriptor};
pub use storage_types::{BackendConfig, BlobProvider, StorageBackend};
pub use validation::{validate, ValidationError};
