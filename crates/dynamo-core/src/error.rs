//! Error types module
//!
//! `ConfigError` covers everything that can go wrong before the server starts
//! and is always fatal. `AppError` covers request-time failures and describes
//! how each one is presented to the client through [`ErrorMetadata`].

use crate::validation::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like draining
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("HTTP port cannot be empty")]
    MissingHttpPort,

    #[error("multiple backends enabled: {0}")]
    MultipleBackends(String),

    #[error("missing bucket for {0} storage backend")]
    MissingBucket(&'static str),

    #[error("no storage backend enabled")]
    NoBackend,
}

impl From<validator::ValidationErrors> for ConfigError {
    fn from(err: validator::ValidationErrors) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl AppError {
    /// Get the error type name for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Storage(_) => "Storage",
            AppError::Unavailable(_) => "Unavailable",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::Unavailable(_) => 503,
            AppError::Storage(_) | AppError::Internal(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(ValidationError::FileTooLarge { .. }) => "FILE_TOO_LARGE",
            AppError::Validation(ValidationError::UnsupportedType { .. }) => "UNSUPPORTED_TYPE",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(err) => err.to_string(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Storage(_) => "Failed to store upload".to_string(),
            AppError::Unavailable(msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) | AppError::NotFound(_) => {
                LogLevel::Debug
            }
            AppError::Unavailable(_) => LogLevel::Warn,
            AppError::Storage(_) | AppError::Internal(_) => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_client_errors() {
        let err = AppError::from(ValidationError::FileTooLarge {
            size: 2,
            max: 1,
            max_mb: 0,
        });
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert_eq!(err.client_message(), "Please upload file size less than 0MB");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_storage_errors_hide_details() {
        let err = AppError::Storage("bucket dynamo-raw: connection reset".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(err.client_message(), "Failed to store upload");
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_unavailable_maps_to_503() {
        let err = AppError::Unavailable("Server is shutting down".to_string());
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.client_message(), "Server is shutting down");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }
}
