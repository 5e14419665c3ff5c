//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Errors render as plain text with
//! the status from [`ErrorMetadata`]; internal details only go to the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dynamo_core::{AppError, ErrorMetadata, LogLevel, ValidationError};
use dynamo_storage::StorageError;

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from dynamo-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(AppError::Validation(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<std::io::Error> for HttpAppError {
    fn from(err: std::io::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, code, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, code, "Request refused");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type, code, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, app_error.client_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failures_render_generic_message() {
        let response =
            HttpAppError::from(StorageError::UploadFailed("503 from bucket".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_closed_storage_is_a_server_error() {
        let err = HttpAppError::from(StorageError::Closed);
        assert!(matches!(err.0, AppError::Storage(_)));
    }

    #[test]
    fn test_invalid_key_is_a_client_error() {
        let response =
            HttpAppError::from(StorageError::InvalidKey("../x".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
