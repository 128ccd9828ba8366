use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use cdss_core::error::ValidationError;
use cdss_data::error::DataError;
use cdss_engines::error::EngineError;
use cdss_store::error::StoreError;

/// Unified API error for all route handlers. Every failure in the system
/// lands in exactly one of these kinds, and each kind has exactly one
/// status code.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or out-of-range request fields.
    Validation(String),
    /// The requested cohort, patient, or reference data does not exist.
    NotFound(String),
    /// A data-access or scoring collaborator failed.
    Dependency(String),
    /// The PPF store could not be read or written.
    Store(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Dependency(msg) => {
                tracing::error!("dependency failure: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            ApiError::Store(msg) => {
                tracing::error!("PPF store failure: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<DataError> for ApiError {
    fn from(e: DataError) -> Self {
        ApiError::Dependency(e.to_string())
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Dependency(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e.to_string())
    }
}
