use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::{RotationError, WordSupplyError},
};

/// Seconds clients are asked to wait after a transient failure.
const RETRY_AFTER_SECS: u64 = 1;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// No painter could be selected; the rotation state was reset.
    #[error(transparent)]
    Rotation(#[from] RotationError),
    /// Concurrent writers kept invalidating the lobby.
    #[error("lobby `{0}` is busy, retry later")]
    Contention(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { id } => ServiceError::Contention(id),
            err @ StorageError::Duplicate { .. } => ServiceError::InvalidState(err.to_string()),
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<WordSupplyError> for ServiceError {
    fn from(err: WordSupplyError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Transient failure the client should retry.
    #[error("temporarily unavailable: {0}")]
    Transient(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Rotation(RotationError::EmptyRoster) => {
                AppError::BadRequest(RotationError::EmptyRoster.to_string())
            }
            ServiceError::Rotation(err @ RotationError::NoResolvableMembers) => {
                AppError::Conflict(err.to_string())
            }
            err @ ServiceError::Contention(_) => AppError::Transient(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) | AppError::Transient(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };
        let retry = matches!(
            self,
            AppError::ServiceUnavailable(_) | AppError::Transient(_)
        );

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        let mut response = (status, payload).into_response();
        if retry {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}
