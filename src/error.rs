//! Error types for the catalog services

use thiserror::Error;
use tonic::{Code, Status};

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Another request holds the advisory lock for the resource
    #[error("Locked: {0}")]
    Locked(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AppError> for Status {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Authentication(msg) => Status::unauthenticated(msg),
            AppError::Authorization(msg) => Status::permission_denied(msg),
            AppError::NotFound(msg) => Status::not_found(msg),
            AppError::Validation(msg) => Status::invalid_argument(msg),
            AppError::AlreadyExists(msg) => Status::already_exists(msg),
            AppError::Conflict(msg) => Status::failed_precondition(msg),
            AppError::Locked(msg) => Status::aborted(msg),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                Status::internal("Database error")
            }
            AppError::Cache(e) => {
                tracing::error!("Cache error: {:?}", e);
                Status::internal("Cache error")
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                Status::internal("Internal server error")
            }
        }
    }
}

/// Statuses returned by sibling services keep their class on the way up
impl From<Status> for AppError {
    fn from(status: Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            Code::Unauthenticated => AppError::Authentication(message),
            Code::PermissionDenied => AppError::Authorization(message),
            Code::NotFound => AppError::NotFound(message),
            Code::InvalidArgument => AppError::Validation(message),
            Code::AlreadyExists => AppError::AlreadyExists(message),
            Code::FailedPrecondition => AppError::Conflict(message),
            Code::Aborted => AppError::Locked(message),
            code => AppError::Internal(format!("upstream call failed ({:?}): {}", code, message)),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
