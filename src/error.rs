use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum LeaveError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The store could not be reached. Worth retrying.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// The store answered but refused or could not read the data.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

pub type LeaveResult<T> = Result<T, LeaveError>;

impl LeaveError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        LeaveError::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        LeaveError::NotFound(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        LeaveError::InvalidState(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        LeaveError::Unauthorized(message.into())
    }

    /// Only connectivity failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, LeaveError::StorageError(_))
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            LeaveError::NotFound(_) => StatusCode::NOT_FOUND,
            LeaveError::InvalidState(_) => StatusCode::CONFLICT,
            LeaveError::Unauthorized(_) => StatusCode::FORBIDDEN,
            LeaveError::StorageError(_) => StatusCode::SERVICE_UNAVAILABLE,
            LeaveError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            log::error!(
                "Request failed with status {}: {}",
                status_code,
                error_message
            );
        } else {
            log::warn!(
                "Request rejected with status {}: {}",
                status_code,
                error_message
            );
        }

        HttpResponse::build(status_code).json(ApiResponse::<()>::error(&error_message))
    }
}

/// SQLSTATE codes for a lost connection or an aborted transaction.
pub fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08") || code == "40001" || code == "40P01" || code.starts_with("57P")
}

/// Class 22 (data exception) and class 23 (integrity constraint violation).
fn is_rejected_input_sqlstate(code: &str) -> bool {
    code.starts_with("22") || code.starts_with("23")
}

impl From<sqlx::Error> for LeaveError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        match &error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => LeaveError::StorageError(error.to_string()),
            sqlx::Error::Database(db_error) => match db_error.code() {
                Some(code) if is_transient_sqlstate(&code) => {
                    LeaveError::StorageError(error.to_string())
                }
                Some(code) if is_rejected_input_sqlstate(&code) => {
                    LeaveError::InvalidArgument(db_error.message().to_string())
                }
                _ => LeaveError::DatabaseError(error.to_string()),
            },
            _ => LeaveError::DatabaseError(error.to_string()),
        }
    }
}
