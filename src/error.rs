//! Error types for the Shelfmark server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchRecord = 4,
    BadValue = 5,
    Duplicate = 6,
    OutOfStock = 7,
    ActiveLoanExists = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Book out of stock: {0}")]
    OutOfStock(String),

    #[error("Student already has an issued book: {0}")]
    ActiveLoan(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    pub(crate) fn parts(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone()),
            AppError::Duplicate(msg) => (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone()),
            AppError::OutOfStock(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::OutOfStock,
                msg.clone(),
            ),
            AppError::ActiveLoan(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ActiveLoanExists,
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_unprocessable() {
        let (status, code, _) = AppError::OutOfStock("Rust in Action".into()).parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, ErrorCode::OutOfStock);

        let (status, code, _) = AppError::ActiveLoan("The Hobbit".into()).parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, ErrorCode::ActiveLoanExists);
    }

    #[test]
    fn auth_errors_distinguish_credentials_from_role() {
        let (status, _, _) = AppError::Authentication("bad password".into()).parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, _) = AppError::Authorization("staff only".into()).parts();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn duplicate_maps_to_conflict() {
        let (status, code, msg) = AppError::Duplicate("isbn already exists".into()).parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, ErrorCode::Duplicate);
        assert_eq!(msg, "isbn already exists");
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ErrorCode::Failure as u32, 1);
        assert_eq!(ErrorCode::NotAuthorized as u32, 2);
        assert_eq!(ErrorCode::DbFailure as u32, 3);
        assert_eq!(ErrorCode::NoSuchRecord as u32, 4);
        assert_eq!(ErrorCode::BadValue as u32, 5);
        assert_eq!(ErrorCode::Duplicate as u32, 6);
        assert_eq!(ErrorCode::OutOfStock as u32, 7);
        assert_eq!(ErrorCode::ActiveLoanExists as u32, 8);
    }

    #[test]
    fn database_errors_hide_details() {
        let (status, _, msg) = AppError::Database(sqlx::Error::PoolTimedOut).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg, "Database error");
    }
}
