// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use todo_common::ErrorBody;

use crate::auth::TokenError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT token expired")]
    TokenExpired,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(TokenError),

    #[error("User not found from token")]
    SubjectNotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Login failed: user credentials do not match")]
    LoginFailed,

    #[error("Login id already exists")]
    DuplicateLoginId,

    #[error("Required fields are missing")]
    MissingFields,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Credential store unavailable: {0}")]
    CredentialStoreUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::TokenExpired | AppError::InvalidToken(_) | AppError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            },
            // Bad credentials answer 404, not 401. Kept as the published API behaviour.
            AppError::SubjectNotFound | AppError::LoginFailed | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            },
            AppError::DuplicateLoginId | AppError::MissingFields | AppError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            },
            AppError::CredentialStoreUnavailable(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::TokenExpired => "JWT token expired",
            AppError::InvalidToken(_) => "Invalid JWT token",
            AppError::SubjectNotFound => "User not found from token",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::LoginFailed => "Login failed",
            AppError::DuplicateLoginId => "Duplicate login id",
            AppError::MissingFields => "Missing required fields",
            AppError::InvalidInput(_) => "Invalid input",
            AppError::NotFound(_) => "Not found",
            AppError::CredentialStoreUnavailable(_) => "Credential store unavailable",
            AppError::Io(_) | AppError::Json(_) | AppError::Internal(_) => "Internal server error",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Unauthorized(reason) => reason.clone(),
            AppError::LoginFailed => "User credentials do not match".to_string(),
            AppError::DuplicateLoginId => "Login id already exists".to_string(),
            AppError::MissingFields => "Required fields are missing".to_string(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(what) => format!("{what} not found"),
            _ => "An internal server error occurred".to_string(),
        }
    }

    /// Message attached to the response body, if any.
    ///
    /// Token and subject rejections carry only the `error` code.
    fn body_message(&self) -> Option<String> {
        match self {
            AppError::TokenExpired | AppError::InvalidToken(_) | AppError::SubjectNotFound => None,
            AppError::Unauthorized(reason) => Some(reason.clone()),
            _ if cfg!(debug_assertions) => Some(self.to_string()),
            _ => Some(self.sanitized_message()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Encoding => AppError::Internal(err.to_string()),
            other => AppError::InvalidToken(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code().to_string(),
            message: self.body_message(),
        };

        (status, axum::Json(body)).into_response()
    }
}
