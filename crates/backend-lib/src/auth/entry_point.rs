//! Terminal response for protected routes reached without an identity.
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Reason reported when no credentials were presented at all
pub const FULL_AUTHENTICATION_REQUIRED: &str =
    "Full authentication is required to access this resource";

/// 401 `{"error":"Unauthorized","message":<reason>}`
pub fn unauthorized(reason: &str) -> Response {
    AppError::Unauthorized(reason.to_string()).into_response()
}
