// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request field validation.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::error::AppError;

const MAX_LOGIN_ID_LENGTH: usize = 64;

// Login ids double as file names in the store, so the alphabet is closed.
static LOGIN_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._@-]*$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be blank")]
    Blank(&'static str),

    #[error("Invalid login id: {0}")]
    InvalidLoginId(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Blank(_) => AppError::MissingFields,
            ValidationError::InvalidLoginId(_) => AppError::InvalidInput(err.to_string()),
        }
    }
}

/// Whether `login_id` has the shape of a storable login id
pub fn is_valid_login_id(login_id: &str) -> bool {
    login_id.len() <= MAX_LOGIN_ID_LENGTH && LOGIN_ID_REGEX.is_match(login_id)
}

/// Reject empty or whitespace-only values
pub fn require_non_blank<'a>(field: &'static str, value: &'a str) -> ValidationResult<&'a str> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(value)
}

/// Validate a login id/password pair for signup or identity change
pub fn validate_credentials<'a>(login_id: &'a str, password: &str) -> ValidationResult<&'a str> {
    require_non_blank("loginId", login_id)?;
    require_non_blank("password", password)?;

    if login_id.len() > MAX_LOGIN_ID_LENGTH {
        return Err(ValidationError::InvalidLoginId(format!(
            "Login id cannot exceed {MAX_LOGIN_ID_LENGTH} characters"
        )));
    }

    if !LOGIN_ID_REGEX.is_match(login_id) {
        return Err(ValidationError::InvalidLoginId(
            "Login id must start with a letter or digit and contain only letters, digits, '.', '_', '@' and '-'"
                .to_string(),
        ));
    }

    Ok(login_id)
}

/// Validate todo content
pub fn validate_todo_content(content: &str) -> ValidationResult<&str> {
    require_non_blank("content", content)
}
