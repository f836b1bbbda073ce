use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Credential, TokenError};
use crate::error::AppError;
use crate::storage::Identity;

/// Account and token operations behind the HTTP handlers.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account; the password is stored hashed.
    async fn register(&self, login_id: &str, password: &str) -> Result<Identity, AppError>;

    /// Check a credential and issue a token valid from `now`.
    async fn login(&self, credential: Credential, now: DateTime<Utc>) -> Result<String, AppError>;

    /// Subject of a token, or why it was rejected. Pure; no store access.
    fn validate_token(&self, raw: &str, now: DateTime<Utc>) -> Result<String, TokenError>;

    /// Replace the account `current_login_id` with a new record.
    async fn change_identity(
        &self,
        current_login_id: &str,
        new_login_id: &str,
        new_password: &str,
    ) -> Result<Identity, AppError>;
}
