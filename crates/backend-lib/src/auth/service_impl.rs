use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use super::{hash_password, verify_credential, AuthService, Credential, TokenCodec, TokenError};
use crate::error::AppError;
use crate::metrics::{LOGIN_FAILURE, LOGIN_SUCCESS, SIGNUP};
use crate::storage::{Identity, Storage};
use crate::validation::{require_non_blank, validate_credentials};

pub struct DefaultAuth<S> {
    storage: S,
    codec: Arc<TokenCodec>,
    password_cost: u8,
}

impl<S> DefaultAuth<S>
where
    S: Storage + Clone + 'static,
{
    pub fn new(storage: S, codec: Arc<TokenCodec>, password_cost: u8) -> Self {
        Self {
            storage,
            codec,
            password_cost,
        }
    }

    // Hashing is CPU bound; run it on the blocking pool.
    async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = Zeroizing::new(password.to_string());
        let cost = self.password_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

#[async_trait]
impl<S> AuthService for DefaultAuth<S>
where
    S: Storage + Clone + 'static,
{
    async fn register(&self, login_id: &str, password: &str) -> Result<Identity, AppError> {
        validate_credentials(login_id, password)?;

        if self.storage.user_exists(login_id).await? {
            return Err(AppError::DuplicateLoginId);
        }

        let identity = Identity::new(login_id, self.hash(password).await?);
        // create-new in the store also catches a concurrent signup for the same id
        self.storage.store_user(&identity).await?;

        counter!(SIGNUP).increment(1);
        info!(login_id = %login_id, "Account created");
        Ok(identity)
    }

    async fn login(&self, credential: Credential, now: DateTime<Utc>) -> Result<String, AppError> {
        require_non_blank("loginId", &credential.login_id)?;
        require_non_blank("password", credential.password())?;

        let login_id = credential.login_id.clone();
        let stored = self.storage.find_user_by_login_id(&login_id).await.map_err(|e| {
            error!(login_id = %login_id, error = %e, "Credential lookup failed");
            AppError::CredentialStoreUnavailable(e.to_string())
        })?;
        let matched = tokio::task::spawn_blocking(move || verify_credential(&credential, stored.as_ref()))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if !matched {
            counter!(LOGIN_FAILURE).increment(1);
            warn!(login_id = %login_id, "Login failed");
            return Err(AppError::LoginFailed);
        }

        let token = self.codec.issue(&login_id, now)?;
        counter!(LOGIN_SUCCESS).increment(1);
        info!(login_id = %login_id, "Login succeeded");
        Ok(token)
    }

    fn validate_token(&self, raw: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.codec.validate(raw, now)
    }

    async fn change_identity(
        &self,
        current_login_id: &str,
        new_login_id: &str,
        new_password: &str,
    ) -> Result<Identity, AppError> {
        validate_credentials(new_login_id, new_password)?;

        if new_login_id != current_login_id && self.storage.user_exists(new_login_id).await? {
            return Err(AppError::DuplicateLoginId);
        }

        let updated = Identity::new(new_login_id, self.hash(new_password).await?);
        self.storage.replace_user(current_login_id, &updated).await?;

        info!(from = %current_login_id, to = %new_login_id, "Identity replaced");
        Ok(updated)
    }
}
