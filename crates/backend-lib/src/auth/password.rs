// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and credential verification.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use thiserror::Error;
use zeroize::Zeroize;

use crate::storage::Identity;

/// Default scrypt cost (log2 of N) for new hashes
pub const DEFAULT_PASSWORD_COST: u8 = 15;

/// A login-id/password pair as submitted at login. The secret is wiped on drop.
pub struct Credential {
    pub login_id: String,
    password: String,
}

impl Credential {
    pub fn new(login_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login_id: login_id.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("login_id", &self.login_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Password hashing failures
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("invalid scrypt parameters: {0}")]
    InvalidParams(#[from] scrypt::errors::InvalidParams),

    #[error("password hashing failed: {0}")]
    Hash(#[from] scrypt::password_hash::Error),
}

/// Hash a password using scrypt with cost `log_n`
pub fn hash_password(plain: &str, log_n: u8) -> Result<String, PasswordError> {
    let params = Params::new(log_n, Params::RECOMMENDED_R, Params::RECOMMENDED_P, Params::RECOMMENDED_LEN)?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a PHC hash string
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Check a submitted credential against the stored identity, if any.
pub fn verify_credential(credential: &Credential, stored: Option<&Identity>) -> bool {
    match stored {
        Some(identity) if identity.login_id == credential.login_id => {
            verify_password(&identity.password_hash, credential.password())
        },
        _ => false,
    }
}
