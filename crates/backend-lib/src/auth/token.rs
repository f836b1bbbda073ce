// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
/** Signed bearer tokens.

Tokens are compact HS256 JWTs whose claims hold `sub`, `iat` and `exp`.
Timestamps are NumericDate values with millisecond fractions, so a token
lives for exactly the configured validity. Nothing about issued tokens is
kept server side; validity is decided by the signature and the expiry claim
alone. */
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The single supported signature scheme
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Shortest accepted signing secret
pub const MIN_SECRET_BYTES: usize = 32;

/// Reasons a token is rejected (or cannot be issued)
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token algorithm is not supported")]
    UnsupportedAlgorithm,

    #[error("token signature does not match")]
    SignatureMismatch,

    #[error("token is expired")]
    Expired,

    #[error("token subject must not be empty")]
    EmptySubject,

    #[error("token could not be encoded")]
    Encoding,
}

/// Invalid codec configuration
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("signing secret must be at least {MIN_SECRET_BYTES} bytes")]
    SecretTooShort,

    #[error("token validity must be at least one millisecond")]
    NonPositiveValidity,
}

// Only the algorithm matters before the signature is checked.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Claims embedded in a token. Timestamps are unix seconds with millisecond fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: f64,
    pub exp: f64,
}

impl Claims {
    fn new(sub: &str, issued_ms: i64, expires_ms: i64) -> Self {
        Self {
            sub: sub.to_string(),
            iat: issued_ms as f64 / 1000.0,
            exp: expires_ms as f64 / 1000.0,
        }
    }

    /// Expiry instant in unix milliseconds
    pub fn expires_at_millis(&self) -> i64 {
        (self.exp * 1000.0).round() as i64
    }
}

/// Issues and validates tokens with the process-wide secret.
///
/// Immutable after construction, so one instance is shared by every request.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    validity: TimeDelta,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /** Create a codec
    # Arguments
    * `secret` - HMAC key material, at least [`MIN_SECRET_BYTES`] long
    * `validity` - token lifetime, truncated to whole milliseconds */
    pub fn new(secret: &[u8], validity: TimeDelta) -> Result<Self, CodecError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(CodecError::SecretTooShort);
        }
        let validity = TimeDelta::milliseconds(validity.num_milliseconds());
        if validity <= TimeDelta::zero() {
            return Err(CodecError::NonPositiveValidity);
        }

        // Expiry is checked against the caller's clock in `validate`.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            validity,
        })
    }

    /// Token lifetime
    pub fn validity(&self) -> TimeDelta {
        self.validity
    }

    /// Issue a token for `login_id`, valid from `now` until `now + validity` (exclusive).
    pub fn issue(&self, login_id: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        if login_id.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let issued_ms = now.timestamp_millis();
        let expires_ms = issued_ms.saturating_add(self.validity.num_milliseconds());
        let claims = Claims::new(login_id, issued_ms, expires_ms);

        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Encoding)
    }

    /// Validate `raw` at instant `now` and return its subject.
    ///
    /// Checks run in a fixed order and stop at the first failure: structure,
    /// algorithm, signature, expiry. Expiry is only looked at once the claims
    /// are known to be signed with our key.
    pub fn validate(&self, raw: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let mut segments = raw.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (segments.next(), segments.next(), segments.next(), segments.next())
        else {
            return Err(TokenError::Malformed);
        };
        if header_b64.is_empty() || claims_b64.is_empty() || signature_b64.is_empty() {
            return Err(TokenError::Malformed);
        }

        let header: RawHeader = URL_SAFE_NO_PAD
            .decode(header_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(TokenError::Malformed)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let claims = jsonwebtoken::decode::<Claims>(raw, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureMismatch,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::UnsupportedAlgorithm
                },
                _ => TokenError::Malformed,
            })?
            .claims;

        if now.timestamp_millis() >= claims.expires_at_millis() {
            return Err(TokenError::Expired);
        }
        if claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }

        Ok(claims.sub)
    }
}
