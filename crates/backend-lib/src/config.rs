// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::auth::password::DEFAULT_PASSWORD_COST;
use crate::auth::token::{CodecError, MIN_SECRET_BYTES};

/// Config file read when no explicit path is given. Missing is fine.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable prefix; `__` separates nested keys
pub const ENV_PREFIX: &str = "TODO_";

const MIN_TOKEN_VALIDITY_MS: u64 = 1;
const MAX_PASSWORD_COST: u8 = 20;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Errors raised while loading or validating settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to load settings: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("invalid token settings: {0}")]
    Codec(#[from] CodecError),
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
}

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Flat-file store location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub path: PathBuf,
}

/// Token signing and password hashing
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC-SHA256 signing secret, wiped on drop
    pub jwt_secret: Zeroizing<String>,
    /// Lifetime of issued tokens in milliseconds
    pub token_validity_ms: u64,
    /// scrypt cost as log2(N)
    pub password_cost: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            auth: AuthSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data"),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: Zeroizing::default(),
            token_validity_ms: 60 * 60 * 1000, // 1 hour
            password_cost: DEFAULT_PASSWORD_COST,
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("token_validity_ms", &self.token_validity_ms)
            .field("password_cost", &self.password_cost)
            .finish()
    }
}

impl Settings {
    /// Layered sources: defaults, then the TOML file, then `TODO_*` environment variables.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /**
     * Load and validate settings.
     *
     * # Arguments
     * * `path` - Explicit config file, which must exist. `None` falls back to
     *   [`DEFAULT_CONFIG_PATH`] if present.
     */
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) if !path.is_file() => return Err(ConfigError::MissingFile(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_PATH),
        };

        let settings: Settings = Self::figment(&path).extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "must be non-zero"));
        }

        if self.auth.jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(invalid(
                "auth.jwt_secret",
                format!("must be at least {MIN_SECRET_BYTES} bytes"),
            ));
        }

        if self.auth.token_validity_ms < MIN_TOKEN_VALIDITY_MS {
            return Err(invalid(
                "auth.token_validity_ms",
                format!("must be at least {MIN_TOKEN_VALIDITY_MS}"),
            ));
        }

        if i64::try_from(self.auth.token_validity_ms).is_err() {
            return Err(invalid("auth.token_validity_ms", "is too large"));
        }

        if !(1..=MAX_PASSWORD_COST).contains(&self.auth.password_cost) {
            return Err(invalid(
                "auth.password_cost",
                format!("must be between 1 and {MAX_PASSWORD_COST}"),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(invalid(
                "log_level",
                format!("must be one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        Ok(())
    }

    /// Token lifetime. Zero for values `validate` rejects as too large.
    pub fn token_validity(&self) -> TimeDelta {
        i64::try_from(self.auth.token_validity_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or_else(TimeDelta::zero)
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}
