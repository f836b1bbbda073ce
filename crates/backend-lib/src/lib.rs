// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the todo API server.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, Clock, DefaultAuth, RoutePolicy, SystemClock, TokenCodec};
use crate::config::{ConfigError, Settings};
use crate::storage::Storage;

pub use crate::router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Storage backend
    pub storage: S,
    /// Loaded settings
    pub settings: Arc<Settings>,
    /// Which paths need an authenticated caller
    pub policy: Arc<RoutePolicy>,
    /// Source of `now` for token checks
    pub clock: Arc<dyn Clock>,
}

impl<S> AppState<S>
where
    S: Storage + Clone + 'static,
{
    /// Create a new application state on the system clock
    pub fn new(storage: S, settings: Settings) -> Result<Self, ConfigError> {
        Self::with_clock(storage, settings, Arc::new(SystemClock))
    }

    /// Create a new application state with an explicit time source.
    ///
    /// Settings are validated here as well as at load time, since callers may build them by hand.
    pub fn with_clock(storage: S, settings: Settings, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        settings.validate()?;
        let codec = TokenCodec::new(settings.auth.jwt_secret.as_bytes(), settings.token_validity())?;
        let auth = Arc::new(DefaultAuth::new(
            storage.clone(),
            Arc::new(codec),
            settings.auth.password_cost,
        ));

        Ok(Self {
            auth,
            storage,
            settings: Arc::new(settings),
            policy: Arc::new(RoutePolicy::default()),
            clock,
        })
    }
}
