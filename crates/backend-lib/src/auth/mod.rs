// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod clock;
pub mod context;
pub mod entry_point;
pub mod password;
pub mod policy;
pub mod token;
mod service;
mod service_impl;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::AuthContext;
pub use password::{
    hash_password, verify_credential, verify_password, Credential, PasswordError, DEFAULT_PASSWORD_COST,
};
pub use policy::{Requirement, RoutePolicy};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{Claims, CodecError, TokenCodec, TokenError};
