//! Request-scoped authentication context.
//!
//! A fresh value is attached to every request by the authentication middleware
//! and lives in that request's extensions only. Nothing here is global.

/// Outcome of authentication for one request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthContext {
    #[default]
    Unauthenticated,
    Authenticated(String),
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated(_))
    }

    /// Login id of the authenticated caller
    pub fn login_id(&self) -> Option<&str> {
        match self {
            AuthContext::Authenticated(login_id) => Some(login_id),
            AuthContext::Unauthenticated => None,
        }
    }
}
