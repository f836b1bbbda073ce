//! Handler-side access to the authenticated caller.
use axum::{extract::FromRequestParts, http::request::Parts, response::Response};

use crate::auth::{
    entry_point::{self, FULL_AUTHENTICATION_REQUIRED},
    AuthContext,
};

/// Login id of the authenticated caller.
///
/// Rejects through the entry point if the request was never authenticated,
/// so a handler cannot run without an identity even if the policy layer is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthContext>() {
            Some(AuthContext::Authenticated(login_id)) => Ok(CurrentUser(login_id.clone())),
            _ => Err(entry_point::unauthorized(FULL_AUTHENTICATION_REQUIRED)),
        }
    }
}
