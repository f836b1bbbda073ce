//! Bearer-token interceptor.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use todo_common::BEARER;
use tracing::{debug, error};

use crate::auth::AuthContext;
use crate::error::AppError;
use crate::metrics::TOKEN_REJECTED;
use crate::storage::Storage;
use crate::AppState;

/// Token carried by an `Authorization: Bearer <token>` header.
///
/// Any other scheme, a non-UTF-8 header or an empty token counts as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER)?.strip_prefix(' ')?.trim();
    (!token.is_empty()).then_some(token)
}

/**
 * Resolve the caller from the bearer token and attach an [`AuthContext`].
 *
 * No token: the request continues unauthenticated without touching the store.
 * A token that fails validation ends the request with 401; a valid token whose
 * subject is gone ends it with 404; a store failure ends it with 500.
 */
pub async fn authenticate<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated)
    {
        return Ok(next.run(request).await);
    }

    let context = match bearer_token(request.headers()).map(str::to_owned) {
        None => AuthContext::Unauthenticated,
        Some(raw) => {
            let login_id = state
                .auth
                .validate_token(&raw, state.clock.now())
                .map_err(|kind| {
                    counter!(TOKEN_REJECTED).increment(1);
                    debug!(?kind, path = %request.uri().path(), "Token rejected");
                    AppError::from(kind)
                })?;

            let identity = state
                .storage
                .find_user_by_login_id(&login_id)
                .await
                .map_err(|e| {
                    error!(error = %e, "User lookup failed");
                    AppError::CredentialStoreUnavailable(e.to_string())
                })?
                .ok_or_else(|| {
                    debug!(login_id = %login_id, "Token subject no longer exists");
                    AppError::SubjectNotFound
                })?;

            AuthContext::Authenticated(identity.login_id)
        },
    };

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}
