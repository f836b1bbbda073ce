//! Route-policy enforcement.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{
    entry_point::{self, FULL_AUTHENTICATION_REQUIRED},
    AuthContext, Requirement,
};
use crate::storage::Storage;
use crate::AppState;

/// Reject unauthenticated requests for protected paths through the entry point.
///
/// Runs after [`authenticate`](super::authenticate), which never rejects a
/// request that carries no token.
pub async fn enforce_route_policy<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    let authenticated = request
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated);

    if state.policy.requirement(path) == Requirement::RequiresAuth && !authenticated {
        debug!(path, "Unauthenticated request for protected path");
        return entry_point::unauthorized(FULL_AUTHENTICATION_REQUIRED);
    }

    next.run(request).await
}
