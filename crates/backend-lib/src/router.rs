// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP routes and middleware stack.
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::policy::{LOGIN_PATH, SIGNUP_PATH};
use crate::error::AppError;
use crate::handlers::{todos, users};
use crate::middleware::{authenticate, enforce_route_policy};
use crate::storage::Storage;
use crate::AppState;

/// Create the API router
pub fn create_router<S: Storage + Clone + 'static>(state: Arc<AppState<S>>) -> Router {
    // Layers run bottom-up: trace, then authenticate, then the route policy.
    Router::new()
        .route(SIGNUP_PATH, post(users::signup::<S>))
        .route(LOGIN_PATH, post(users::login::<S>))
        .route(
            "/users/me",
            get(users::me::<S>).put(users::update_me::<S>).delete(users::delete_me::<S>),
        )
        .route("/todos", post(todos::create_todo::<S>).get(todos::list_todos::<S>))
        .route("/todos/search", get(todos::search_todos::<S>))
        .route(
            "/todos/{id}",
            get(todos::get_todo::<S>)
                .put(todos::update_todo::<S>)
                .delete(todos::delete_todo::<S>),
        )
        .fallback(route_not_found)
        .layer(from_fn_with_state(state.clone(), enforce_route_policy::<S>))
        .layer(from_fn_with_state(state.clone(), authenticate::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route".to_string())
}
