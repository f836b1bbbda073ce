//! `/users` handlers.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use todo_common::{CredentialsRequest, MessageResponse, TokenResponse, UserResponse};
use tracing::info;

use super::json_body;
use crate::auth::Credential;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::storage::Storage;
use crate::AppState;

/// `POST /users/signup`
pub async fn signup<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let body = json_body(payload)?;
    state.auth.register(&body.login_id, &body.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Signed up".to_string(),
        }),
    ))
}

/// `POST /users/login`
pub async fn login<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let body = json_body(payload)?;
    let credential = Credential::new(body.login_id, body.password);
    let token = state.auth.login(credential, state.clock.now()).await?;

    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token))))
}

/// `GET /users/me`
pub async fn me<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(login_id): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let identity = state
        .storage
        .find_user_by_login_id(&login_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(Json(UserResponse {
        login_id: identity.login_id,
    }))
}

/// `PUT /users/me`
pub async fn update_me<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(login_id): CurrentUser,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let body = json_body(payload)?;
    let updated = state
        .auth
        .change_identity(&login_id, &body.login_id, &body.password)
        .await?;

    Ok(Json(UserResponse {
        login_id: updated.login_id,
    }))
}

/// `DELETE /users/me`
pub async fn delete_me<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(login_id): CurrentUser,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.storage.delete_user(&login_id).await? {
        return Err(AppError::NotFound("User".to_string()));
    }

    info!(login_id = %login_id, "Account deleted");
    Ok(Json(MessageResponse {
        message: "Account deleted".to_string(),
    }))
}
