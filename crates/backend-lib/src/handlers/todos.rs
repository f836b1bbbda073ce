//! `/todos` handlers. Todos are shared by all authenticated users.
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use todo_common::{MessageResponse, SearchQuery, Seq, TodoRequest, TodoResponse};
use tracing::debug;

use super::{json_body, path_param, query_params};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::storage::{Storage, Todo};
use crate::validation::validate_todo_content;
use crate::AppState;

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            seq: todo.seq,
            content: todo.content,
        }
    }
}

fn todo_not_found() -> AppError {
    AppError::NotFound("Todo".to_string())
}

/// `POST /todos`
pub async fn create_todo<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(login_id): CurrentUser,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), AppError> {
    let body = json_body(payload)?;
    let content = validate_todo_content(&body.content)?;

    let todo = state.storage.insert_todo(content).await?;
    debug!(login_id = %login_id, seq = todo.seq, "Todo created");

    Ok((StatusCode::CREATED, Json(todo.into())))
}

/// `GET /todos`
pub async fn list_todos<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _user: CurrentUser,
) -> Result<Json<Vec<TodoResponse>>, AppError> {
    let todos = state.storage.list_todos().await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

/// `GET /todos/{id}`
pub async fn get_todo<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _user: CurrentUser,
    seq: Result<Path<Seq>, PathRejection>,
) -> Result<Json<TodoResponse>, AppError> {
    let seq = path_param(seq)?;
    let todo = state.storage.find_todo(seq).await?.ok_or_else(todo_not_found)?;
    Ok(Json(todo.into()))
}

/// `PUT /todos/{id}`
pub async fn update_todo<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(login_id): CurrentUser,
    seq: Result<Path<Seq>, PathRejection>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<Json<TodoResponse>, AppError> {
    let seq = path_param(seq)?;
    let body = json_body(payload)?;
    let content = validate_todo_content(&body.content)?;

    let existing = state.storage.find_todo(seq).await?.ok_or_else(todo_not_found)?;
    let updated = existing.with_content(content);
    if !state.storage.replace_todo(&updated).await? {
        return Err(todo_not_found());
    }

    debug!(login_id = %login_id, seq, "Todo updated");
    Ok(Json(updated.into()))
}

/// `DELETE /todos/{id}`
pub async fn delete_todo<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(login_id): CurrentUser,
    seq: Result<Path<Seq>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let seq = path_param(seq)?;
    if !state.storage.delete_todo(seq).await? {
        return Err(todo_not_found());
    }

    debug!(login_id = %login_id, seq, "Todo deleted");
    Ok(Json(MessageResponse {
        message: format!("Todo {seq} deleted"),
    }))
}

/// `GET /todos/search?content=`
pub async fn search_todos<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _user: CurrentUser,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<TodoResponse>, AppError> {
    let query = query_params(query)?;
    let content = validate_todo_content(&query.content)?;

    let todo = state
        .storage
        .find_todo_by_content(content)
        .await?
        .ok_or_else(todo_not_found)?;
    Ok(Json(todo.into()))
}
