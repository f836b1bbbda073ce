// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers.
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query},
    Json,
};

use crate::error::AppError;

pub mod todos;
pub mod users;

// Extractor rejections are reported in the uniform error shape.

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::InvalidInput(e.body_text()))
}

fn path_param<T>(param: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    param
        .map(|Path(value)| value)
        .map_err(|e| AppError::InvalidInput(e.body_text()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(value)| value)
        .map_err(|e| AppError::InvalidInput(e.body_text()))
}
