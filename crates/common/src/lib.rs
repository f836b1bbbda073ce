// ================
// crates/common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between todo API clients and the server.
//! This module defines the JSON request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Sequence number type identifying a todo
pub type Seq = u64;

/// Token scheme reported to clients after login
pub const BEARER: &str = "Bearer";

/// Body of `POST /users/signup`, `POST /users/login` and `PUT /users/me`
///
/// Missing fields deserialize as empty strings so that the server can answer
/// them with the same 400 as blank fields.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    /// Login id of the account
    #[serde(default)]
    pub login_id: String,
    /// Plaintext password
    #[serde(default)]
    pub password: String,
}

/// Successful login response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// Signed bearer token
    pub access_token: String,
    /// Always [`BEARER`]
    #[serde(rename = "type")]
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: BEARER.to_string(),
        }
    }
}

/// Uniform error body: `{"error": "<code>", "message"?: "<text>"}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    /// Stable error code clients can branch on
    pub error: String,
    /// Human readable detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Public view of an account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub login_id: String,
}

/// Generic acknowledgement
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of `POST /todos` and `PUT /todos/{id}`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TodoRequest {
    #[serde(default)]
    pub content: String,
}

/// A todo as returned by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TodoResponse {
    pub seq: Seq,
    pub content: String,
}

/// Query string of `GET /todos/search`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub content: String,
}
