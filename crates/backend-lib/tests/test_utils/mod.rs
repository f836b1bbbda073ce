//! Test utilities for the todo API tests
//!
//! Builds the full router over a temporary flat-file store, with a storage
//! wrapper that counts and optionally fails user lookups and a clock the
//! test can move.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use todo_backend_lib::{
    auth::Clock,
    config::Settings,
    create_router,
    error::AppError,
    storage::{FlatFileStorage, Identity, Storage, Todo},
    AppState,
};
use todo_common::Seq;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret-0123456789abcdef";
pub const VALIDITY_MS: u64 = 60_000;

/// A clock the test moves by hand
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Flat-file storage that records user lookups and can be told to fail them
#[derive(Clone)]
pub struct CountingStorage {
    inner: FlatFileStorage,
    lookups: Arc<AtomicUsize>,
    fail_lookups: Arc<AtomicBool>,
}

impl CountingStorage {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn find_user_by_login_id(&self, login_id: &str) -> Result<Option<Identity>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::other("disk unplugged")));
        }
        self.inner.find_user_by_login_id(login_id).await
    }

    async fn user_exists(&self, login_id: &str) -> Result<bool, AppError> {
        self.inner.user_exists(login_id).await
    }

    async fn store_user(&self, identity: &Identity) -> Result<(), AppError> {
        self.inner.store_user(identity).await
    }

    async fn replace_user(&self, current_login_id: &str, updated: &Identity) -> Result<(), AppError> {
        self.inner.replace_user(current_login_id, updated).await
    }

    async fn delete_user(&self, login_id: &str) -> Result<bool, AppError> {
        self.inner.delete_user(login_id).await
    }

    async fn insert_todo(&self, content: &str) -> Result<Todo, AppError> {
        self.inner.insert_todo(content).await
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, AppError> {
        self.inner.list_todos().await
    }

    async fn find_todo(&self, seq: Seq) -> Result<Option<Todo>, AppError> {
        self.inner.find_todo(seq).await
    }

    async fn find_todo_by_content(&self, content: &str) -> Result<Option<Todo>, AppError> {
        self.inner.find_todo_by_content(content).await
    }

    async fn replace_todo(&self, todo: &Todo) -> Result<bool, AppError> {
        self.inner.replace_todo(todo).await
    }

    async fn delete_todo(&self, seq: Seq) -> Result<bool, AppError> {
        self.inner.delete_todo(seq).await
    }
}

/// The full application over a temporary store.
///
/// Keep the value alive for the whole test; dropping it removes the store.
pub struct TestApp {
    pub router: Router,
    pub storage: CountingStorage,
    pub clock: Arc<ManualClock>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let storage = CountingStorage {
            inner: FlatFileStorage::new(temp_dir.path()).unwrap(),
            lookups: Arc::new(AtomicUsize::new(0)),
            fail_lookups: Arc::new(AtomicBool::new(false)),
        };

        let mut settings = Settings::default();
        settings.storage.path = temp_dir.path().to_path_buf();
        settings.auth.jwt_secret = SECRET.to_string().into();
        settings.auth.token_validity_ms = VALIDITY_MS;
        settings.auth.password_cost = 4;
        settings.validate().unwrap();

        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
        let state = AppState::with_clock(storage.clone(), settings, clock.clone()).unwrap();

        Self {
            router: create_router(Arc::new(state)),
            storage,
            clock,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request, returning the status and the JSON body (`Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Send with `Authorization: Bearer <token>`
    pub async fn send_authed(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send(method, uri, Some(&format!("Bearer {token}")), body).await
    }

    pub async fn signup(&self, login_id: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/users/signup",
            None,
            Some(json!({ "loginId": login_id, "password": password })),
        )
        .await
    }

    pub async fn login(&self, login_id: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/users/login",
            None,
            Some(json!({ "loginId": login_id, "password": password })),
        )
        .await
    }

    /// Sign up and log in, returning the access token
    pub async fn token_for(&self, login_id: &str, password: &str) -> String {
        let (status, _) = self.signup(login_id, password).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login(login_id, password).await;
        assert_eq!(status, StatusCode::CREATED);
        body["access_token"].as_str().unwrap().to_string()
    }
}
