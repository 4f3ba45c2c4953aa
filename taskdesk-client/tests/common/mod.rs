//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An in-process fake of the remote task service (axum, ephemeral port)
//! - Failure injection for the next request
//! - A recorded log of `Authorization` headers
//! - A `TestContext` wiring session, storage and API client together

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use taskdesk_client::{api::ApiClient, config::ApiConfig};
use taskdesk_shared::models::task::{Task, TaskFields};
use taskdesk_shared::models::user::Credentials;
use taskdesk_shared::session::{MemoryTokenStorage, SessionStore};
use uuid::Uuid;

/// Shared state of the fake task service
#[derive(Clone, Default)]
pub struct FakeTaskService {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    /// email -> (user id, password)
    accounts: HashMap<String, (String, String)>,
    /// token -> user id
    tokens: HashMap<String, String>,
    tasks: Vec<Task>,
    auth_headers: Vec<Option<String>>,
    fail_next: Option<(StatusCode, String)>,
}

impl FakeTaskService {
    /// Makes the next request fail with `status` and a raw `body`
    pub fn fail_next(&self, status: StatusCode, body: impl Into<String>) {
        self.inner.lock().unwrap().fail_next = Some((status, body.into()));
    }

    /// Authorization headers seen so far, in arrival order
    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.inner.lock().unwrap().auth_headers.clone()
    }

    pub fn last_auth_header(&self) -> Option<String> {
        self.auth_headers().last().cloned().flatten()
    }

    /// Tasks currently stored server-side
    pub fn stored_tasks(&self) -> Vec<Task> {
        self.inner.lock().unwrap().tasks.clone()
    }

    /// Records the request and returns an injected failure, if any
    fn begin(&self, headers: &HeaderMap) -> Result<(), Response> {
        let mut inner = self.inner.lock().unwrap();
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        inner.auth_headers.push(auth);

        match inner.fail_next.take() {
            Some((status, body)) => Err((status, body).into_response()),
            None => Ok(()),
        }
    }

    /// Resolves the caller's user id from the bearer token
    fn caller(&self, headers: &HeaderMap) -> Result<String, Response> {
        let inner = self.inner.lock().unwrap();
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| inner.tokens.get(token).cloned())
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Please authenticate"))
    }

    fn issue_token(&self, inner: &mut Inner, user_id: &str, email: &str) -> Response {
        let token = format!("token-{}", Uuid::new_v4());
        inner.tokens.insert(token.clone(), user_id.to_string());
        Json(json!({
            "token": token,
            "user": { "_id": user_id, "email": email }
        }))
        .into_response()
    }

    /// Starts the service on an ephemeral port and returns its base URL
    pub async fn spawn(&self) -> anyhow::Result<String> {
        let app = Router::new()
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/tasks", get(list_tasks).post(create_task))
            .route("/api/tasks/:id", put(update_task).delete(delete_task))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(format!("http://{}/api", addr))
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn register(
    State(service): State<FakeTaskService>,
    headers: HeaderMap,
    Json(creds): Json<Credentials>,
) -> Response {
    if let Err(resp) = service.begin(&headers) {
        return resp;
    }

    let mut inner = service.inner.lock().unwrap();
    if inner.accounts.contains_key(&creds.email) {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }

    let user_id = Uuid::new_v4().to_string();
    inner
        .accounts
        .insert(creds.email.clone(), (user_id.clone(), creds.password.clone()));
    service.issue_token(&mut inner, &user_id, &creds.email)
}

async fn login(
    State(service): State<FakeTaskService>,
    headers: HeaderMap,
    Json(creds): Json<Credentials>,
) -> Response {
    if let Err(resp) = service.begin(&headers) {
        return resp;
    }

    let mut inner = service.inner.lock().unwrap();
    let user_id = match inner.accounts.get(&creds.email) {
        Some((id, password)) if *password == creds.password => id.clone(),
        _ => return error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    };
    service.issue_token(&mut inner, &user_id, &creds.email)
}

async fn list_tasks(State(service): State<FakeTaskService>, headers: HeaderMap) -> Response {
    if let Err(resp) = service.begin(&headers) {
        return resp;
    }
    let owner = match service.caller(&headers) {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };

    let inner = service.inner.lock().unwrap();
    let tasks: Vec<&Task> = inner.tasks.iter().filter(|t| t.owner_id == owner).collect();
    Json(json!(tasks)).into_response()
}

async fn create_task(
    State(service): State<FakeTaskService>,
    headers: HeaderMap,
    Json(fields): Json<TaskFields>,
) -> Response {
    if let Err(resp) = service.begin(&headers) {
        return resp;
    }
    let owner = match service.caller(&headers) {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };
    if fields.title.trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Title required");
    }

    let task = Task {
        id: Uuid::new_v4().to_string(),
        owner_id: owner,
        title: fields.title,
        description: fields.description,
        status: fields.status,
        priority: fields.priority,
        due_date: fields.due_date,
        created_at: Utc::now(),
    };
    service.inner.lock().unwrap().tasks.push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn update_task(
    State(service): State<FakeTaskService>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(fields): Json<TaskFields>,
) -> Response {
    if let Err(resp) = service.begin(&headers) {
        return resp;
    }
    let owner = match service.caller(&headers) {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };

    let mut inner = service.inner.lock().unwrap();
    let Some(task) = inner
        .tasks
        .iter_mut()
        .find(|t| t.id == id && t.owner_id == owner)
    else {
        return error(StatusCode::NOT_FOUND, "Task not found");
    };

    task.title = fields.title;
    task.description = fields.description;
    task.status = fields.status;
    task.priority = fields.priority;
    task.due_date = fields.due_date;
    Json(task.clone()).into_response()
}

async fn delete_task(
    State(service): State<FakeTaskService>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = service.begin(&headers) {
        return resp;
    }
    let owner = match service.caller(&headers) {
        Ok(owner) => owner,
        Err(resp) => return resp,
    };

    let mut inner = service.inner.lock().unwrap();
    let before = inner.tasks.len();
    inner.tasks.retain(|t| !(t.id == id && t.owner_id == owner));
    if inner.tasks.len() == before {
        return error(StatusCode::NOT_FOUND, "Task not found");
    }
    Json(json!({ "message": "Task deleted" })).into_response()
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub service: FakeTaskService,
    pub base_url: String,
    pub storage: MemoryTokenStorage,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
}

impl TestContext {
    /// Starts a fresh fake service with an unauthenticated session
    pub async fn new() -> anyhow::Result<Self> {
        let service = FakeTaskService::default();
        let base_url = service.spawn().await?;
        let storage = MemoryTokenStorage::new();
        let (session, api) = connect(&base_url, &storage).await?;

        Ok(TestContext {
            service,
            base_url,
            storage,
            session,
            api,
        })
    }

    /// Starts a fresh fake service and signs a new user in
    pub async fn signed_in() -> anyhow::Result<Self> {
        let ctx = Self::new().await?;
        taskdesk_client::auth::sign_up(&ctx.api, &ctx.session, &test_credentials()).await?;
        Ok(ctx)
    }

    /// Simulates a process restart: restores a new session from the same storage
    pub async fn reload(&self) -> anyhow::Result<(Arc<SessionStore>, ApiClient)> {
        connect(&self.base_url, &self.storage).await
    }
}

async fn connect(
    base_url: &str,
    storage: &MemoryTokenStorage,
) -> anyhow::Result<(Arc<SessionStore>, ApiClient)> {
    let session = Arc::new(SessionStore::restore(Arc::new(storage.clone())).await?);
    let api = ApiClient::new(&ApiConfig::new(base_url), session.clone())?;
    Ok((session, api))
}

pub fn test_credentials() -> Credentials {
    Credentials::new(format!("test-{}@example.com", Uuid::new_v4()), "password123")
}

/// Base URL on which nothing is listening
pub async fn unreachable_base_url() -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}/api", addr))
}
