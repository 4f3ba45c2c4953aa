//! API Client: the single choke point for calls to the task service
//!
//! Every request goes through [`ApiClient::execute`], which:
//! 1. Attaches `Authorization: Bearer <token>` when the session holds a token
//! 2. Sends the request once (no retries)
//! 3. Translates failures into [`ClientError`]
//!
//! The client reads the [`SessionStore`] but never writes it; callers decide
//! whether to persist a token returned by `login`/`register`.
//!
//! # Endpoints
//!
//! ```text
//! POST   /auth/login      {email, password}  -> {token, user}
//! POST   /auth/register   {email, password}  -> {token, user}
//! GET    /tasks                              -> Task[]
//! POST   /tasks           TaskFields         -> Task
//! PUT    /tasks/:id       TaskFields         -> Task
//! DELETE /tasks/:id                          -> ack
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdesk_client::{api::ApiClient, config::ApiConfig};
//! use taskdesk_shared::session::{MemoryTokenStorage, SessionStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let session = Arc::new(SessionStore::restore(Arc::new(MemoryTokenStorage::new())).await?);
//! let api = ApiClient::new(&ApiConfig::default(), session)?;
//!
//! let tasks = api.list_tasks().await?;
//! println!("{} tasks", tasks.len());
//! # Ok(())
//! # }
//! ```

use reqwest::{header, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use taskdesk_shared::models::{
    task::{Ack, Task, TaskFields},
    user::{AuthResponse, Credentials},
};
use taskdesk_shared::session::SessionStore;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult, FALLBACK_ERROR_MESSAGE};

/// HTTP client for the remote task service
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Creates a client for the service described by `config`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        let base_url = config
            .parsed_base_url()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("taskdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Session the client reads its credential from
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Authenticates an existing user
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        credentials.check().map_err(ClientError::Validation)?;
        self.send_json(Method::POST, &["auth", "login"], Some(credentials))
            .await
    }

    /// Creates an account and authenticates it
    pub async fn register(&self, credentials: &Credentials) -> ClientResult<AuthResponse> {
        credentials.check().map_err(ClientError::Validation)?;
        self.send_json(Method::POST, &["auth", "register"], Some(credentials))
            .await
    }

    /// Lists the caller's tasks
    pub async fn list_tasks(&self) -> ClientResult<Vec<Task>> {
        self.send_json::<(), _>(Method::GET, &["tasks"], None).await
    }

    pub async fn create_task(&self, fields: &TaskFields) -> ClientResult<Task> {
        fields.check().map_err(ClientError::Validation)?;
        self.send_json(Method::POST, &["tasks"], Some(fields)).await
    }

    pub async fn update_task(&self, id: &str, fields: &TaskFields) -> ClientResult<Task> {
        fields.check().map_err(ClientError::Validation)?;
        self.send_json(Method::PUT, &["tasks", id], Some(fields)).await
    }

    /// Deletes a task
    ///
    /// The acknowledgement body is parsed leniently: an empty or non-JSON
    /// body yields an empty [`Ack`].
    pub async fn delete_task(&self, id: &str) -> ClientResult<Ack> {
        let request = self.request(Method::DELETE, &["tasks", id])?;
        let (_, body) = self.execute(request).await?;

        Ok(serde_json::from_slice(&body).unwrap_or_default())
    }

    /// Builds the URL for `segments` below the base URL
    ///
    /// Segments are percent-encoded, so opaque IDs cannot escape their slot.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        Ok(self.http.request(method, url))
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.request(method, segments)?;
        if let Some(body) = body {
            request = request.json(body);
        }

        let (status, bytes) = self.execute(request).await?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(status, error = %e, "response body did not match the expected shape");
            ClientError::Server {
                status,
                message: FALLBACK_ERROR_MESSAGE.to_string(),
            }
        })
    }

    /// Sends a request and returns the status and body of a success response
    ///
    /// # Errors
    ///
    /// - [`ClientError::Network`] if no response (or no complete body) arrived
    /// - [`ClientError::Server`] for any non-2xx status
    async fn execute(&self, request: RequestBuilder) -> ClientResult<(u16, Vec<u8>)> {
        let request = match self.session.token().await {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        };

        let request = request.build().map_err(|e| {
            ClientError::Config(format!("Failed to build request: {}", e))
        })?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        tracing::debug!(%method, %path, "sending request");

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "no response from task service");
            ClientError::Network
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "response body interrupted");
            ClientError::Network
        })?;

        if !status.is_success() {
            let err = ClientError::from_response(status.as_u16(), &body);
            tracing::debug!(%method, %path, status = status.as_u16(), error = %err, "request rejected");
            return Err(err);
        }

        tracing::debug!(%method, %path, status = status.as_u16(), "request succeeded");
        Ok((status.as_u16(), body.to_vec()))
    }
}
