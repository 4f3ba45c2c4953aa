//! Task Repository: typed task operations over the API client
//!
//! [`TaskRepository`] is the seam the view model depends on. The production
//! implementation, [`HttpTaskRepository`], delegates each call to the
//! [`ApiClient`] unchanged and adds no error kinds of its own; tests plug in
//! an in-memory implementation instead.

use async_trait::async_trait;
use std::sync::Arc;
use taskdesk_shared::models::task::{Ack, Task, TaskFields};

use crate::api::ApiClient;
use crate::error::ClientResult;

/// Source of truth for task data
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetches the full task collection
    async fn list(&self) -> ClientResult<Vec<Task>>;

    /// Creates a task and returns it as stored by the server
    async fn create(&self, fields: &TaskFields) -> ClientResult<Task>;

    /// Replaces the writable fields of task `id`
    async fn update(&self, id: &str, fields: &TaskFields) -> ClientResult<Task>;

    /// Deletes task `id`
    async fn delete(&self, id: &str) -> ClientResult<Ack>;
}

/// Repository backed by the remote task service
#[derive(Clone, Debug)]
pub struct HttpTaskRepository {
    api: ApiClient,
}

impl HttpTaskRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl TaskRepository for HttpTaskRepository {
    async fn list(&self) -> ClientResult<Vec<Task>> {
        self.api.list_tasks().await
    }

    async fn create(&self, fields: &TaskFields) -> ClientResult<Task> {
        self.api.create_task(fields).await
    }

    async fn update(&self, id: &str, fields: &TaskFields) -> ClientResult<Task> {
        self.api.update_task(id, fields).await
    }

    async fn delete(&self, id: &str) -> ClientResult<Ack> {
        self.api.delete_task(id).await
    }
}

#[async_trait]
impl<R: TaskRepository + ?Sized> TaskRepository for Arc<R> {
    async fn list(&self) -> ClientResult<Vec<Task>> {
        (**self).list().await
    }

    async fn create(&self, fields: &TaskFields) -> ClientResult<Task> {
        (**self).create(fields).await
    }

    async fn update(&self, id: &str, fields: &TaskFields) -> ClientResult<Task> {
        (**self).update(id, fields).await
    }

    async fn delete(&self, id: &str) -> ClientResult<Ack> {
        (**self).delete(id).await
    }
}
