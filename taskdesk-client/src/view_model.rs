//! Task View Model: in-memory task state and its derived views
//!
//! # State Machine
//!
//! ```text
//! Loading ──list ok──▶ Ready(tasks, filter) ──set_filter──▶ Ready(tasks, filter')
//!    │                      │
//!    │                      └─mutation ok──▶ Loading (full refetch)
//!    └──list failed──▶ Error(message)
//! ```
//!
//! Every successful create, update or delete is followed by a full reload of
//! the collection; the view model never patches its copy locally. Failed
//! mutations leave the state untouched and hand the error back to the caller,
//! which still holds the unsaved form fields.
//!
//! The active filter survives reloads and defaults to `todo`.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use taskdesk_shared::models::task::{Task, TaskFields, TaskStatus};
use thiserror::Error;

use crate::error::ClientResult;
use crate::notification::{Notification, NotificationSender};
use crate::repository::TaskRepository;

/// Shown when the active filter matches no task
pub const EMPTY_STATE_MESSAGE: &str = "No tasks found. Create your first task!";

/// View model errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The operation needs loaded tasks
    #[error("Tasks are not loaded")]
    NotReady,
}

pub type ViewResult<T> = Result<T, ViewError>;

/// Load state of the task collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// A fetch is in flight
    Loading,

    /// Tasks are loaded and filtered by `filter`
    Ready { tasks: Vec<Task>, filter: TaskStatus },

    /// The last fetch failed
    Error(String),
}

/// What the task list should show right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Error(&'a str),
    /// Loaded, but nothing matches the active filter
    Empty,
    Tasks(Vec<&'a Task>),
}

/// Holds the task collection and orchestrates refetch-after-mutation
pub struct TaskViewModel<R> {
    repository: R,
    state: ViewState,
    selected: TaskStatus,
    notifications: NotificationSender,
}

impl<R: TaskRepository> TaskViewModel<R> {
    /// Creates a view model in the `Loading` state
    ///
    /// Nothing is fetched until [`load`](Self::load) is awaited.
    pub fn new(repository: R, notifications: NotificationSender) -> Self {
        Self {
            repository,
            state: ViewState::Loading,
            selected: TaskStatus::default(),
            notifications,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Active filter
    pub fn filter(&self) -> TaskStatus {
        self.selected
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Enters `Loading` and fetches the full collection
    ///
    /// On success the state becomes `Ready` with the previously selected
    /// filter. On failure it becomes `Error` and an error notification is
    /// emitted.
    pub async fn load(&mut self) {
        self.state = ViewState::Loading;

        match self.repository.list().await {
            Ok(tasks) => {
                let tasks = dedup_by_id(tasks);
                tracing::debug!(count = tasks.len(), filter = %self.selected, "tasks loaded");
                self.state = ViewState::Ready {
                    tasks,
                    filter: self.selected,
                };
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, "failed to load tasks");
                self.notify(Notification::error(message.clone()));
                self.state = ViewState::Error(message);
            }
        }
    }

    /// Changes the active filter without refetching
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotReady`] unless the state is `Ready`.
    pub fn set_filter(&mut self, status: TaskStatus) -> ViewResult<()> {
        match &mut self.state {
            ViewState::Ready { filter, .. } => {
                *filter = status;
                self.selected = status;
                Ok(())
            }
            _ => Err(ViewError::NotReady),
        }
    }

    /// Every loaded task, regardless of filter
    pub fn tasks(&self) -> &[Task] {
        match &self.state {
            ViewState::Ready { tasks, .. } => tasks,
            _ => &[],
        }
    }

    /// Loaded tasks whose status equals the active filter
    pub fn filtered(&self) -> Vec<&Task> {
        match &self.state {
            ViewState::Ready { tasks, filter } => {
                tasks.iter().filter(|t| t.matches(*filter)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Derived list view, including the explicit empty state
    pub fn list_view(&self) -> ListView<'_> {
        match &self.state {
            ViewState::Loading => ListView::Loading,
            ViewState::Error(message) => ListView::Error(message),
            ViewState::Ready { .. } => {
                let tasks = self.filtered();
                if tasks.is_empty() {
                    ListView::Empty
                } else {
                    ListView::Tasks(tasks)
                }
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    /// Filtered tasks that are due within the next 24 hours of `now`
    pub fn due_soon(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.filtered()
            .into_iter()
            .filter(|t| t.is_near_deadline(now))
            .collect()
    }

    /// Creates a task, or updates `existing_id` when given
    ///
    /// On success a notification is emitted and the collection is reloaded.
    ///
    /// # Errors
    ///
    /// Returns the repository error after emitting an error notification; the
    /// state is left as it was.
    pub async fn create_or_update(
        &mut self,
        fields: &TaskFields,
        existing_id: Option<&str>,
    ) -> ClientResult<Task> {
        let result = match existing_id {
            Some(id) => self.repository.update(id, fields).await,
            None => self.repository.create(fields).await,
        };

        match result {
            Ok(task) => {
                let message = if existing_id.is_some() {
                    "Task updated successfully!"
                } else {
                    "Task created successfully!"
                };
                tracing::info!(task_id = %task.id, "{}", message);
                self.notify(Notification::success(message));
                self.load().await;
                Ok(task)
            }
            Err(err) => {
                tracing::warn!(error = %err, task_id = existing_id.unwrap_or("<new>"), "failed to save task");
                self.notify(Notification::error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Deletes a task, then reloads on success
    ///
    /// # Errors
    ///
    /// Returns the repository error after emitting an error notification; the
    /// state is left as it was.
    pub async fn delete_task(&mut self, id: &str) -> ClientResult<()> {
        match self.repository.delete(id).await {
            Ok(_) => {
                tracing::info!(task_id = %id, "task deleted");
                self.notify(Notification::success("Task deleted successfully!"));
                self.load().await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, task_id = %id, "failed to delete task");
                self.notify(Notification::error(err.to_string()));
                Err(err)
            }
        }
    }

    fn notify(&self, notification: Notification) {
        // A closed receiver just means nobody is showing toasts.
        if self.notifications.send(notification).is_err() {
            tracing::debug!("notification dropped, receiver closed");
        }
    }
}

/// Keeps the first task for each id
fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    let total = tasks.len();
    let unique: Vec<Task> = tasks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect();

    if unique.len() != total {
        tracing::warn!(dropped = total - unique.len(), "server returned duplicate task ids");
    }
    unique
}
