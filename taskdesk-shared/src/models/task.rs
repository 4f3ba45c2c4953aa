//! Task model and the field set sent on create/update
//!
//! A [`Task`] is one user-owned work item held by the remote task service.
//! The client never edits `id`, `owner_id` or `created_at`; those are assigned
//! server-side. Mutations go through [`TaskFields`], the writable subset.
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "_id": "65f1c0...",
//!   "userId": "65f1b9...",
//!   "title": "Write spec",
//!   "description": "",
//!   "status": "todo",
//!   "priority": "high",
//!   "dueDate": "2024-03-14T00:00:00Z",
//!   "createdAt": "2024-03-13T09:12:44Z"
//! }
//! ```
//!
//! `id`/`ownerId` are accepted as aliases of `_id`/`userId`.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use taskdesk_shared::models::task::{TaskFields, TaskPriority, TaskStatus};
//!
//! let fields = TaskFields::new("Write spec", Utc::now() + Duration::days(1))
//!     .with_priority(TaskPriority::High);
//!
//! assert_eq!(fields.status, TaskStatus::Todo);
//! assert!(fields.check().is_ok());
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::validation_message;

/// Width of the "due soon" window that precedes a task's due date
pub const NEAR_DEADLINE_WINDOW_HOURS: i64 = 24;

/// Task workflow status
///
/// Controls which filtered view a task appears in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    /// Every status, in filter-bar order
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status or priority
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(ParseEnumError {
                kind: "status",
                value: s.to_string(),
                expected: "todo, in_progress, completed",
            }),
        }
    }
}

/// Task priority
///
/// Purely advisory; it only affects how a task is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(ParseEnumError {
                kind: "priority",
                value: s.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

/// Task as returned by the remote task service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier, immutable after creation
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Owning user, set server-side
    #[serde(rename = "userId", alias = "ownerId")]
    pub owner_id: String,

    /// Short title (never empty)
    pub title: String,

    /// Free text, empty when the server omits it
    #[serde(default)]
    pub description: String,

    /// Workflow status
    pub status: TaskStatus,

    /// Display priority
    pub priority: TaskPriority,

    /// When the task is due
    pub due_date: DateTime<Utc>,

    /// When the server created the task
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Checks whether the task is due soon relative to `now`
    ///
    /// A task is flagged while `now` lies within the 24 hours that precede its
    /// due date, bounds included. Tasks already past due are not flagged.
    pub fn is_near_deadline(&self, now: DateTime<Utc>) -> bool {
        let window_start = self.due_date - Duration::hours(NEAR_DEADLINE_WINDOW_HOURS);
        window_start <= now && now <= self.due_date
    }

    /// Checks whether the task belongs in the view filtered by `status`
    pub fn matches(&self, status: TaskStatus) -> bool {
        self.status == status
    }
}

/// Writable task fields, sent as the body of create and update requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    /// Task title
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    /// Optional description
    #[serde(default)]
    pub description: String,

    /// Workflow status (default: todo)
    #[serde(default)]
    pub status: TaskStatus,

    /// Display priority (default: medium)
    #[serde(default)]
    pub priority: TaskPriority,

    /// Due date, serialized as an ISO-8601 instant
    pub due_date: DateTime<Utc>,
}

impl TaskFields {
    /// Creates a field set with the form defaults (todo, medium, no description)
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Validates the fields before they are sent
    ///
    /// # Errors
    ///
    /// Returns a human-readable message when the title is blank or too long.
    /// Length limits apply to the title with surrounding whitespace trimmed.
    pub fn check(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }

        let trimmed = Self {
            title: title.to_string(),
            ..self.clone()
        };
        trimmed.validate().map_err(|e| validation_message(&e))
    }
}

impl From<&Task> for TaskFields {
    /// Pre-fills an edit form from an existing task
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
        }
    }
}

/// Acknowledgement returned by the delete endpoint
///
/// The body shape is not guaranteed; an empty body yields the default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Optional server message, e.g. "Task deleted"
    #[serde(default)]
    pub message: Option<String>,
}
