//! Transient user notifications ("toasts")
//!
//! The view model emits a [`Notification`] for every outcome the user should
//! see briefly: a mutation succeeded, or an operation failed. Notifications
//! travel over an unbounded Tokio channel; the presentation layer owns the
//! receiver and drains it after each intent.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Sending half handed to the view model
pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Receiving half kept by the presentation layer
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Creates a notification channel
pub fn channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}

/// Takes every notification currently queued without waiting
pub fn drain(receiver: &mut NotificationReceiver) -> Vec<Notification> {
    let mut pending = Vec::new();
    while let Ok(notification) = receiver.try_recv() {
        pending.push(notification);
    }
    pending
}
