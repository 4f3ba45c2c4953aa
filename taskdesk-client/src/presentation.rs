//! Text rendering for the `taskdesk` command line
//!
//! Pure functions from view-model state to strings, plus the input parsing the
//! task form needs. Nothing here talks to the network.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::fmt::Write as _;
use taskdesk_shared::models::task::{Task, TaskStatus};

use crate::notification::{Notification, NotificationLevel};
use crate::view_model::{ListView, EMPTY_STATE_MESSAGE};

/// Marker appended to tasks due within 24 hours
pub const DUE_SOON_MARKER: &str = "Due soon";

/// Renders the status filter bar, highlighting `active`
///
/// ```text
/// [To Do]  In Progress   Completed
/// ```
pub fn render_filter_bar(active: TaskStatus) -> String {
    TaskStatus::ALL
        .iter()
        .map(|status| {
            if *status == active {
                format!("[{}]", status.label())
            } else {
                format!(" {} ", status.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders one task as a short block
pub fn render_task(task: &Task, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  ({})", task.title, task.id);
    if !task.description.is_empty() {
        let _ = writeln!(out, "    {}", task.description);
    }

    let _ = write!(
        out,
        "    {} Priority · Due: {}",
        task.priority.label(),
        task.due_date.format("%b %-d, %Y")
    );
    if task.is_near_deadline(now) {
        let _ = write!(out, " · {}", DUE_SOON_MARKER);
    }
    out
}

/// Renders the task list, including its loading, error and empty states
pub fn render_list(view: &ListView<'_>, now: DateTime<Utc>) -> String {
    match view {
        ListView::Loading => "Loading tasks...".to_string(),
        ListView::Error(message) => format!("Error: {}", message),
        ListView::Empty => EMPTY_STATE_MESSAGE.to_string(),
        ListView::Tasks(tasks) => tasks
            .iter()
            .map(|t| render_task(t, now))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn render_notification(notification: &Notification) -> String {
    match notification.level {
        NotificationLevel::Success => format!("✔ {}", notification.message),
        NotificationLevel::Error => format!("✘ {}", notification.message),
    }
}

/// Parses a due date from the command line
///
/// Accepts an RFC 3339 instant, or a bare `YYYY-MM-DD` date taken as
/// midnight UTC.
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        format!(
            "invalid due date '{}' (expected YYYY-MM-DD or an RFC 3339 timestamp)",
            input
        )
    })?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("invalid due date '{}'", input))?;

    Ok(Utc.from_utc_datetime(&midnight))
}
