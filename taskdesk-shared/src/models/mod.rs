//! Data models exchanged with the remote task service
//!
//! # Models
//!
//! - `task`: Tasks, their status/priority enums and the writable field set
//! - `user`: Users, login/registration credentials and auth responses

pub mod task;
pub mod user;

use validator::ValidationErrors;

/// Flattens validator errors into a single user-facing message
///
/// Fields are visited in name order so the message is stable; the first
/// error's message wins, falling back to `"<field> is invalid"`.
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
        })
        .collect();

    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .next()
        .map(|(_, message)| message)
        .unwrap_or_else(|| "Validation failed".to_string())
}
