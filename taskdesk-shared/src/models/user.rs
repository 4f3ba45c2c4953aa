//! User and authentication payloads
//!
//! The auth endpoints (`POST /auth/login`, `POST /auth/register`) take
//! [`Credentials`] and answer with an [`AuthResponse`]: a bearer token plus the
//! [`User`] it was issued to. The client treats the user as opaque.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::validation_message;

/// User returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned user ID
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    /// Email address
    pub email: String,

    /// Account creation time (not always sent)
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Login/registration request body
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password, only ever sent over the wire
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Validates the credentials before they are sent
    ///
    /// # Errors
    ///
    /// Returns a human-readable message for the first invalid field.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| validation_message(&e))
    }
}

// Keeps passwords out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Successful login/registration response
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token to attach to subsequent requests
    pub token: String,

    /// Account the token was issued to
    pub user: User,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"***")
            .field("user", &self.user)
            .finish()
    }
}
