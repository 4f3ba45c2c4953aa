//! Error handling for the client
//!
//! The API client is the only place transport and server failures are
//! translated. Everything above it (repository, view model, CLI) treats a
//! [`ClientError`] as an opaque failure whose `Display` output is the message
//! shown to the user.
//!
//! # Taxonomy
//!
//! - `Network`: no response was received at all
//! - `Server`: a response arrived with a non-success status (or an
//!   undecodable success body); the message comes from the body's `message`
//!   field or falls back to a generic text
//! - `Validation`: rejected client-side before any request was sent
//! - `Session`: the session token could not be persisted
//! - `Config`: the client could not be constructed

use serde::{Deserialize, Serialize};
use taskdesk_shared::session::SessionError;
use thiserror::Error;

/// Message surfaced when no response reached the client
pub const NETWORK_ERROR_MESSAGE: &str = "Network error - please check your connection";

/// Message surfaced when the server gave no usable `message`
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// Unified client error type
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received (connection refused, DNS failure, timeout...)
    #[error("Network error - please check your connection")]
    Network,

    /// The server answered with a failure
    #[error("{message}")]
    Server {
        /// HTTP status code of the response
        status: u16,

        /// Server-provided message, or the generic fallback
        message: String,
    },

    /// Input rejected before sending
    #[error("{0}")]
    Validation(String),

    /// Session storage failure
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Client construction failure
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Error body sent by the task service
///
/// Every field is optional; anything else in the body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ClientError {
    /// Builds a server error from a status and raw response body
    ///
    /// The body's `message` field is used verbatim when present and non-blank;
    /// otherwise (missing field, empty body, non-JSON body) the generic
    /// fallback is used.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());

        ClientError::Server { status, message }
    }

    /// HTTP status of a server error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network)
    }
}
