//! Session Store: owner of the authentication token
//!
//! The store is read once from durable storage when the process starts
//! ([`SessionStore::restore`]) and served from memory afterwards. `login`
//! and `logout` update both copies. There is no expiry or refresh logic; a
//! token is trusted until the server rejects it.
//!
//! The store is injected into the API client (usually behind an `Arc`), so
//! tests can substitute a [`MemoryTokenStorage`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdesk_shared::session::{FileTokenStorage, SessionStore};
//!
//! # async fn example() -> Result<(), taskdesk_shared::session::SessionError> {
//! let storage = Arc::new(FileTokenStorage::new("/tmp/taskdesk/session.json"));
//! let session = SessionStore::restore(storage).await?;
//!
//! session.login("eyJhbGciOi...").await?;
//! assert!(session.is_authenticated().await);
//!
//! session.logout().await?;
//! assert_eq!(session.token().await, None);
//! # Ok(())
//! # }
//! ```

pub mod storage;

pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Storage key the token is persisted under
pub const TOKEN_KEY: &str = "token";

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// Durable storage could not be read or written
    #[error("Session storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Durable storage holds data that cannot be parsed
    #[error("Session storage is corrupt: {0}")]
    Corrupt(String),

    /// An empty string was offered as a token
    #[error("Cannot start a session with an empty token")]
    EmptyToken,
}

/// Session result type alias
pub type SessionResult<T> = Result<T, SessionError>;

/// Current authentication state
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    token: RwLock<Option<String>>,
}

impl SessionStore {
    /// Restores a session from durable storage
    ///
    /// This is the only time the store reads from storage; later reads are
    /// served from memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub async fn restore(storage: Arc<dyn TokenStorage>) -> SessionResult<Self> {
        let token = storage
            .get_item(TOKEN_KEY)
            .await?
            .filter(|t| !t.is_empty());

        tracing::debug!(restored = token.is_some(), "session restored");

        Ok(Self {
            storage,
            token: RwLock::new(token),
        })
    }

    /// Returns the current token, if signed in
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Starts a session with `token`
    ///
    /// The token is persisted first; memory only changes once storage
    /// succeeded, so a failed login leaves the previous session in place.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] for an empty token, or a storage
    /// error if persisting fails.
    pub async fn login(&self, token: impl Into<String>) -> SessionResult<()> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }

        self.storage.set_item(TOKEN_KEY, &token).await?;
        *self.token.write().await = Some(token);

        tracing::info!("session started");
        Ok(())
    }

    /// Ends the session
    ///
    /// Memory is cleared before storage, so requests stop carrying the
    /// credential even if removing the persisted copy fails.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted token cannot be removed.
    pub async fn logout(&self) -> SessionResult<()> {
        self.token.write().await.take();
        self.storage.remove_item(TOKEN_KEY).await?;

        tracing::info!("session ended");
        Ok(())
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let authenticated = self
            .token
            .try_read()
            .map(|t| t.is_some())
            .unwrap_or(false);

        f.debug_struct("SessionStore")
            .field("authenticated", &authenticated)
            .finish()
    }
}
