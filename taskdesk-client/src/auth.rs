//! Sign-in flow
//!
//! Connects the API client's auth endpoints to the Session Store: the client
//! only returns the token, and these helpers decide to persist it. A failed
//! call leaves the existing session untouched.

use taskdesk_shared::models::user::{Credentials, User};
use taskdesk_shared::session::SessionStore;

use crate::api::ApiClient;
use crate::error::ClientResult;

/// Logs in and persists the issued token
///
/// # Errors
///
/// Returns the API error (nothing is persisted), or a session error if the
/// token could not be stored.
pub async fn sign_in(
    api: &ApiClient,
    session: &SessionStore,
    credentials: &Credentials,
) -> ClientResult<User> {
    let response = api.login(credentials).await?;
    session.login(response.token).await?;

    tracing::info!(user_id = %response.user.id, "signed in");
    Ok(response.user)
}

/// Registers a new account and persists the issued token
///
/// # Errors
///
/// Same as [`sign_in`].
pub async fn sign_up(
    api: &ApiClient,
    session: &SessionStore,
    credentials: &Credentials,
) -> ClientResult<User> {
    let response = api.register(credentials).await?;
    session.login(response.token).await?;

    tracing::info!(user_id = %response.user.id, "registered and signed in");
    Ok(response.user)
}

/// Ends the session; later requests carry no credential
pub async fn sign_out(session: &SessionStore) -> ClientResult<()> {
    session.logout().await?;
    Ok(())
}
