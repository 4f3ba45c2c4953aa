//! Durable key/value storage for session state
//!
//! The session only ever persists one value (the bearer token), but storage is
//! modelled as a small string key/value store so the same port serves file
//! persistence in the CLI and in-memory persistence in tests.
//!
//! # Implementations
//!
//! - [`FileTokenStorage`]: a JSON object on disk, rewritten on every change
//! - [`MemoryTokenStorage`]: a shared map; clones see the same items

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{SessionError, SessionResult};

/// Key/value storage that survives a process restart
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Reads the value stored under `key`, if any
    async fn get_item(&self, key: &str) -> SessionResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> SessionResult<()>;

    /// Removes `key`; removing a missing key is not an error
    async fn remove_item(&self, key: &str) -> SessionResult<()>;
}

/// File-backed storage
///
/// Items live in a single JSON object file. A missing file reads as empty;
/// parent directories are created on the first write.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_items(&self) -> SessionResult<BTreeMap<String, String>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(SessionError::Io(e)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|e| {
            SessionError::Corrupt(format!("{}: {}", self.path.display(), e))
        })
    }

    async fn write_items(&self, items: &BTreeMap<String, String>) -> SessionResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_string_pretty(items)
            .map_err(|e| SessionError::Corrupt(e.to_string()))?;

        // Write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("tmp");
        match tokio::fs::remove_file(&tmp).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        // The file holds a bearer credential: owner read/write only.
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp).await?;
        file.write_all(body.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "session storage written");
        Ok(())
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn get_item(&self, key: &str) -> SessionResult<Option<String>> {
        Ok(self.read_items().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: &str) -> SessionResult<()> {
        let mut items = self.read_items().await?;
        items.insert(key.to_string(), value.to_string());
        self.write_items(&items).await
    }

    async fn remove_item(&self, key: &str) -> SessionResult<()> {
        let mut items = self.read_items().await?;
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.write_items(&items).await
    }
}

/// In-memory storage
///
/// Cloning shares the underlying map, which lets tests simulate a reload by
/// restoring a fresh session from a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn get_item(&self, key: &str) -> SessionResult<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> SessionResult<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> SessionResult<()> {
        self.items.lock().await.remove(key);
        Ok(())
    }
}
