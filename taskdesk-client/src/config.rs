//! Configuration management for the client
//!
//! This module loads configuration from environment variables (and a `.env`
//! file when present) into a type-safe configuration struct.
//!
//! # Environment Variables
//!
//! - `TASKDESK_API_URL`: Base URL of the task service (default: http://localhost:5000/api)
//! - `TASKDESK_TIMEOUT_SECS`: Transport timeout in seconds (default: 30)
//! - `TASKDESK_SESSION_FILE`: Where the session token is persisted
//!   (default: `<config dir>/taskdesk/session.json`)
//! - `RUST_LOG`: Log level (default: taskdesk_client=info)
//!
//! # Example
//!
//! ```no_run
//! use taskdesk_client::config::ClientConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env()?;
//! println!("Talking to {}", config.api.base_url);
//! # Ok(())
//! # }
//! ```

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default base URL of the remote task service
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default transport timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Remote service configuration
    pub api: ApiConfig,

    /// Session persistence configuration
    pub session: SessionConfig,
}

/// Remote task service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to (e.g. http://host/api)
    pub base_url: String,

    /// Transport timeout in seconds
    pub timeout_secs: u64,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// JSON file holding the persisted token
    pub file: PathBuf,
}

impl ApiConfig {
    /// Creates a configuration pointing at `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parses and checks the base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse, is not http(s), or cannot
    /// carry path segments.
    pub fn parsed_base_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid API URL '{}': {}", self.base_url, e))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("API URL must use http or https, got '{}'", url.scheme());
        }

        if url.cannot_be_a_base() {
            anyhow::bail!("API URL '{}' cannot be used as a base", self.base_url);
        }

        Ok(url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `TASKDESK_API_URL` is not a valid http(s) URL
    /// - `TASKDESK_TIMEOUT_SECS` is not a positive integer
    /// - No session file is configured and no user config directory exists
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let base_url = env::var("TASKDESK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_secs = env::var("TASKDESK_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()?;

        if timeout_secs == 0 {
            anyhow::bail!("TASKDESK_TIMEOUT_SECS must be greater than zero");
        }

        let file = match env::var("TASKDESK_SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file().ok_or_else(|| {
                anyhow::anyhow!(
                    "No config directory found; set TASKDESK_SESSION_FILE explicitly"
                )
            })?,
        };

        let config = Self {
            api: ApiConfig {
                base_url,
                timeout_secs,
            },
            session: SessionConfig { file },
        };

        config.api.parsed_base_url()?;
        Ok(config)
    }
}

/// `<config dir>/taskdesk/session.json`, if the platform has a config dir
pub fn default_session_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskdesk").join("session.json"))
}
