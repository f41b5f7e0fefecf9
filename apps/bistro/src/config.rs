//! # Client Configuration
//!
//! Resolution order, later wins:
//!
//! 1. built-in defaults
//! 2. TOML file: `--config`, else `BISTRO_CONFIG`, else `./bistro.toml` if present
//! 3. environment: `BISTRO_API_URL`, `BISTRO_HUB_URL`, `BISTRO_STATE`
//! 4. command-line flags (applied by the CLI)
//!
//! ```toml
//! api_url = "https://pos.example.com"
//! state_path = "bistro-state.redb"
//!
//! [hub]
//! max_retries = 5
//! base_delay_ms = 2000
//! ```

use crate::hub::{HubOptions, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "bistro.toml";
pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_STATE_PATH: &str = "bistro-state.redb";

/// Path of the hub relative to the API root when no hub URL is configured.
pub const DEFAULT_HUB_PATH: &str = "/hubs/notifications";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Hub connection tuning as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
    pub reconnect_delay_ms: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            jitter_ms: 1_000,
            reconnect_delay_ms: 1_000,
            connect_timeout_secs: 10,
        }
    }
}

impl HubSettings {
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms.max(self.base_delay_ms)),
            jitter: Duration::from_millis(self.jitter_ms),
        }
    }

    #[must_use]
    pub fn options(&self) -> HubOptions {
        HubOptions {
            retry: self.retry_policy(),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
        }
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub hub_url: Option<String>,
    pub state_path: PathBuf,
    pub request_timeout_secs: u64,
    pub hub: HubSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            hub_url: None,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            request_timeout_secs: 30,
            hub: HubSettings::default(),
        }
    }
}

impl Config {
    /// Load from file and environment.
    ///
    /// An explicitly named file must exist; the default `bistro.toml` is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("BISTRO_CONFIG").map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;
        tracing::debug!(?path, "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Apply `BISTRO_*` overrides; blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get("BISTRO_API_URL") {
            self.api_url = url;
        }
        if let Some(url) = get("BISTRO_HUB_URL") {
            self.hub_url = Some(url);
        }
        if let Some(path) = get("BISTRO_STATE") {
            self.state_path = PathBuf::from(path);
        }
    }

    /// API root without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Explicit hub URL, or the default hub path under the API root.
    #[must_use]
    pub fn hub_url(&self) -> String {
        match &self.hub_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("{}{}", self.api_base(), DEFAULT_HUB_PATH),
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
