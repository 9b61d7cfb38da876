//! Client configuration: where the service lives and where the session
//! token is persisted.
//!
//! Resolution order is defaults, then an optional TOML file, then the
//! `TODO_SYNC_BASE_URL` / `TODO_SYNC_CREDENTIALS` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::client::DEFAULT_BASE_URL;

pub const BASE_URL_ENV: &str = "TODO_SYNC_BASE_URL";
pub const CREDENTIALS_ENV: &str = "TODO_SYNC_CREDENTIALS";

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials_path: default_credentials_path(),
        }
    }
}

/// Errors raised while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ClientConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load `path` if it exists, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(path) = lookup(CREDENTIALS_ENV).filter(|v| !v.is_empty()) {
            self.credentials_path = PathBuf::from(path);
        }
        self
    }
}

fn default_credentials_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("todo-sync")
        .join("credentials.json")
}
