use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::refresh::{DEFAULT_FAILURE_CEILING, RefreshConfig};

/// Environment variable that overrides `api_base_url`.
pub const API_BASE_URL_ENV: &str = "ASCEND_API_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("ascend")
        .join("config.json")
}

fn default_api_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_poll_failure_ceiling() -> u32 {
    DEFAULT_FAILURE_CEILING
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AscendConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_failure_ceiling")]
    pub poll_failure_ceiling: u32,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for AscendConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_failure_ceiling: default_poll_failure_ceiling(),
            debug_logging: false,
        }
    }
}

impl AscendConfig {
    pub fn path() -> PathBuf {
        default_config_path()
    }

    /// Load from the default location, then apply the environment override.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::path())?;
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            config.api_base_url = url;
        }
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_err)
    }

    pub fn refresh(&self) -> RefreshConfig {
        RefreshConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            failure_ceiling: self.poll_failure_ceiling,
        }
    }
}
