// ABOUTME: Configuration loading and validation for gysd.
// ABOUTME: Reads GYSD_* environment variables with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use gysd_core::DEFAULT_INTERVAL_SECS;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GYSD_API_URL must be an http(s) URL, got: {0}")]
    InvalidApiUrl(String),

    #[error("GYSD_BACKUP_INTERVAL_SECS is not a positive number of seconds: {0}")]
    InvalidInterval(String),
}

/// Daemon configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GysdConfig {
    pub api_url: String,
    pub data_dir: PathBuf,
    pub interval: Duration,
    pub agent: String,
}

impl GysdConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - GYSD_API_URL: base URL of the gYS API (default: http://127.0.0.1:5000)
    /// - GYSD_DATA_DIR: directory for the snapshot stores (default: ~/.gysd)
    /// - GYSD_BACKUP_INTERVAL_SECS: periodic backup interval (default: 300)
    /// - GYSD_AGENT: agent string stamped into snapshot origins (default: gysd/<version>)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("GYSD_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        let data_dir = std::env::var("GYSD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::var("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("/tmp"))
                    .join(".gysd")
            });

        let interval = match std::env::var("GYSD_BACKUP_INTERVAL_SECS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidInterval(raw)),
            },
            Err(_) => Duration::from_secs(DEFAULT_INTERVAL_SECS),
        };

        let agent = std::env::var("GYSD_AGENT")
            .ok()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| format!("gysd/{}", env!("CARGO_PKG_VERSION")));

        Ok(Self {
            api_url,
            data_dir,
            interval,
            agent,
        })
    }
}
