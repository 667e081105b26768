use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::retry::{BASE_DELAY_MS, DEFAULT_MAX_RETRIES};
use crate::url::{DEFAULT_BEGIN_PATH, DEFAULT_CONTINUE_PATH};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read HTTP service config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse HTTP service config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base_url '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("timeout_sec must be greater than zero")]
    ZeroTimeout,
}

/// Transport configuration for the HTTP generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServiceConfig {
    /// Absolute http(s) URL the flow paths are appended to.
    pub base_url: String,
    pub begin_path: String,
    pub continue_path: String,
    /// Per-request timeout. `None` leaves timing to the transport defaults.
    pub timeout: Option<Duration>,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: String,
    #[serde(default)]
    begin_path: Option<String>,
    #[serde(default)]
    continue_path: Option<String>,
    #[serde(default)]
    timeout_sec: Option<u64>,
    #[serde(default)]
    max_retries: Option<u32>,
}

impl HttpServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;

        Ok(Self {
            base_url: base_url.trim().to_string(),
            begin_path: DEFAULT_BEGIN_PATH.to_string(),
            continue_path: DEFAULT_CONTINUE_PATH.to_string(),
            timeout: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(BASE_DELAY_MS),
        })
    }

    /// Loads a UTF-8 JSON config file. Unknown fields are rejected.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|error| match error {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?;

        let mut config = Self::new(file.base_url)?;
        if let Some(path) = non_blank(file.begin_path) {
            config = config.with_begin_path(path);
        }
        if let Some(path) = non_blank(file.continue_path) {
            config = config.with_continue_path(path);
        }
        if let Some(timeout_sec) = file.timeout_sec {
            if timeout_sec == 0 {
                return Err(ConfigError::ZeroTimeout);
            }
            config = config.with_timeout(Duration::from_secs(timeout_sec));
        }
        if let Some(max_retries) = file.max_retries {
            config = config.with_max_retries(max_retries);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_begin_path(mut self, path: impl Into<String>) -> Self {
        self.begin_path = path.into();
        self
    }

    #[must_use]
    pub fn with_continue_path(mut self, path: impl Into<String>) -> Self {
        self.continue_path = path.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}

fn validate_base_url(value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason,
    };

    let parsed = url::Url::parse(value.trim()).map_err(|error| invalid(error.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
