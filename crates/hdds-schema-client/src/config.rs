// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client configuration.
//!
//! Supports both programmatic and JSON file-based configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Static Basic credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Schema registry client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Registry base URL (e.g. `http://localhost:8081`).
    pub url: String,

    /// Per-request timeout in seconds (default: 5)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of in-flight HTTP requests (default: 16)
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Cache schemas by id and subject+version (default: true)
    #[serde(default = "default_true")]
    pub caching_enabled: bool,

    /// Also cache `latest` lookups (default: false)
    #[serde(default)]
    pub cache_latest: bool,

    /// Compile Avro codecs eagerly when schemas are fetched (default: false)
    #[serde(default)]
    pub codec_creation_enabled: bool,

    /// Optional Basic credentials.
    #[serde(default)]
    pub basic_auth: Option<BasicAuthConfig>,
}

fn default_timeout() -> u64 {
    5
}

fn default_max_concurrent_requests() -> usize {
    16
}

fn default_true() -> bool {
    true
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".to_string(),
            timeout_secs: default_timeout(),
            max_concurrent_requests: default_max_concurrent_requests(),
            caching_enabled: true,
            cache_latest: false,
            codec_creation_enabled: false,
            basic_auth: None,
        }
    }
}

impl ClientConfig {
    /// Default configuration pointing at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get request timeout as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Invalid("url cannot be empty".into()));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "url must use http or https: {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs cannot be 0".into()));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_requests cannot be 0".into(),
            ));
        }
        if let Some(ref auth) = self.basic_auth {
            if auth.username.is_empty() || auth.password.is_empty() {
                return Err(ConfigError::Invalid(
                    "basic_auth requires both username and password".into(),
                ));
            }
        }
        Ok(())
    }
}
