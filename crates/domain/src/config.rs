//! Configuration structures
//!
//! Loaded by `capture-infra::config::loader` from the environment or from a
//! JSON/TOML file. Every section has defaults so partial files are accepted.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_CACHE_MAX_CONCURRENT_LOADERS, DEFAULT_CACHE_MAX_SIZE_KB,
    DEFAULT_MAX_POLL_DURATION_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SESSION_EXPIRY_LEEWAY_SECS,
    DEFAULT_USER_CENTER_URL,
};
use crate::errors::{CaptureError, Result};
use crate::retry::{RetryPolicy, RetryPolicyConfig};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend endpoints and client credentials
    pub api: ApiConfig,
    /// HTTP retry policy
    pub retry: RetryPolicyConfig,
    /// Session refresh settings
    pub session: SessionConfig,
    /// Analysis polling settings
    pub pipeline: PipelineConfig,
    /// Page image cache settings
    pub cache: CacheSettings,
}

impl Config {
    /// Check cross-field constraints
    ///
    /// # Errors
    /// Returns [`CaptureError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        RetryPolicy::new(self.retry)?;

        if self.pipeline.poll_interval_ms == 0 {
            return Err(CaptureError::Config("poll_interval_ms must be greater than 0".into()));
        }
        if self.pipeline.max_poll_duration_ms < self.pipeline.poll_interval_ms {
            return Err(CaptureError::Config(
                "max_poll_duration_ms must not be shorter than poll_interval_ms".into(),
            ));
        }
        if self.cache.max_size_kb == 0 {
            return Err(CaptureError::Config("cache.max_size_kb must be greater than 0".into()));
        }
        if self.cache.max_concurrent_loaders == 0 {
            return Err(CaptureError::Config(
                "cache.max_concurrent_loaders must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Backend endpoints and client credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the document API (trailing slash optional)
    pub base_url: String,
    /// Base URL of the user center issuing bearer tokens
    pub user_center_url: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Domain used for generated anonymous usernames
    pub email_domain: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            user_center_url: DEFAULT_USER_CENTER_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            email_domain: "capture.local".to_string(),
        }
    }
}

impl ApiConfig {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("api.base_url", &self.base_url),
            ("api.user_center_url", &self.user_center_url),
            ("api.client_id", &self.client_id),
            ("api.email_domain", &self.email_domain),
        ] {
            if value.trim().is_empty() {
                return Err(CaptureError::Config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("user_center_url", &self.user_center_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("email_domain", &self.email_domain)
            .finish()
    }
}

/// Session handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions expiring within this window are treated as expired
    pub expiry_leeway_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { expiry_leeway_secs: DEFAULT_SESSION_EXPIRY_LEEWAY_SECS }
    }
}

impl SessionConfig {
    /// Expiry leeway as a duration
    pub fn expiry_leeway(&self) -> Duration {
        Duration::from_secs(self.expiry_leeway_secs)
    }
}

/// Analysis pipeline timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pause between processing state polls
    pub poll_interval_ms: u64,
    /// Polling longer than this fails the run with a timeout
    pub max_poll_duration_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_duration_ms: DEFAULT_MAX_POLL_DURATION_MS,
        }
    }
}

impl PipelineConfig {
    /// Poll interval as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Maximum poll duration as a duration
    pub fn max_poll_duration(&self) -> Duration {
        Duration::from_millis(self.max_poll_duration_ms)
    }
}

/// Payload cache sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Byte budget in kilobytes
    pub max_size_kb: usize,
    /// Loaders allowed to run at once
    pub max_concurrent_loaders: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size_kb: DEFAULT_CACHE_MAX_SIZE_KB,
            max_concurrent_loaders: DEFAULT_CACHE_MAX_CONCURRENT_LOADERS,
        }
    }
}
