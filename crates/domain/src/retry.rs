//! Per-request retry policy
//!
//! A [`RetryPolicy`] decides how long a single HTTP attempt may take and how
//! many attempts a request gets. The per-attempt timeout grows geometrically:
//!
//! ```text
//! timeout(n) = initial_timeout_ms * backoff_multiplier^n
//! ```
//!
//! There is no sleep between attempts; the growing timeout is the backoff.
//! A computed timeout of zero means the attempt has no deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_TIMEOUT_MS, DEFAULT_MAX_RETRIES};
use crate::errors::{CaptureError, Result};

/// Raw retry settings as they arrive from configuration
///
/// Values are signed so that negative inputs can be rejected explicitly by
/// [`RetryPolicy::new`] instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicyConfig {
    /// Timeout of the first attempt; zero disables timeouts
    pub initial_timeout_ms: i64,
    /// Attempts allowed after the first one
    pub max_retries: i64,
    /// Factor applied to the timeout on every retry
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            initial_timeout_ms: DEFAULT_INITIAL_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

/// Validated, immutable retry policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    initial_timeout_ms: u64,
    max_retries: u32,
    backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_timeout_ms: DEFAULT_INITIAL_TIMEOUT_MS.unsigned_abs(),
            max_retries: DEFAULT_MAX_RETRIES.unsigned_abs() as u32,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Validate a configuration and build the policy
    ///
    /// # Errors
    /// Returns [`CaptureError::Config`] when any value is negative, when
    /// `max_retries` does not fit in `u32`, or when the multiplier is not a
    /// finite number.
    pub fn new(config: RetryPolicyConfig) -> Result<Self> {
        if config.initial_timeout_ms < 0 {
            return Err(CaptureError::Config(format!(
                "initial_timeout_ms must be >= 0, got {}",
                config.initial_timeout_ms
            )));
        }
        if config.max_retries < 0 {
            return Err(CaptureError::Config(format!(
                "max_retries must be >= 0, got {}",
                config.max_retries
            )));
        }
        if !config.backoff_multiplier.is_finite() || config.backoff_multiplier < 0.0 {
            return Err(CaptureError::Config(format!(
                "backoff_multiplier must be a finite value >= 0, got {}",
                config.backoff_multiplier
            )));
        }
        let max_retries = u32::try_from(config.max_retries).map_err(|_| {
            CaptureError::Config(format!("max_retries too large: {}", config.max_retries))
        })?;

        Ok(Self {
            initial_timeout_ms: config.initial_timeout_ms.unsigned_abs(),
            max_retries,
            backoff_multiplier: config.backoff_multiplier,
        })
    }

    /// Number of retries allowed after the first attempt
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total number of attempts, first one included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Timeout of the first attempt
    pub fn initial_timeout(&self) -> Duration {
        Duration::from_millis(self.initial_timeout_ms)
    }

    /// Per-attempt timeout growth factor
    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    /// Timeout for zero-based attempt `attempt`, `None` when unbounded
    ///
    /// Attempts past `max_retries` reuse the timeout of the last allowed
    /// attempt.
    pub fn timeout_for_attempt(&self, attempt: u32) -> Option<Duration> {
        let exponent = attempt.min(self.max_retries);
        let factor = self.backoff_multiplier.powi(i32::try_from(exponent).unwrap_or(i32::MAX));
        let millis = self.initial_timeout_ms as f64 * factor;

        if millis <= 0.0 || millis.is_nan() {
            return None;
        }
        if !millis.is_finite() || millis >= u64::MAX as f64 {
            return Some(Duration::from_millis(u64::MAX));
        }
        // Rounded to whole milliseconds
        let millis = millis.round() as u64;
        if millis == 0 {
            None
        } else {
            Some(Duration::from_millis(millis))
        }
    }

    /// Whether a failed zero-based attempt may be followed by another
    pub fn should_retry(&self, attempt: u32, error: &CaptureError) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }
}
