//! Tracing subscriber setup

use capture_domain::{CaptureError, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log output format
pub const LOG_FORMAT_ENV: &str = "CAPTURE_LOG_FORMAT";

/// Output format of the global subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one event per line
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Format named by `CAPTURE_LOG_FORMAT` (`json` or anything else)
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) if value.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install the global tracing subscriber
///
/// Filtering follows `RUST_LOG` and defaults to `default_directive`
/// (usually `info`). Output goes to stderr.
///
/// # Errors
/// Returns [`CaptureError::Config`] for an invalid directive or when a
/// global subscriber is already installed.
pub fn init_tracing(format: LogFormat, default_directive: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .map_err(|e| CaptureError::Config(format!("invalid log filter: {e}")))?,
    };

    let builder =
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Pretty => builder.with_target(false).try_init(),
    };

    installed.map_err(|e| CaptureError::Config(format!("tracing already initialised: {e}")))?;
    tracing::debug!(?format, "tracing initialised");
    Ok(())
}
