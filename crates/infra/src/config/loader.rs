//! Configuration loader
//!
//! Loads capture configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file from the working directory, if present
//! 2. Attempts to load from environment variables
//! 3. If the client credentials are not in the environment, falls back to a
//!    config file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! The result is validated before it is returned.
//!
//! ## Environment Variables
//! - `CAPTURE_CLIENT_ID` (required): user center client id
//! - `CAPTURE_CLIENT_SECRET` (required): user center client secret
//! - `CAPTURE_API_BASE_URL`: document API base URL
//! - `CAPTURE_USER_CENTER_URL`: user center base URL
//! - `CAPTURE_EMAIL_DOMAIN`: domain of generated usernames
//! - `CAPTURE_RETRY_INITIAL_TIMEOUT_MS`, `CAPTURE_RETRY_MAX_RETRIES`,
//!   `CAPTURE_RETRY_BACKOFF_MULTIPLIER`: retry policy
//! - `CAPTURE_SESSION_EXPIRY_LEEWAY_SECS`: refresh sessions this early
//! - `CAPTURE_POLL_INTERVAL_MS`, `CAPTURE_POLL_MAX_DURATION_MS`: pipeline
//!   polling
//! - `CAPTURE_CACHE_MAX_SIZE_KB`, `CAPTURE_CACHE_MAX_LOADERS`: page image
//!   cache
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./capture.{json,toml}` or `./config.{json,toml}` (working directory)
//! 2. The same names one and two directories up
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use capture_domain::{CaptureError, Config, Result};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `CaptureError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env file"),
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `CAPTURE_CLIENT_ID` and `CAPTURE_CLIENT_SECRET` are required; every
/// other variable overrides a default.
///
/// # Errors
/// Returns `CaptureError::Config` if required variables are missing, a value
/// cannot be parsed, or the configuration is invalid.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.api.client_id = env_var("CAPTURE_CLIENT_ID")?;
    config.api.client_secret = env_var("CAPTURE_CLIENT_SECRET")?;

    if let Some(url) = env_opt("CAPTURE_API_BASE_URL") {
        config.api.base_url = url;
    }
    if let Some(url) = env_opt("CAPTURE_USER_CENTER_URL") {
        config.api.user_center_url = url;
    }
    if let Some(domain) = env_opt("CAPTURE_EMAIL_DOMAIN") {
        config.api.email_domain = domain;
    }

    override_parsed("CAPTURE_RETRY_INITIAL_TIMEOUT_MS", &mut config.retry.initial_timeout_ms)?;
    override_parsed("CAPTURE_RETRY_MAX_RETRIES", &mut config.retry.max_retries)?;
    override_parsed("CAPTURE_RETRY_BACKOFF_MULTIPLIER", &mut config.retry.backoff_multiplier)?;
    override_parsed(
        "CAPTURE_SESSION_EXPIRY_LEEWAY_SECS",
        &mut config.session.expiry_leeway_secs,
    )?;
    override_parsed("CAPTURE_POLL_INTERVAL_MS", &mut config.pipeline.poll_interval_ms)?;
    override_parsed("CAPTURE_POLL_MAX_DURATION_MS", &mut config.pipeline.max_poll_duration_ms)?;
    override_parsed("CAPTURE_CACHE_MAX_SIZE_KB", &mut config.cache.max_size_kb)?;
    override_parsed("CAPTURE_CACHE_MAX_LOADERS", &mut config.cache.max_concurrent_loaders)?;

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `CaptureError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CaptureError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CaptureError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CaptureError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CaptureError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CaptureError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CaptureError::Config(format!("Unsupported config format: {}", extension))),
    }
}

const CONFIG_FILE_NAMES: [&str; 4] = ["capture.json", "capture.toml", "config.json", "config.toml"];

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        CaptureError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Get an optional, non-blank environment variable
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Replace `target` with the parsed value of `key`, if set
fn override_parsed<T>(key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = env_opt(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| CaptureError::Config(format!("Invalid value for {key}: {e}")))?;
    }
    Ok(())
}
