//! Application constants
//!
//! Centralized location for domain-level defaults used throughout the
//! capture core.

// Retry policy defaults
/// Timeout of the first attempt
pub const DEFAULT_INITIAL_TIMEOUT_MS: i64 = 30_000;
/// Retries after the first attempt
pub const DEFAULT_MAX_RETRIES: i64 = 3;
/// Per-attempt timeout growth factor
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.0;

// Session defaults
/// Sessions this close to expiry are refreshed
pub const DEFAULT_SESSION_EXPIRY_LEEWAY_SECS: u64 = 30;

// Pipeline defaults
/// Pause between processing state polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
/// Polling gives up with a timeout after this long
pub const DEFAULT_MAX_POLL_DURATION_MS: u64 = 300_000;

// Payload cache defaults
/// Payload cache byte budget
pub const DEFAULT_CACHE_MAX_SIZE_KB: usize = 32 * 1024;
/// Payload loaders allowed to run at once
pub const DEFAULT_CACHE_MAX_CONCURRENT_LOADERS: usize = 3;

// Backend endpoints
/// Document API
pub const DEFAULT_API_BASE_URL: &str = "https://api.gini.net/";
/// User center (login and user creation)
pub const DEFAULT_USER_CENTER_URL: &str = "https://user.gini.net/";

// Generated anonymous accounts
/// Length of generated anonymous passwords
pub const GENERATED_PASSWORD_LENGTH: usize = 32;
