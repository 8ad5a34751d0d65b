//! API-specific error types
//!
//! Classifies HTTP statuses returned by the document API and the user
//! center, then maps them onto [`CaptureError`].

use capture_domain::CaptureError;
use reqwest::StatusCode;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403) - retry after a new session
    Authentication,
    /// Stored credentials rejected on login - recreate the user
    InvalidGrant,
    /// Rate limiting errors (429) - non-retryable
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Response body did not match the expected shape
    Decode,
}

/// API operation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Bearer token rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Password login rejected
    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    /// Too many requests
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// 5xx response
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// 4xx response other than auth and rate limiting
    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    /// Connection level failure
    #[error("Network error: {0}")]
    Network(String),

    /// Unexpected response shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::InvalidGrant(_) => ApiErrorCategory::InvalidGrant,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::Network(_) => ApiErrorCategory::Network,
            Self::Decode(_) => ApiErrorCategory::Decode,
        }
    }

    /// Check if this error should be retried by the transport
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }

    /// Classify a non-success status of a document API call
    pub fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {}", body.trim())
        };
        let code = status.as_u16();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Auth(message)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimit(message)
        } else if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::Client { status: code, message: format!("too large: {message}") }
        } else if status.is_server_error() {
            Self::Server { status: code, message }
        } else if status.is_client_error() {
            Self::Client { status: code, message }
        } else {
            Self::Decode(message)
        }
    }

    /// Classify a non-success status of a password login
    ///
    /// A 401, or a 400 whose body names `invalid_grant`, means the stored
    /// credentials are no longer accepted.
    pub fn from_login_status(status: StatusCode, url: &str, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED
            || (status == StatusCode::BAD_REQUEST && is_invalid_grant_body(body))
        {
            return Self::InvalidGrant(format!("{url} rejected the stored credentials"));
        }
        Self::from_status(status, url, body)
    }
}

fn is_invalid_grant_body(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .map_or_else(|| body.contains("invalid_grant"), |error| error == "invalid_grant")
}

impl From<ApiError> for CaptureError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(message) => CaptureError::Auth(message),
            ApiError::InvalidGrant(message) => CaptureError::InvalidGrant(message),
            ApiError::RateLimit(message) => CaptureError::Validation(message),
            ApiError::Server { status, message } => CaptureError::Server { status, message },
            ApiError::Client { message, .. } => CaptureError::Validation(message),
            ApiError::Network(message) => CaptureError::Network(message),
            ApiError::Decode(message) => CaptureError::Decode(message),
        }
    }
}
