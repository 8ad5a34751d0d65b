//! Error types used throughout the capture core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for capture operations
///
/// `Clone` so that one outcome can be handed to every waiter of a shared
/// operation (session acquisition, payload loads).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CaptureError {
    /// Connection failed or was reset
    #[error("Network error: {0}")]
    Network(String),

    /// An attempt ran past its timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Session or credentials rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Stored credentials were rejected by the user center
    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    /// Request rejected by the backend (4xx); never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// Server side failure; retried when `status` is 5xx
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The backend finished processing a document with an error state
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential or file storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Broken invariant inside the crate
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CaptureError {
    /// Whether another attempt of the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether stored credentials should be recreated
    pub fn is_invalid_grant(&self) -> bool {
        matches!(self, Self::InvalidGrant(_))
    }

    /// Whether this is the cancellation sentinel
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Stable, low-cardinality label for structured logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Auth(_) => "auth",
            Self::InvalidGrant(_) => "invalid_grant",
            Self::Validation(_) => "validation",
            Self::Server { .. } => "server",
            Self::Processing(_) => "processing",
            Self::Decode(_) => "decode",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
            Self::Cancelled => "cancelled",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, CaptureError>;
