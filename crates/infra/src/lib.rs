//! # Capture Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP transport applying the retry policy
//! - Document API and user center clients
//! - Keyring and in-memory credentials stores
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `capture-core`
//! - Depends on `capture-domain` and `capture-core`
//! - Contains all "impure" code (network, keyring, environment)

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{ApiClient, ApiError, ApiErrorCategory, UserCenterClient};
pub use credentials::{InMemoryCredentialsStore, KeychainCredentialsStore};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, LogFormat};
