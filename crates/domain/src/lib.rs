//! # Capture Domain
//!
//! Business domain types and models for the document capture core.
//!
//! This crate contains:
//! - Session and credential types
//! - Remote document, extraction and payment models (serde wire shapes)
//! - Retry policy arithmetic
//! - Configuration structures and the shared error type
//!
//! ## Architecture
//! - No dependencies on other capture crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod retry;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use retry::{RetryPolicy, RetryPolicyConfig};
pub use types::*;

#[doc(hidden)]
pub use serde as __serde;
