//! Modular common utilities shared across capture crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error types only
//! - `runtime`: async infrastructure (bounded, single-flight payload cache)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;

// Re-export commonly used types for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{
    CacheError, CacheStats, Payload, ResourceCache, ResourceCacheConfig, ResourceOwner,
};
