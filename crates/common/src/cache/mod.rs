//! Bounded payload cache with single-flight loaders
//!
//! This module provides [`ResourceCache`], an in-memory LRU cache for decoded
//! document byte payloads (page images, previews, PDFs). It combines three
//! concerns that always travel together when rendering documents:
//!
//! - **Byte budget**: entries are sized in kilobytes and the least recently
//!   used entries are evicted once the configured budget is exceeded
//! - **Single-flight loading**: concurrent `get` calls for the same key share
//!   one loader and observe the same outcome
//! - **Bounded parallelism**: at most `max_concurrent_loaders` loaders run at
//!   any time; additional loaders wait for a free slot
//!
//! Evicted or invalidated entries notify their [`ResourceOwner`] through
//! [`ResourceOwner::unload`] exactly once, so owners can drop their own
//! references to the byte buffer.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use capture_common::cache::{ResourceCache, ResourceCacheConfig, ResourceOwner};
//!
//! struct Page;
//!
//! impl ResourceOwner for Page {
//!     fn unload(&self) {}
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache: ResourceCache<String> =
//!         ResourceCache::new(ResourceCacheConfig::default()).unwrap();
//!
//!     let payload = cache
//!         .get("doc-1/page-1".to_string(), Arc::new(Page), || async {
//!             Ok::<_, std::io::Error>(vec![0xFF, 0xD8, 0xFF])
//!         })
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(payload.len(), 3);
//! }
//! ```

mod config;
mod error;
mod resource;
mod stats;

pub use config::{ResourceCacheConfig, ResourceCacheConfigBuilder};
pub use error::CacheError;
pub use resource::{Payload, ResourceCache, ResourceOwner};
pub use stats::CacheStats;
