//! Cache error types

use std::sync::Arc;

use thiserror::Error;

/// Errors surfaced by [`super::ResourceCache`]
///
/// The type is `Clone` because a single loader outcome is shared with every
/// caller that joined it.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The loader for a key failed; the entry was not populated
    #[error("resource load failed: {0}")]
    LoadFailed(Arc<dyn std::error::Error + Send + Sync>),

    /// The loader slot pool was shut down while waiting for a permit
    #[error("resource cache is closed")]
    Closed,

    /// The cache configuration is invalid
    #[error("invalid cache configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl CacheError {
    /// Wrap a loader error
    pub fn load_failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::LoadFailed(Arc::new(error))
    }
}
