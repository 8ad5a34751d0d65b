//! Cache configuration types and builder patterns

use super::error::CacheError;

/// Default byte budget (32 MiB expressed in kilobytes)
pub const DEFAULT_MAX_SIZE_KB: usize = 32 * 1024;

/// Default number of loaders allowed to run at the same time
pub const DEFAULT_MAX_CONCURRENT_LOADERS: usize = 3;

/// Configuration for [`super::ResourceCache`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCacheConfig {
    /// Total size budget for cached payloads, in kilobytes
    pub max_size_kb: usize,

    /// Maximum number of loaders running concurrently
    pub max_concurrent_loaders: usize,
}

impl Default for ResourceCacheConfig {
    fn default() -> Self {
        Self {
            max_size_kb: DEFAULT_MAX_SIZE_KB,
            max_concurrent_loaders: DEFAULT_MAX_CONCURRENT_LOADERS,
        }
    }
}

impl ResourceCacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResourceCacheConfigBuilder {
        ResourceCacheConfigBuilder::default()
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidConfiguration`] if the budget or the
    /// loader limit is zero.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.max_size_kb == 0 {
            return Err(CacheError::InvalidConfiguration {
                message: "max_size_kb must be greater than 0".to_string(),
            });
        }

        if self.max_concurrent_loaders == 0 {
            return Err(CacheError::InvalidConfiguration {
                message: "max_concurrent_loaders must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for ResourceCacheConfig with fluent API
#[derive(Debug, Default)]
pub struct ResourceCacheConfigBuilder {
    config: ResourceCacheConfig,
}

impl ResourceCacheConfigBuilder {
    /// Set the total size budget in kilobytes
    pub fn max_size_kb(mut self, size_kb: usize) -> Self {
        self.config.max_size_kb = size_kb;
        self
    }

    /// Set the maximum number of concurrently running loaders
    pub fn max_concurrent_loaders(mut self, loaders: usize) -> Self {
        self.config.max_concurrent_loaders = loaders;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// See [`ResourceCacheConfig::validate`].
    pub fn build(self) -> Result<ResourceCacheConfig, CacheError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::config.
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ResourceCacheConfig::default();
        assert_eq!(config.max_concurrent_loaders, 3);
        assert_eq!(config.max_size_kb, 32 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = ResourceCacheConfig::builder()
            .max_size_kb(128)
            .max_concurrent_loaders(1)
            .build()
            .unwrap();

        assert_eq!(config.max_size_kb, 128);
        assert_eq!(config.max_concurrent_loaders, 1);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let result = ResourceCacheConfig::builder().max_size_kb(0).build();
        assert!(matches!(result, Err(CacheError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_zero_loaders_rejected() {
        let result = ResourceCacheConfig::builder().max_concurrent_loaders(0).build();
        assert!(matches!(result, Err(CacheError::InvalidConfiguration { .. })));
    }
}
