//! Application context - dependency injection container

use std::sync::Arc;

use capture_common::cache::{ResourceCache, ResourceCacheConfig};
use capture_core::{
    AnalysisPipeline, CaptureNetworkService, CredentialsStore, DedicatedThreadExecutor,
    DocumentApi, SessionProvider, UiExecutor,
};
use capture_domain::{CaptureError, Config, Result, RetryPolicy};
use capture_infra::{ApiClient, KeychainCredentialsStore, UserCenterClient};
use tracing::info;

/// Name of the thread standing in for the UI context
pub const UI_THREAD_NAME: &str = "capture-ui";

/// Application context - holds all services and dependencies
pub struct AppContext {
    /// Validated configuration the context was built from
    pub config: Config,
    /// Callback-style facade over every backend operation
    pub network: CaptureNetworkService,
    /// Direct document API access for commands that read extractions
    pub documents: Arc<dyn DocumentApi>,
    executor: Arc<DedicatedThreadExecutor>,
}

impl AppContext {
    /// Build the context with credentials kept in the system keyring
    ///
    /// # Errors
    /// Returns [`CaptureError::Config`] for invalid configuration values.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_credentials_store(config, Arc::new(KeychainCredentialsStore::default()))
    }

    /// Build the context around a specific credentials store
    ///
    /// # Errors
    /// Returns [`CaptureError::Config`] for invalid configuration values and
    /// [`CaptureError::Internal`] if the UI thread cannot be started.
    pub fn with_credentials_store(
        config: Config,
        credentials: Arc<dyn CredentialsStore>,
    ) -> Result<Self> {
        config.validate()?;
        let policy = RetryPolicy::new(config.retry)?;

        let auth = Arc::new(UserCenterClient::new(&config.api, policy)?);
        let documents: Arc<dyn DocumentApi> =
            Arc::new(ApiClient::new(&config.api.base_url, policy)?);

        let executor = Arc::new(DedicatedThreadExecutor::spawn(UI_THREAD_NAME).map_err(|e| {
            CaptureError::Internal(format!("failed to start {UI_THREAD_NAME} thread: {e}"))
        })?);
        let ui: Arc<dyn UiExecutor> = executor.clone();

        let sessions = SessionProvider::with_expiry_leeway(
            auth,
            credentials,
            config.api.email_domain.clone(),
            config.session.expiry_leeway(),
        );
        let pipeline = AnalysisPipeline::new(
            sessions.clone(),
            Arc::clone(&documents),
            Arc::clone(&ui),
            config.pipeline,
        );
        let images = ResourceCache::new(
            ResourceCacheConfig::builder()
                .max_size_kb(config.cache.max_size_kb)
                .max_concurrent_loaders(config.cache.max_concurrent_loaders)
                .build()
                .map_err(|e| CaptureError::Config(format!("invalid cache settings: {e}")))?,
        )
        .map_err(|e| CaptureError::Config(format!("invalid cache settings: {e}")))?;

        let network =
            CaptureNetworkService::new(sessions, Arc::clone(&documents), pipeline, images, ui);

        info!(
            base_url = %config.api.base_url,
            user_center_url = %config.api.user_center_url,
            "application context initialised"
        );
        Ok(Self { config, network, documents, executor })
    }

    /// Shared session provider
    pub fn sessions(&self) -> &SessionProvider {
        self.network.sessions()
    }

    /// Run pending UI deliveries and stop the UI thread
    pub fn shutdown(&self) {
        let stats = self.network.images().stats();
        info!(
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            cached_kb = stats.size_kb,
            "shutdown called on AppContext"
        );
        self.executor.shutdown();
    }
}
