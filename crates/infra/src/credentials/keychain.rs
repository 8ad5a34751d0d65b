//! Credentials persisted in the system keyring

use async_trait::async_trait;
use capture_core::CredentialsStore;
use capture_domain::{CaptureError, Result, UserCredentials};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::InfraError;

/// Default keyring service name
pub const DEFAULT_SERVICE_NAME: &str = "net.capture.core";
const ACCOUNT_NAME: &str = "user_credentials";

#[derive(Serialize, Deserialize)]
struct StoredCredentials {
    username: String,
    password: String,
}

/// [`CredentialsStore`] backed by the platform keyring
///
/// Both values are kept in one entry as JSON. Keyring calls block, so they
/// run on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct KeychainCredentialsStore {
    service: String,
}

impl Default for KeychainCredentialsStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_NAME)
    }
}

impl KeychainCredentialsStore {
    /// Store under the given keyring service name
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    fn entry(service: &str) -> Result<Entry> {
        Entry::new(service, ACCOUNT_NAME).map_err(|e| InfraError::from(e).into())
    }

    async fn blocking<T, F>(&self, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T> + Send + 'static,
    {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || operation(Self::entry(&service)?))
            .await
            .map_err(|e| CaptureError::Internal(format!("keyring task failed: {e}")))?
    }
}

#[async_trait]
impl CredentialsStore for KeychainCredentialsStore {
    async fn load(&self) -> Result<Option<UserCredentials>> {
        self.blocking(|entry| match entry.get_password() {
            Ok(secret) => {
                let stored: StoredCredentials = serde_json::from_str(&secret).map_err(|e| {
                    CaptureError::Storage(format!("stored credentials are corrupt: {e}"))
                })?;
                Ok(Some(UserCredentials::new(stored.username, stored.password)))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        })
        .await
    }

    async fn store(&self, credentials: &UserCredentials) -> Result<()> {
        let secret = serde_json::to_string(&StoredCredentials {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })?;
        self.blocking(move |entry| {
            entry.set_password(&secret).map_err(|e| InfraError::from(e).into())
        })
        .await?;
        debug!(service = %self.service, "credentials stored in keyring");
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        self.blocking(|entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(InfraError::from(e).into()),
        })
        .await?;
        debug!(service = %self.service, "credentials removed from keyring");
        Ok(())
    }
}
