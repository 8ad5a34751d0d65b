//! Process-local credentials store

use async_trait::async_trait;
use capture_core::CredentialsStore;
use capture_domain::{Result, UserCredentials};
use parking_lot::Mutex;

/// [`CredentialsStore`] that forgets everything when the process exits
///
/// Used when no keyring is available and in tests.
#[derive(Debug, Default)]
pub struct InMemoryCredentialsStore {
    credentials: Mutex<Option<UserCredentials>>,
}

impl InMemoryCredentialsStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already holding `credentials`
    pub fn with_credentials(credentials: UserCredentials) -> Self {
        Self { credentials: Mutex::new(Some(credentials)) }
    }
}

#[async_trait]
impl CredentialsStore for InMemoryCredentialsStore {
    async fn load(&self) -> Result<Option<UserCredentials>> {
        Ok(self.credentials.lock().clone())
    }

    async fn store(&self, credentials: &UserCredentials) -> Result<()> {
        *self.credentials.lock() = Some(credentials.clone());
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        self.credentials.lock().take();
        Ok(())
    }
}
