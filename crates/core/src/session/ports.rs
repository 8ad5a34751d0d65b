//! Port interfaces for session acquisition
//!
//! These traits define the boundaries between session logic and the
//! user-center client and credential storage implementations.

use async_trait::async_trait;
use capture_domain::{Result, Session, UserCredentials};

/// Trait for persisting the anonymous user's credentials
#[async_trait]
pub trait CredentialsStore: Send + Sync {
    /// Load stored credentials, `None` when nothing is stored
    async fn load(&self) -> Result<Option<UserCredentials>>;

    /// Persist credentials, replacing any previous value
    async fn store(&self, credentials: &UserCredentials) -> Result<()>;

    /// Remove stored credentials; succeeds when nothing is stored
    async fn delete(&self) -> Result<()>;
}

/// Trait for the user-center endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Register a new anonymous user
    async fn create_user(&self, credentials: &UserCredentials) -> Result<()>;

    /// Exchange credentials for a bearer session
    ///
    /// Rejected credentials must surface as
    /// [`capture_domain::CaptureError::InvalidGrant`].
    async fn login(&self, credentials: &UserCredentials) -> Result<Session>;
}
