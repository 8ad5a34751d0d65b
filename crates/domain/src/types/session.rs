//! Bearer sessions and user-center credentials

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer session issued by the user center
///
/// Immutable once created. The token never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Session expiring at `expires_at`
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self { access_token: access_token.into(), expires_at }
    }

    /// Build a session from an OAuth `expires_in` value (seconds from now)
    pub fn from_expires_in(access_token: impl Into<String>, expires_in_secs: i64) -> Self {
        let lifetime = chrono::Duration::seconds(expires_in_secs.clamp(0, i64::from(u32::MAX)));
        let expires_at = Utc::now().checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(access_token, expires_at)
    }

    /// Bearer token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Expiry instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the expiry time has been reached
    pub fn has_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Whether the session expires within `leeway` from now
    pub fn expires_within(&self, leeway: Duration) -> bool {
        let deadline = chrono::Duration::from_std(leeway)
            .ok()
            .and_then(|leeway| Utc::now().checked_add_signed(leeway));
        match deadline {
            Some(deadline) => deadline >= self.expires_at,
            None => true,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Username/password pair used to log in to the user center
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub username: String,
    /// Account password
    pub password: String,
}

impl UserCredentials {
    /// Credentials pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_checks() {
        let fresh = Session::from_expires_in("token", 3600);
        assert!(!fresh.has_expired());
        assert!(!fresh.expires_within(Duration::from_secs(60)));
        assert!(fresh.expires_within(Duration::from_secs(7200)));

        let stale = Session::new("token", Utc::now() - chrono::Duration::seconds(1));
        assert!(stale.has_expired());
        assert!(stale.expires_within(Duration::ZERO));
    }

    #[test]
    fn test_negative_expires_in_is_already_expired() {
        let session = Session::from_expires_in("token", -10);
        assert!(session.expires_within(Duration::from_secs(1)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let session = Session::from_expires_in("super-secret-token", 60);
        let credentials = UserCredentials::new("user@example.com", "hunter2");

        assert!(!format!("{session:?}").contains("super-secret-token"));
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("user@example.com"));
        assert!(!rendered.contains("hunter2"));
    }
}
