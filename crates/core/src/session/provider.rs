//! Single-flight session provider
//!
//! Hands out bearer sessions to every caller in the process. A cached,
//! unexpired session is returned without I/O. Otherwise exactly one
//! acquisition runs at a time and every concurrent caller awaits its shared
//! outcome.
//!
//! Acquisition reads stored credentials (creating an anonymous user when none
//! exist) and logs in. When the user center rejects stored credentials the
//! provider deletes them and recreates the user once; a second rejection is
//! terminal.

use std::sync::Arc;
use std::time::Duration;

use capture_domain::constants::DEFAULT_SESSION_EXPIRY_LEEWAY_SECS;
use capture_domain::{CaptureError, Result, Session, UserCredentials};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use super::credentials::generate_credentials;
use super::ports::{AuthApi, CredentialsStore};

type SessionFlight = Shared<BoxFuture<'static, Result<Session>>>;

/// Cached session and in-flight marker, always mutated together
#[derive(Default)]
struct SessionState {
    session: Option<Session>,
    in_flight: Option<(u64, SessionFlight)>,
    next_flight: u64,
}

struct Inner {
    auth: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialsStore>,
    email_domain: String,
    expiry_leeway: Duration,
    state: RwLock<SessionState>,
}

impl Inner {
    fn usable(&self, session: &Session) -> bool {
        !session.expires_within(self.expiry_leeway)
    }

    fn cached(&self) -> Option<Session> {
        let state = self.state.read();
        state.session.as_ref().filter(|session| self.usable(session)).cloned()
    }

    fn invalidate(&self) {
        let mut state = self.state.write();
        if state.session.take().is_some() {
            debug!("cached session invalidated");
        }
    }

    /// Store the outcome and retire the flight in one critical section
    fn finish_flight(&self, flight_id: u64, result: &Result<Session>) {
        let mut state = self.state.write();
        if let Ok(session) = result {
            state.session = Some(session.clone());
        }
        if state.in_flight.as_ref().is_some_and(|(id, _)| *id == flight_id) {
            state.in_flight = None;
        }
    }

    #[instrument(name = "session.acquire", skip(self))]
    async fn acquire(&self) -> Result<Session> {
        let mut credentials = match self.credentials.load().await? {
            Some(credentials) => {
                debug!("using stored credentials");
                credentials
            }
            None => {
                info!("no stored credentials, creating anonymous user");
                self.create_user().await?
            }
        };

        let mut recreated = false;
        loop {
            match self.auth.login(&credentials).await {
                Ok(session) if session.has_expired() => {
                    warn!(expires_at = %session.expires_at(), "login returned an expired session");
                    return Err(CaptureError::Auth(format!(
                        "login returned a session that expired at {}",
                        session.expires_at()
                    )));
                }
                Ok(session) => {
                    info!(expires_at = %session.expires_at(), "session acquired");
                    return Ok(session);
                }
                Err(err) if err.is_invalid_grant() && !recreated => {
                    warn!(error = %err, "credentials rejected, recreating anonymous user");
                    self.credentials.delete().await?;
                    credentials = self.create_user().await?;
                    recreated = true;
                }
                Err(err) if err.is_invalid_grant() => {
                    warn!(error = %err, "recreated credentials rejected");
                    return Err(CaptureError::Auth(format!(
                        "login rejected after recreating user: {err}"
                    )));
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn create_user(&self) -> Result<UserCredentials> {
        let credentials = generate_credentials(&self.email_domain);
        self.auth.create_user(&credentials).await?;
        self.credentials.store(&credentials).await?;
        debug!(username = %credentials.username, "anonymous user created");
        Ok(credentials)
    }
}

/// Clears the in-flight marker if the acquisition task is torn down early
struct FlightGuard {
    inner: Arc<Inner>,
    flight_id: u64,
    armed: bool,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if self.armed {
            warn!("session acquisition aborted");
            let mut state = self.inner.state.write();
            if state.in_flight.as_ref().is_some_and(|(id, _)| *id == self.flight_id) {
                state.in_flight = None;
            }
        }
    }
}

/// Process-wide source of bearer sessions
///
/// Cloning is cheap; clones share the cached session and in-flight marker.
#[derive(Clone)]
pub struct SessionProvider {
    inner: Arc<Inner>,
}

impl SessionProvider {
    /// Create a provider
    ///
    /// `email_domain` is used for generated anonymous usernames.
    pub fn new(
        auth: Arc<dyn AuthApi>,
        credentials: Arc<dyn CredentialsStore>,
        email_domain: impl Into<String>,
    ) -> Self {
        Self::with_expiry_leeway(
            auth,
            credentials,
            email_domain,
            Duration::from_secs(DEFAULT_SESSION_EXPIRY_LEEWAY_SECS),
        )
    }

    /// Create a provider treating sessions as expired `leeway` early
    pub fn with_expiry_leeway(
        auth: Arc<dyn AuthApi>,
        credentials: Arc<dyn CredentialsStore>,
        email_domain: impl Into<String>,
        leeway: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                auth,
                credentials,
                email_domain: email_domain.into(),
                expiry_leeway: leeway,
                state: RwLock::new(SessionState::default()),
            }),
        }
    }

    /// Return a valid session, acquiring one if needed
    ///
    /// Must be called within a Tokio runtime: acquisition runs on a spawned
    /// task so that it completes even if every caller stops waiting.
    ///
    /// # Errors
    /// Returns the shared acquisition error, typically
    /// [`CaptureError::Auth`] or [`CaptureError::Network`].
    pub async fn get_session(&self) -> Result<Session> {
        if let Some(session) = self.inner.cached() {
            return Ok(session);
        }

        let flight = {
            let mut state = self.inner.state.write();

            // Another caller may have finished acquiring while we waited
            if let Some(session) = state.session.as_ref().filter(|s| self.inner.usable(s)) {
                return Ok(session.clone());
            }

            match &state.in_flight {
                Some((_, flight)) => {
                    debug!("joining in-flight session acquisition");
                    flight.clone()
                }
                None => {
                    state.next_flight += 1;
                    let flight_id = state.next_flight;
                    let flight = self.start_flight(flight_id);
                    state.in_flight = Some((flight_id, flight.clone()));
                    flight
                }
            }
        };

        let session = flight.await?;
        if session.has_expired() {
            self.inner.invalidate();
            return Err(CaptureError::Auth("acquired session expired before delivery".into()));
        }
        Ok(session)
    }

    fn start_flight(&self, flight_id: u64) -> SessionFlight {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let mut guard = FlightGuard { inner: Arc::clone(&inner), flight_id, armed: true };
            let result = inner.acquire().await;
            inner.finish_flight(flight_id, &result);
            guard.armed = false;
            result
        });

        async move {
            task.await.unwrap_or_else(|err| {
                Err(CaptureError::Internal(format!("session acquisition task failed: {err}")))
            })
        }
        .boxed()
        .shared()
    }

    /// The cached session if it is still usable, without any I/O
    pub fn cached_session(&self) -> Option<Session> {
        self.inner.cached()
    }

    /// Whether an acquisition is currently running
    pub fn is_acquiring(&self) -> bool {
        self.inner.state.read().in_flight.is_some()
    }

    /// Drop the cached session so the next call logs in again
    pub fn invalidate(&self) {
        self.inner.invalidate();
    }

    /// Drop the cached session and delete stored credentials
    ///
    /// # Errors
    /// Returns the credential store error when deletion fails.
    pub async fn sign_out(&self) -> Result<()> {
        self.invalidate();
        self.inner.credentials.delete().await?;
        info!("signed out, credentials deleted");
        Ok(())
    }
}
