//! Mock port implementations for testing
//!
//! Each mock counts its calls and can be scripted with canned results.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use capture_core::{AuthApi, CredentialsStore, DocumentApi};
use capture_domain::{
    CaptureError, Document, ErrorEvent, Extraction, ExtractionFeedback, ExtractionsContainer,
    PageImageSize, Payment, ProcessingState, RemoteDocument, ResolvePaymentInput,
    Result as DomainResult, Session, UserCredentials,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// In-memory mock for `CredentialsStore`.
#[derive(Default)]
pub struct MockCredentialsStore {
    stored: Mutex<Option<UserCredentials>>,
    pub stores: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MockCredentialsStore {
    /// Create a store already holding credentials.
    pub fn with_credentials(credentials: UserCredentials) -> Self {
        Self { stored: Mutex::new(Some(credentials)), ..Default::default() }
    }

    pub fn current(&self) -> Option<UserCredentials> {
        self.stored.lock().clone()
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialsStore for MockCredentialsStore {
    async fn load(&self) -> DomainResult<Option<UserCredentials>> {
        Ok(self.stored.lock().clone())
    }

    async fn store(&self, credentials: &UserCredentials) -> DomainResult<()> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        *self.stored.lock() = Some(credentials.clone());
        Ok(())
    }

    async fn delete(&self) -> DomainResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.stored.lock().take();
        Ok(())
    }
}

/// Scriptable mock for `AuthApi`.
///
/// Login results are taken from the script in order; once the script is
/// exhausted every login succeeds with a fresh token.
pub struct MockAuthApi {
    login_script: Mutex<VecDeque<DomainResult<Session>>>,
    login_delay: Duration,
    session_ttl_secs: i64,
    pub logins: AtomicUsize,
    pub creates: AtomicUsize,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self {
            login_script: Mutex::new(VecDeque::new()),
            login_delay: Duration::ZERO,
            session_ttl_secs: 3600,
            logins: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
        }
    }
}

impl MockAuthApi {
    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    pub fn with_session_ttl(mut self, secs: i64) -> Self {
        self.session_ttl_secs = secs;
        self
    }

    pub fn script_logins(self, results: Vec<DomainResult<Session>>) -> Self {
        *self.login_script.lock() = results.into();
        self
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn create_user(&self, _credentials: &UserCredentials) -> DomainResult<()> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn login(&self, _credentials: &UserCredentials) -> DomainResult<Session> {
        let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }
        let scripted = self.login_script.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(Session::from_expires_in(format!("token-{n}"), self.session_ttl_secs)))
    }
}

pub fn invalid_grant() -> DomainResult<Session> {
    Err(CaptureError::InvalidGrant("invalid_grant".into()))
}

/// Scriptable mock for `DocumentApi`.
///
/// `get_document` walks through the scripted processing states; the last
/// state repeats once the script is exhausted.
pub struct MockDocumentApi {
    states: Mutex<VecDeque<ProcessingState>>,
    upload_error: Mutex<Option<CaptureError>>,
    upload_gate: Option<Arc<Notify>>,
    extractions: ExtractionsContainer,
    page_delay: Duration,
    pub uploads: AtomicUsize,
    pub polls: AtomicUsize,
    pub extraction_fetches: AtomicUsize,
    pub page_fetches: AtomicUsize,
    pub feedbacks: Mutex<Vec<(String, ExtractionFeedback)>>,
    pub deletes: Mutex<Vec<String>>,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl Default for MockDocumentApi {
    fn default() -> Self {
        Self {
            states: Mutex::new(VecDeque::from([ProcessingState::Completed])),
            upload_error: Mutex::new(None),
            upload_gate: None,
            extractions: amount_to_pay("12.99:EUR"),
            page_delay: Duration::ZERO,
            uploads: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            extraction_fetches: AtomicUsize::new(0),
            page_fetches: AtomicUsize::new(0),
            feedbacks: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }
}

impl MockDocumentApi {
    pub fn with_states(self, states: Vec<ProcessingState>) -> Self {
        *self.states.lock() = states.into();
        self
    }

    pub fn failing_upload(self, error: CaptureError) -> Self {
        *self.upload_error.lock() = Some(error);
        self
    }

    /// Block uploads until the returned gate is notified.
    pub fn gated_upload(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.upload_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn record_token(&self, session: &Session) {
        self.tokens_seen.lock().push(session.access_token().to_string());
    }
}

pub fn amount_to_pay(value: &str) -> ExtractionsContainer {
    let mut container = ExtractionsContainer::default();
    container
        .specific_extractions
        .insert("amountToPay".to_string(), Extraction::new(value, "amount"));
    container
}

#[async_trait]
impl DocumentApi for MockDocumentApi {
    async fn create_document(
        &self,
        session: &Session,
        document: &Document,
    ) -> DomainResult<RemoteDocument> {
        self.record_token(session);
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }
        if let Some(error) = self.upload_error.lock().clone() {
            return Err(error);
        }
        let mut remote = RemoteDocument::pending("doc-1");
        remote.name = Some(document.filename.clone());
        Ok(remote)
    }

    async fn get_document(&self, session: &Session, document_id: &str) -> DomainResult<RemoteDocument> {
        self.record_token(session);
        self.polls.fetch_add(1, Ordering::SeqCst);
        let state = {
            let mut states = self.states.lock();
            if states.len() > 1 {
                states.pop_front().unwrap_or_default()
            } else {
                states.front().copied().unwrap_or_default()
            }
        };
        let mut remote = RemoteDocument::pending(document_id);
        remote.processing_state = state;
        Ok(remote)
    }

    async fn get_extractions(
        &self,
        session: &Session,
        _document_id: &str,
    ) -> DomainResult<ExtractionsContainer> {
        self.record_token(session);
        self.extraction_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.extractions.clone())
    }

    async fn send_feedback(
        &self,
        session: &Session,
        document_id: &str,
        feedback: &ExtractionFeedback,
    ) -> DomainResult<()> {
        self.record_token(session);
        self.feedbacks.lock().push((document_id.to_string(), feedback.clone()));
        Ok(())
    }

    async fn delete_document(&self, session: &Session, document_id: &str) -> DomainResult<()> {
        self.record_token(session);
        self.deletes.lock().push(document_id.to_string());
        Ok(())
    }

    async fn page_image(
        &self,
        session: &Session,
        document_id: &str,
        page: u32,
        size: PageImageSize,
    ) -> DomainResult<Vec<u8>> {
        self.record_token(session);
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
        if document_id == "missing" {
            return Err(CaptureError::Validation(format!("no page {page}")));
        }
        Ok(format!("{document_id}/{page}/{size}").into_bytes())
    }

    async fn resolve_payment(
        &self,
        session: &Session,
        _request_id: &str,
        input: &ResolvePaymentInput,
    ) -> DomainResult<Payment> {
        self.record_token(session);
        Ok(Payment {
            paid_at: "2024-05-01T10:00:00Z".into(),
            recipient: input.recipient.clone(),
            iban: input.iban.clone(),
            bic: input.bic.clone(),
            amount: input.amount.clone(),
            purpose: input.purpose.clone(),
        })
    }

    async fn payment(&self, session: &Session, request_id: &str) -> DomainResult<Payment> {
        self.record_token(session);
        Err(CaptureError::Validation(format!("payment request {request_id} not resolved")))
    }

    async fn log_error_event(&self, session: &Session, _event: &ErrorEvent) -> DomainResult<()> {
        self.record_token(session);
        Ok(())
    }
}
