//! Port interfaces for the document API
//!
//! Every call takes the bearer [`Session`] explicitly; implementations
//! attach it as `Authorization: BEARER <token>` and apply their own retry
//! policy per request.

use async_trait::async_trait;
use capture_domain::{
    Document, ErrorEvent, ExtractionFeedback, ExtractionsContainer, PageImageSize, Payment,
    RemoteDocument, ResolvePaymentInput, Result, Session,
};

/// Trait for the authenticated document endpoints
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Upload a document; the returned document carries the new id
    async fn create_document(&self, session: &Session, document: &Document)
        -> Result<RemoteDocument>;

    /// Fetch a document including its processing state
    async fn get_document(&self, session: &Session, document_id: &str) -> Result<RemoteDocument>;

    /// Fetch all extractions of a processed document
    async fn get_extractions(
        &self,
        session: &Session,
        document_id: &str,
    ) -> Result<ExtractionsContainer>;

    /// Send corrected extractions
    async fn send_feedback(
        &self,
        session: &Session,
        document_id: &str,
        feedback: &ExtractionFeedback,
    ) -> Result<()>;

    /// Delete a document
    async fn delete_document(&self, session: &Session, document_id: &str) -> Result<()>;

    /// Fetch a rendered page as JPEG bytes
    async fn page_image(
        &self,
        session: &Session,
        document_id: &str,
        page: u32,
        size: PageImageSize,
    ) -> Result<Vec<u8>>;

    /// Record the payment for a payment request
    async fn resolve_payment(
        &self,
        session: &Session,
        request_id: &str,
        input: &ResolvePaymentInput,
    ) -> Result<Payment>;

    /// Fetch the payment recorded for a payment request
    async fn payment(&self, session: &Session, request_id: &str) -> Result<Payment>;

    /// Report a client-side error event
    async fn log_error_event(&self, session: &Session, event: &ErrorEvent) -> Result<()>;
}
