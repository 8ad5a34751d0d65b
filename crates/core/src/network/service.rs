//! Capture network service
//!
//! Entry point for UI callers. Every operation runs in the background,
//! returns a [`TaskHandle`] right away and reports exactly once through a
//! [`NetworkCallback`] on the UI executor.

use std::future::Future;
use std::sync::Arc;

use capture_common::cache::{CacheError, Payload, ResourceCache, ResourceOwner};
use capture_domain::{
    AnalysisOutcome, AnalysisResult, CaptureError, Document, ErrorEvent, ExtractionFeedback,
    PageImageSize, Payment, RemoteDocument, ResolvePaymentInput, Result, Session,
};
use tracing::{debug, info_span, warn, Instrument};

use super::handle::{NetworkCallback, TaskHandle};
use crate::analysis::{AnalysisPipeline, PipelineRun};
use crate::dispatch::UiExecutor;
use crate::documents::ports::DocumentApi;
use crate::session::SessionProvider;

/// Cache key of a rendered page image
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    /// Document the page belongs to
    pub document_id: String,
    /// One-based page number
    pub page: u32,
    /// Requested rendition size
    pub size: PageImageSize,
}

/// Background network operations for the capture UI
#[derive(Clone)]
pub struct CaptureNetworkService {
    sessions: SessionProvider,
    documents: Arc<dyn DocumentApi>,
    pipeline: AnalysisPipeline,
    images: ResourceCache<PageKey>,
    executor: Arc<dyn UiExecutor>,
}

impl CaptureNetworkService {
    /// Create the service from its collaborators
    pub fn new(
        sessions: SessionProvider,
        documents: Arc<dyn DocumentApi>,
        pipeline: AnalysisPipeline,
        images: ResourceCache<PageKey>,
        executor: Arc<dyn UiExecutor>,
    ) -> Self {
        Self { sessions, documents, pipeline, images, executor }
    }

    /// Shared session provider
    pub fn sessions(&self) -> &SessionProvider {
        &self.sessions
    }

    /// Pipeline used by `analyze`
    pub fn pipeline(&self) -> &AnalysisPipeline {
        &self.pipeline
    }

    /// Page image cache
    pub fn images(&self) -> &ResourceCache<PageKey> {
        &self.images
    }

    /// Upload a document without waiting for analysis
    pub fn upload(
        &self,
        document: Document,
        callback: impl NetworkCallback<RemoteDocument> + 'static,
    ) -> TaskHandle {
        let documents = Arc::clone(&self.documents);
        let call = with_session(self.sessions.clone(), move |session| async move {
            documents.create_document(&session, &document).await
        });
        self.spawn_call("upload", Arc::new(callback), call)
    }

    /// Delete an uploaded document
    pub fn delete(
        &self,
        document_id: impl Into<String>,
        callback: impl NetworkCallback<()> + 'static,
    ) -> TaskHandle {
        let documents = Arc::clone(&self.documents);
        let document_id = document_id.into();
        let call = with_session(self.sessions.clone(), move |session| async move {
            documents.delete_document(&session, &document_id).await
        });
        self.spawn_call("delete", Arc::new(callback), call)
    }

    /// Run the full analysis pipeline for a document
    pub fn analyze(
        &self,
        document: Document,
        callback: impl NetworkCallback<AnalysisResult> + 'static,
    ) -> TaskHandle {
        let run = self.pipeline.analyze(document);
        self.attach_run(run, Arc::new(callback))
    }

    fn attach_run(
        &self,
        run: PipelineRun,
        callback: Arc<dyn NetworkCallback<AnalysisResult>>,
    ) -> TaskHandle {
        let executor = Arc::clone(&self.executor);
        let cancel_run = run.clone();
        let cancel_callback = Arc::clone(&callback);
        let handle = TaskHandle::new(Box::new(move || {
            cancel_run.cancel();
            executor.execute(Box::new(move || cancel_callback.on_cancelled()));
        }));

        let listener_handle = handle.clone();
        run.set_listener(move |outcome: AnalysisOutcome| {
            if !listener_handle.claim_completion() {
                return;
            }
            match outcome {
                AnalysisOutcome::Success(result) => callback.on_success(result),
                AnalysisOutcome::Failure(error) => callback.on_failure(error),
                AnalysisOutcome::Cancelled => callback.on_cancelled(),
            }
        });

        handle
    }

    /// Send corrected extractions for a document
    pub fn send_feedback(
        &self,
        document_id: impl Into<String>,
        feedback: ExtractionFeedback,
        callback: impl NetworkCallback<()> + 'static,
    ) -> TaskHandle {
        let documents = Arc::clone(&self.documents);
        let document_id = document_id.into();
        let call = with_session(self.sessions.clone(), move |session| async move {
            documents.send_feedback(&session, &document_id, &feedback).await
        });
        self.spawn_call("send_feedback", Arc::new(callback), call)
    }

    /// Fetch a rendered page image through the payload cache
    pub fn page_image(
        &self,
        key: PageKey,
        owner: Arc<dyn ResourceOwner>,
        callback: impl NetworkCallback<Payload> + 'static,
    ) -> TaskHandle {
        let service = self.clone();
        let call = async move { service.load_page_image(key, owner).await };
        self.spawn_call("page_image", Arc::new(callback), call)
    }

    /// Load a page image, sharing the download with concurrent requests
    ///
    /// # Errors
    /// Returns the error of the download that populated the request.
    pub async fn load_page_image(
        &self,
        key: PageKey,
        owner: Arc<dyn ResourceOwner>,
    ) -> Result<Payload> {
        let sessions = self.sessions.clone();
        let documents = Arc::clone(&self.documents);
        let target = key.clone();

        self.images
            .get(key, owner, move || {
                with_session(sessions, move |session| async move {
                    documents.page_image(&session, &target.document_id, target.page, target.size).await
                })
            })
            .await
            .map_err(cache_error)
    }

    /// Record the payment for a payment request
    pub fn resolve_payment(
        &self,
        request_id: impl Into<String>,
        input: ResolvePaymentInput,
        callback: impl NetworkCallback<Payment> + 'static,
    ) -> TaskHandle {
        let documents = Arc::clone(&self.documents);
        let request_id = request_id.into();
        let call = with_session(self.sessions.clone(), move |session| async move {
            documents.resolve_payment(&session, &request_id, &input).await
        });
        self.spawn_call("resolve_payment", Arc::new(callback), call)
    }

    /// Fetch the payment recorded for a payment request
    pub fn payment(
        &self,
        request_id: impl Into<String>,
        callback: impl NetworkCallback<Payment> + 'static,
    ) -> TaskHandle {
        let documents = Arc::clone(&self.documents);
        let request_id = request_id.into();
        let call = with_session(self.sessions.clone(), move |session| async move {
            documents.payment(&session, &request_id).await
        });
        self.spawn_call("payment", Arc::new(callback), call)
    }

    /// Report a client-side error event
    pub fn log_error_event(
        &self,
        event: ErrorEvent,
        callback: impl NetworkCallback<()> + 'static,
    ) -> TaskHandle {
        let documents = Arc::clone(&self.documents);
        let call = with_session(self.sessions.clone(), move |session| async move {
            documents.log_error_event(&session, &event).await
        });
        self.spawn_call("log_error_event", Arc::new(callback), call)
    }

    fn spawn_call<T, Fut>(
        &self,
        operation: &'static str,
        callback: Arc<dyn NetworkCallback<T>>,
        call: Fut,
    ) -> TaskHandle
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let cancel_executor = Arc::clone(&self.executor);
        let cancel_callback = Arc::clone(&callback);
        let handle = TaskHandle::new(Box::new(move || {
            cancel_executor.execute(Box::new(move || cancel_callback.on_cancelled()));
        }));

        let executor = Arc::clone(&self.executor);
        let task_handle = handle.clone();
        tokio::spawn(
            async move {
                let result = call.await;
                if !task_handle.claim_completion() {
                    debug!("call finished after cancellation, result discarded");
                    return;
                }
                match &result {
                    Ok(_) => debug!("call succeeded"),
                    Err(err) => warn!(error = %err, error_type = err.label(), "call failed"),
                }
                executor.execute(Box::new(move || match result {
                    Ok(value) => callback.on_success(value),
                    Err(CaptureError::Cancelled) => callback.on_cancelled(),
                    Err(error) => callback.on_failure(error),
                }));
            }
            .instrument(info_span!("network_call", operation)),
        );

        handle
    }
}

/// Run `call` with a fresh session, dropping the session if it was rejected
async fn with_session<T, F, Fut>(sessions: SessionProvider, call: F) -> Result<T>
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let session = sessions.get_session().await?;
    let result = call(session).await;
    if matches!(result, Err(CaptureError::Auth(_))) {
        sessions.invalidate();
    }
    result
}

fn cache_error(error: CacheError) -> CaptureError {
    match error {
        CacheError::LoadFailed(source) => source
            .downcast_ref::<CaptureError>()
            .cloned()
            .unwrap_or_else(|| CaptureError::Internal(source.to_string())),
        other => CaptureError::Internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_unwraps_capture_error() {
        let error = cache_error(CacheError::load_failed(CaptureError::Validation("bad".into())));
        assert_eq!(error, CaptureError::Validation("bad".into()));

        let error = cache_error(CacheError::Closed);
        assert!(matches!(error, CaptureError::Internal(_)));
    }
}
