//! Upload → poll → extract orchestration

use std::sync::Arc;
use std::time::Duration;

use capture_domain::{
    AnalysisOutcome, AnalysisResult, CaptureError, Document, PipelineConfig, PipelineStatus,
    ProcessingState, RemoteDocument, Result, Session,
};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn, Instrument};

use super::run::PipelineRun;
use crate::dispatch::UiExecutor;
use crate::documents::ports::DocumentApi;
use crate::session::SessionProvider;

/// Drives analysis runs against the document API
#[derive(Clone)]
pub struct AnalysisPipeline {
    sessions: SessionProvider,
    documents: Arc<dyn DocumentApi>,
    executor: Arc<dyn UiExecutor>,
    poll_interval: Duration,
    max_poll_duration: Duration,
}

impl AnalysisPipeline {
    /// Create a pipeline delivering listener calls on `executor`
    pub fn new(
        sessions: SessionProvider,
        documents: Arc<dyn DocumentApi>,
        executor: Arc<dyn UiExecutor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            sessions,
            documents,
            executor,
            poll_interval: config.poll_interval(),
            max_poll_duration: config.max_poll_duration(),
        }
    }

    /// Start analyzing `document` and return immediately
    ///
    /// The run executes on a spawned Tokio task; observe it through
    /// [`PipelineRun::set_listener`] or [`PipelineRun::wait`].
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn analyze(&self, document: Document) -> PipelineRun {
        let run = PipelineRun::new(Arc::clone(&self.executor));
        let span = tracing::info_span!("analysis", run_id = %run.id(), filename = %document.filename);

        let pipeline = self.clone();
        let task_run = run.clone();
        tokio::spawn(
            async move {
                let outcome = match pipeline.drive(&task_run, &document).await {
                    Ok(result) => AnalysisOutcome::Success(result),
                    Err(CaptureError::Cancelled) => AnalysisOutcome::Cancelled,
                    Err(err) => {
                        warn!(error = %err, error_type = err.label(), "analysis failed");
                        AnalysisOutcome::Failure(err)
                    }
                };
                task_run.publish(outcome);
            }
            .instrument(span),
        );

        run
    }

    async fn drive(&self, run: &PipelineRun, document: &Document) -> Result<AnalysisResult> {
        run.advance(PipelineStatus::Uploading)?;
        let session = self.session(run).await?;
        let uploaded = self.step(run, self.documents.create_document(&session, document).await)?;
        info!(document_id = %uploaded.id, bytes = document.len(), "document uploaded");
        run.set_remote_document(uploaded.clone());

        run.advance(PipelineStatus::Polling)?;
        let processed = self.poll(run, uploaded).await?;

        run.advance(PipelineStatus::Extracting)?;
        let session = self.session(run).await?;
        let extractions =
            self.step(run, self.documents.get_extractions(&session, &processed.id).await)?;
        info!(
            document_id = %processed.id,
            extractions = extractions.specific_extractions.len(),
            "extractions received"
        );

        Ok(AnalysisResult { remote_document: processed, extractions })
    }

    #[instrument(skip(self, run, document), fields(document_id = %document.id))]
    async fn poll(&self, run: &PipelineRun, document: RemoteDocument) -> Result<RemoteDocument> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            let session = self.session(run).await?;
            let current = self.step(run, self.documents.get_document(&session, &document.id).await)?;
            attempts += 1;
            run.set_remote_document(current.clone());

            match current.processing_state {
                ProcessingState::Completed => {
                    debug!(attempts, "document processed");
                    return Ok(current);
                }
                ProcessingState::Error => {
                    return Err(CaptureError::Processing(format!(
                        "document {} could not be processed",
                        current.id
                    )));
                }
                ProcessingState::Pending | ProcessingState::Unknown => {}
            }

            if started.elapsed() + self.poll_interval > self.max_poll_duration {
                return Err(CaptureError::Timeout(format!(
                    "document {} still {} after {} polls",
                    current.id, current.processing_state, attempts
                )));
            }

            debug!(attempts, state = %current.processing_state, "document not ready, waiting");
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = run.cancelled() => return Err(CaptureError::Cancelled),
            }
        }
    }

    async fn session(&self, run: &PipelineRun) -> Result<Session> {
        run.checkpoint(Ok(()))?;
        let session = self.sessions.get_session().await;
        run.checkpoint(session)
    }

    /// Apply the cancellation checkpoint to a call result
    ///
    /// A rejected token drops the cached session so the next run logs in
    /// again.
    fn step<T>(&self, run: &PipelineRun, result: Result<T>) -> Result<T> {
        if let Err(CaptureError::Auth(message)) = &result {
            warn!(%message, "bearer token rejected, invalidating session");
            self.sessions.invalidate();
        }
        run.checkpoint(result)
    }
}
