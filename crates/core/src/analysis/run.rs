//! Per-analysis run state shared between the pipeline task and callers

use std::fmt;
use std::sync::Arc;

use capture_domain::{AnalysisOutcome, CaptureError, PipelineStatus, RemoteDocument, Result};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dispatch::UiExecutor;

/// Receives the terminal outcome of a run on the UI executor
///
/// Only `Success` and `Failure` are delivered; cancelled runs stay silent.
pub trait AnalysisListener: Send + Sync {
    /// Called with the terminal outcome
    fn on_outcome(&self, outcome: AnalysisOutcome);
}

impl<F> AnalysisListener for F
where
    F: Fn(AnalysisOutcome) + Send + Sync,
{
    fn on_outcome(&self, outcome: AnalysisOutcome) {
        self(outcome);
    }
}

struct RunState {
    cancelled: bool,
    status: PipelineStatus,
    remote_document: Option<RemoteDocument>,
    outcome: Option<AnalysisOutcome>,
    listener: Option<Arc<dyn AnalysisListener>>,
}

struct RunInner {
    id: Uuid,
    state: Mutex<RunState>,
    cancel: CancellationToken,
    status_tx: watch::Sender<PipelineStatus>,
    executor: Arc<dyn UiExecutor>,
}

impl RunInner {
    fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }
}

/// Handle to one `analyze` call
///
/// Cloning yields another handle to the same run.
#[derive(Clone)]
pub struct PipelineRun {
    inner: Arc<RunInner>,
}

impl fmt::Debug for PipelineRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRun")
            .field("id", &self.inner.id)
            .field("status", &self.status())
            .finish()
    }
}

impl PipelineRun {
    pub(crate) fn new(executor: Arc<dyn UiExecutor>) -> Self {
        let (status_tx, _) = watch::channel(PipelineStatus::Idle);
        Self {
            inner: Arc::new(RunInner {
                id: Uuid::now_v7(),
                state: Mutex::new(RunState {
                    cancelled: false,
                    status: PipelineStatus::Idle,
                    remote_document: None,
                    outcome: None,
                    listener: None,
                }),
                cancel: CancellationToken::new(),
                status_tx,
                executor,
            }),
        }
    }

    /// Unique id of this run, used in logs
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Current stage
    pub fn status(&self) -> PipelineStatus {
        self.inner.state.lock().status
    }

    /// The remote document as last seen by the pipeline
    pub fn remote_document(&self) -> Option<RemoteDocument> {
        self.inner.state.lock().remote_document.clone()
    }

    /// Terminal outcome, `None` while the run is still going
    pub fn outcome(&self) -> Option<AnalysisOutcome> {
        self.inner.state.lock().outcome.clone()
    }

    /// Whether `cancel` was called
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Wait until the run reaches a terminal state
    pub async fn wait(&self) -> AnalysisOutcome {
        let mut status = self.inner.status_tx.subscribe();
        // The sender lives in `inner`, which this handle keeps alive
        let _ = status.wait_for(PipelineStatus::is_terminal).await;
        self.outcome().unwrap_or_else(|| {
            AnalysisOutcome::Failure(CaptureError::Internal("run ended without an outcome".into()))
        })
    }

    /// Cancel the run
    ///
    /// A run that has not finished ends as `Cancelled` immediately; the
    /// background task discards whatever its in-flight call returns.
    /// Returns `true` only when this call ended the run. On a finished run
    /// the status stays terminal and `false` is returned, but a result
    /// published and not yet delivered is still suppressed.
    pub fn cancel(&self) -> bool {
        let ended_run = {
            let mut state = self.inner.state.lock();
            if state.cancelled {
                return false;
            }
            state.cancelled = true;
            if state.outcome.is_none() {
                state.status = PipelineStatus::Cancelled;
                state.outcome = Some(AnalysisOutcome::Cancelled);
                self.inner.status_tx.send_replace(PipelineStatus::Cancelled);
                true
            } else {
                false
            }
        };
        self.inner.cancel.cancel();
        if ended_run {
            info!(run_id = %self.inner.id, "analysis run cancelled");
        } else {
            debug!(run_id = %self.inner.id, "cancel ignored, run already finished");
        }
        ended_run
    }

    /// Register the listener, replacing any previous one
    ///
    /// If the run already succeeded or failed, the outcome is delivered to
    /// the new listener right away (through the UI executor).
    pub fn set_listener(&self, listener: impl AnalysisListener + 'static) {
        let listener: Arc<dyn AnalysisListener> = Arc::new(listener);
        let ready = {
            let mut state = self.inner.state.lock();
            state.listener = Some(Arc::clone(&listener));
            match &state.outcome {
                Some(outcome) if !state.cancelled && !matches!(outcome, AnalysisOutcome::Cancelled) => {
                    Some(outcome.clone())
                }
                _ => None,
            }
        };

        if let Some(outcome) = ready {
            self.dispatch(listener, outcome);
        }
    }

    /// Completes when the run is cancelled
    pub(crate) async fn cancelled(&self) {
        self.inner.cancel.cancelled().await;
    }

    /// Move to the next stage unless the run was cancelled
    pub(crate) fn advance(&self, status: PipelineStatus) -> Result<()> {
        let mut state = self.inner.state.lock();
        if state.cancelled {
            return Err(CaptureError::Cancelled);
        }
        state.status = status;
        self.inner.status_tx.send_replace(status);
        debug!(run_id = %self.inner.id, status = %status, "analysis run advanced");
        Ok(())
    }

    /// Pass a step result through, discarding it if the run was cancelled
    pub(crate) fn checkpoint<T>(&self, result: Result<T>) -> Result<T> {
        if self.inner.is_cancelled() {
            return Err(CaptureError::Cancelled);
        }
        result
    }

    pub(crate) fn set_remote_document(&self, document: RemoteDocument) {
        self.inner.state.lock().remote_document = Some(document);
    }

    /// Record the terminal outcome and notify the listener
    ///
    /// Cancellation always wins: a cancelled run keeps `Cancelled` and the
    /// late outcome is dropped.
    pub(crate) fn publish(&self, outcome: AnalysisOutcome) {
        let delivery = {
            let mut state = self.inner.state.lock();
            if state.outcome.is_some() {
                debug!(run_id = %self.inner.id, "run already finished, outcome discarded");
                return;
            }
            let outcome = if state.cancelled { AnalysisOutcome::Cancelled } else { outcome };
            state.status = outcome.status();
            state.outcome = Some(outcome.clone());
            self.inner.status_tx.send_replace(state.status);

            match outcome {
                AnalysisOutcome::Cancelled => None,
                outcome => state.listener.clone().map(|listener| (listener, outcome)),
            }
        };

        info!(run_id = %self.inner.id, status = %self.status(), "analysis run finished");
        if let Some((listener, outcome)) = delivery {
            self.dispatch(listener, outcome);
        }
    }

    fn dispatch(&self, listener: Arc<dyn AnalysisListener>, outcome: AnalysisOutcome) {
        let inner = Arc::clone(&self.inner);
        self.inner.executor.execute(Box::new(move || {
            // Cancelled after publishing but before reaching the UI context
            if inner.is_cancelled() {
                return;
            }
            listener.on_outcome(outcome);
        }));
    }
}
