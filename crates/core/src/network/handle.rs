//! Cancellation handles and result callbacks for network tasks

use std::fmt;
use std::sync::Arc;

use capture_domain::CaptureError;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Receives the result of a network task on the UI executor
///
/// Exactly one method is called per task.
pub trait NetworkCallback<T>: Send + Sync {
    /// Called once with the result
    fn on_success(&self, result: T);

    /// Called once with the error
    fn on_failure(&self, error: CaptureError);

    /// Called once after the task was cancelled
    fn on_cancelled(&self);
}

type CancelHook = Box<dyn FnOnce() + Send + 'static>;

struct TaskInner {
    token: CancellationToken,
    // Taken by whichever of cancellation or completion happens first
    pending: Mutex<Option<CancelHook>>,
}

/// Handle returned by every [`super::CaptureNetworkService`] call
///
/// Cancelling does not abort the request already sent; its result is
/// discarded and the callback receives `on_cancelled` instead.
#[derive(Clone)]
pub struct TaskHandle {
    inner: Arc<TaskInner>,
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl TaskHandle {
    pub(crate) fn new(on_cancel: CancelHook) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                token: CancellationToken::new(),
                pending: Mutex::new(Some(on_cancel)),
            }),
        }
    }

    /// Cancel the task
    ///
    /// Returns `false` when the task already finished or was cancelled.
    pub fn cancel(&self) -> bool {
        let hook = self.inner.pending.lock().take();
        match hook {
            Some(hook) => {
                self.inner.token.cancel();
                hook();
                true
            }
            None => false,
        }
    }

    /// Whether `cancel` was called
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Whether the task delivered a result or was cancelled
    pub fn is_finished(&self) -> bool {
        self.inner.pending.lock().is_none()
    }

    /// Claim the right to deliver a result; `false` if cancelled first
    pub(crate) fn claim_completion(&self) -> bool {
        self.inner.pending.lock().take().is_some()
    }
}
