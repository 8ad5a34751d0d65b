//! UI-facing executors
//!
//! Results of background work are handed to listeners through a
//! [`UiExecutor`], never on the background task that produced them. Hosts
//! with their own main loop implement the trait to post onto it; headless
//! hosts use [`DedicatedThreadExecutor`].

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, warn};

/// Unit of work delivered to the UI context
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Executor representing the single logical UI context
pub trait UiExecutor: Send + Sync {
    /// Schedule `task`; tasks run one at a time in submission order
    fn execute(&self, task: UiTask);
}

/// Runs UI tasks sequentially on one named OS thread
pub struct DedicatedThreadExecutor {
    sender: Mutex<Option<mpsc::Sender<UiTask>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    name: String,
}

impl DedicatedThreadExecutor {
    /// Start the executor thread
    ///
    /// # Errors
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(name: impl Into<String>) -> std::io::Result<Self> {
        let name = name.into();
        let (sender, receiver) = mpsc::channel::<UiTask>();

        let worker = thread::Builder::new().name(name.clone()).spawn(move || {
            while let Ok(task) = receiver.recv() {
                task();
            }
        })?;

        debug!(thread = %name, "ui executor started");
        Ok(Self { sender: Mutex::new(Some(sender)), worker: Mutex::new(Some(worker)), name })
    }

    /// Name of the UI thread
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop accepting tasks, run the queued ones and join the thread
    pub fn shutdown(&self) {
        self.sender.lock().take();
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!(thread = %self.name, "ui executor thread panicked");
            }
        }
    }
}

impl UiExecutor for DedicatedThreadExecutor {
    fn execute(&self, task: UiTask) {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => {
                if sender.send(task).is_err() {
                    warn!(thread = %self.name, "ui executor stopped, task dropped");
                }
            }
            None => warn!(thread = %self.name, "ui executor shut down, task dropped"),
        }
    }
}

impl Drop for DedicatedThreadExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
