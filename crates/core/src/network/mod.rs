//! Callback-style facade over sessions, the document API and the pipeline

mod handle;
mod service;

pub use handle::{NetworkCallback, TaskHandle};
pub use service::{CaptureNetworkService, PageKey};
