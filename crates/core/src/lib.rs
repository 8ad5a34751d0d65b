//! # Capture Core
//!
//! Orchestration logic for document capture - no HTTP or platform code.
//!
//! This crate contains:
//! - Port interfaces (traits) for the user center, document API and
//!   credential storage
//! - [`SessionProvider`]: single-flight bearer session acquisition
//! - [`AnalysisPipeline`]: cancellable upload → poll → extract runs
//! - [`CaptureNetworkService`]: callback-style facade for UI callers
//! - UI executors that deliver results off the background context
//!
//! ## Architecture Principles
//! - Only depends on `capture-common` and `capture-domain`
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod analysis;
pub mod dispatch;
pub mod documents;
pub mod network;
pub mod session;

// Re-export specific items to avoid ambiguity
pub use analysis::{AnalysisListener, AnalysisPipeline, PipelineRun};
pub use dispatch::{DedicatedThreadExecutor, UiExecutor, UiTask};
pub use documents::ports::DocumentApi;
pub use network::{CaptureNetworkService, NetworkCallback, PageKey, TaskHandle};
pub use session::ports::{AuthApi, CredentialsStore};
pub use session::SessionProvider;
