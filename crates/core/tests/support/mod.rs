//! Shared test helpers for `capture-core` integration tests.
//!
//! In-memory mocks for the core ports plus a callback collector, so tests can
//! focus on orchestration behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod callbacks;
pub mod mocks;

use std::sync::Arc;

use capture_core::{DedicatedThreadExecutor, SessionProvider, UiExecutor};

/// Name of the thread every UI delivery must happen on
pub const UI_THREAD: &str = "capture-ui-test";

pub fn ui_executor() -> Arc<dyn UiExecutor> {
    Arc::new(DedicatedThreadExecutor::spawn(UI_THREAD).expect("spawn ui thread"))
}

pub fn session_provider(
    auth: Arc<mocks::MockAuthApi>,
    store: Arc<mocks::MockCredentialsStore>,
) -> SessionProvider {
    SessionProvider::new(auth, store, "capture.test")
}
