//! Observability infrastructure
//!
//! Structured logging through `tracing`. Every crate emits events; only
//! the binary installs a subscriber, once, via [`logging::init_tracing`].

pub mod logging;

pub use logging::{init_tracing, LogFormat, LOG_FORMAT_ENV};
