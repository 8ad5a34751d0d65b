//! # Capture App
//!
//! Command line front end for the capture core.
//!
//! This crate contains:
//! - The `capture` command line definition
//! - Application context (dependency injection)
//! - Commands bridging the callback-style network service to async code
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core` and `infra`
//! - Wires up the hexagonal architecture
//! - The only crate that installs a tracing subscriber

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use cli::{Cli, Command};
pub use context::AppContext;
