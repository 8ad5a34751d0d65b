//! Credentials store implementations

mod keychain;
mod memory;

pub use keychain::{KeychainCredentialsStore, DEFAULT_SERVICE_NAME};
pub use memory::InMemoryCredentialsStore;
