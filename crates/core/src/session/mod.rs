//! Bearer session acquisition

pub mod credentials;
pub mod ports;
mod provider;

pub use credentials::generate_credentials;
pub use provider::SessionProvider;
