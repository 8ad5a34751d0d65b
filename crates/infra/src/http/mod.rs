//! HTTP transport shared by the API clients

mod client;

pub use client::{is_retryable_status, HttpClient, HttpClientBuilder};
