//! HTTP clients for the document API and the user center
//!
//! # Architecture
//!
//! - Built on [`crate::http::HttpClient`], which applies the retry policy
//! - `ApiClient` implements the core `DocumentApi` port
//! - `UserCenterClient` implements the core `AuthApi` port
//! - Non-success statuses are classified by [`ApiError`] and converted to
//!   `CaptureError` at the port boundary

pub mod auth;
pub mod client;
pub mod errors;

pub use auth::UserCenterClient;
pub use client::{ApiClient, MEDIA_TYPE_JSON_V1, MEDIA_TYPE_JSON_V2};
pub use errors::{ApiError, ApiErrorCategory};
