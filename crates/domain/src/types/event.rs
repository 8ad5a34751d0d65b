//! Client-side error events reported to the backend

use serde::{Deserialize, Serialize};

/// Error report posted to the events endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    /// Hardware model or architecture
    pub device_model: String,
    /// Operating system name
    pub os_name: String,
    /// Operating system version
    pub os_version: String,
    /// Document API version in use
    pub api_version: String,
    /// Client version
    pub sdk_version: String,
    /// What went wrong
    pub description: String,
    /// Document involved, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Request id of the failed call, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_request_id: Option<String>,
}

impl ErrorEvent {
    /// Event describing the current host, with the crate version as SDK version
    pub fn for_host(description: impl Into<String>) -> Self {
        Self {
            device_model: std::env::consts::ARCH.to_string(),
            os_name: std::env::consts::OS.to_string(),
            os_version: String::new(),
            api_version: "2".to_string(),
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            description: description.into(),
            document_id: None,
            original_request_id: None,
        }
    }

    /// Attach the document involved
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }
}
