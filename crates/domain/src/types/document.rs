//! Local and remote document models

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;

/// Backend processing state of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessingState {
    /// Still being processed
    Pending,
    /// Extractions are available
    Completed,
    /// Processing failed
    Error,
    /// State not known to this client
    #[default]
    Unknown,
}

impl_wire_enum_conversions!(ProcessingState {
    Pending => "PENDING",
    Completed => "COMPLETED",
    Error => "ERROR",
    Unknown => "UNKNOWN",
}, fallback = Unknown);

impl ProcessingState {
    /// Whether polling can stop
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// Document as known to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    /// Backend document id
    pub id: String,
    /// Current processing state
    #[serde(rename = "progress", default)]
    pub processing_state: ProcessingState,
    /// Name given at upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Number of pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<i64>,
    /// Upload origin reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// How the backend classified the source, e.g. `SCANNED`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_classification: Option<String>,
}

impl RemoteDocument {
    /// Remote document with only an id, as returned right after upload
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            processing_state: ProcessingState::Pending,
            name: None,
            page_count: None,
            creation_date: None,
            origin: None,
            source_classification: None,
        }
    }
}

/// Local document bytes waiting to be uploaded
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    /// Raw file contents
    pub data: Vec<u8>,
    /// Name sent with the upload
    pub filename: String,
    /// Content type of `data`
    pub mime_type: String,
    /// Optional hint for the backend classifier (`invoice`, `remittance_slip`)
    pub doc_type: Option<String>,
}

impl Document {
    /// Document with an explicit content type
    pub fn new(data: Vec<u8>, filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self { data, filename: filename.into(), mime_type: mime_type.into(), doc_type: None }
    }

    /// Build a document and infer its media type from the filename
    pub fn from_bytes(data: Vec<u8>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let mime_type = mime_type_for_filename(&filename).to_string();
        Self { data, filename, mime_type, doc_type: None }
    }

    /// Hint the document type, e.g. `Invoice`
    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there is no data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("doc_type", &self.doc_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Media type for the upload `Content-Type` header, by file extension
pub fn mime_type_for_filename(filename: &str) -> &'static str {
    let extension = filename.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("tif" | "tiff") => "image/tiff",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Requested rendering size of a page image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageImageSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PageImageSize {
    /// Size of `width` by `height` pixels
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for PageImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
