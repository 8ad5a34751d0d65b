//! `capture page`

use std::path::PathBuf;
use std::sync::Arc;

use capture_common::cache::{Payload, ResourceOwner};
use capture_core::PageKey;
use capture_domain::{CaptureError, Result};
use serde::Serialize;
use tracing::debug;

use crate::cli::PageArgs;
use crate::context::AppContext;
use crate::utils::{callback_channel, execute_logged};

/// Result of the page command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    /// Document the page belongs to
    pub document_id: String,
    /// One-based page number
    pub page: u32,
    /// File the image was written to
    pub path: PathBuf,
    /// Size of the written image
    pub bytes: usize,
}

/// The written file keeps no reference to the cached payload
struct FileOwner {
    path: PathBuf,
}

impl ResourceOwner for FileOwner {
    fn unload(&self) {
        debug!(path = %self.path.display(), "page image left the cache");
    }
}

/// Download a rendered page through the page image cache and write it out
///
/// # Errors
/// Returns the download error, or [`CaptureError::Storage`] when the file
/// cannot be written.
pub async fn page(ctx: &AppContext, args: &PageArgs) -> Result<PageReport> {
    execute_logged("page", || async {
        let key = PageKey {
            document_id: args.document_id.clone(),
            page: args.page,
            size: args.size,
        };
        let owner = Arc::new(FileOwner { path: args.out.clone() });

        let (callback, receiver) = callback_channel::<Payload>();
        ctx.network.page_image(key, owner, callback);
        let payload = receiver.await?;

        tokio::fs::write(&args.out, &payload[..]).await.map_err(|e| {
            CaptureError::Storage(format!("cannot write {}: {e}", args.out.display()))
        })?;

        Ok(PageReport {
            document_id: args.document_id.clone(),
            page: args.page,
            path: args.out.clone(),
            bytes: payload.len(),
        })
    })
    .await
}
