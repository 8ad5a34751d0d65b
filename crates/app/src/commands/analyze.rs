//! `capture analyze`

use std::collections::BTreeMap;
use std::path::Path;

use capture_domain::{AnalysisResult, CaptureError, Document, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::AnalyzeArgs;
use crate::context::AppContext;
use crate::utils::{callback_channel, execute_logged};

/// Summary of a finished analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Backend id of the uploaded document
    pub document_id: String,
    /// Document name as stored by the backend
    pub name: Option<String>,
    /// Number of pages, when reported
    pub page_count: Option<u32>,
    /// Extraction name → value
    pub extractions: BTreeMap<String, String>,
    /// Compound extraction name → number of rows
    pub compound_extractions: BTreeMap<String, usize>,
    /// Whether the document was deleted after analysis
    pub deleted: bool,
}

impl AnalysisReport {
    fn from_result(result: &AnalysisResult) -> Self {
        let container = &result.extractions;
        Self {
            document_id: result.remote_document.id.clone(),
            name: result.remote_document.name.clone(),
            page_count: result.remote_document.page_count,
            extractions: container
                .specific_extractions
                .iter()
                .map(|(name, extraction)| (name.clone(), extraction.value.clone()))
                .collect(),
            compound_extractions: container
                .compound_extractions
                .iter()
                .map(|(name, compound)| (name.clone(), compound.rows.len()))
                .collect(),
            deleted: false,
        }
    }
}

/// Upload a file, wait for its analysis and summarise the extractions
///
/// Ctrl-C cancels the run; the command then fails with
/// [`CaptureError::Cancelled`].
///
/// # Errors
/// Returns [`CaptureError::Validation`] for unreadable or empty files and
/// the pipeline error otherwise.
pub async fn analyze(ctx: &AppContext, args: &AnalyzeArgs) -> Result<AnalysisReport> {
    execute_logged("analyze", || async {
        let document = read_document(&args.file, args.doc_type.as_deref()).await?;

        let (callback, mut receiver) = callback_channel::<AnalysisResult>();
        let handle = ctx.network.analyze(document, callback);
        let finished = tokio::select! {
            outcome = &mut receiver => Some(outcome),
            _ = tokio::signal::ctrl_c() => None,
        };
        let result = match finished {
            Some(outcome) => outcome?,
            None => {
                warn!("interrupted, cancelling analysis");
                handle.cancel();
                receiver.await?
            }
        };
        let mut report = AnalysisReport::from_result(&result);
        info!(
            document_id = %report.document_id,
            extractions = report.extractions.len(),
            "analysis finished"
        );

        if args.delete {
            let (callback, receiver) = callback_channel::<()>();
            ctx.network.delete(report.document_id.clone(), callback);
            receiver.await?;
            report.deleted = true;
        }

        Ok(report)
    })
    .await
}

async fn read_document(path: &Path, doc_type: Option<&str>) -> Result<Document> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CaptureError::Validation(format!("{} is not a file", path.display())))?;
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| CaptureError::Validation(format!("cannot read {}: {e}", path.display())))?;
    if data.is_empty() {
        return Err(CaptureError::Validation(format!("{} is empty", path.display())));
    }

    let document = Document::from_bytes(data, filename);
    Ok(match doc_type {
        Some(doc_type) => document.with_doc_type(doc_type),
        None => document,
    })
}
