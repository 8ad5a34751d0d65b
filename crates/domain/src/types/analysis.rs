//! Analysis run status and outcome

use serde::{Deserialize, Serialize};

use super::document::RemoteDocument;
use super::extraction::ExtractionsContainer;
use crate::errors::CaptureError;
use crate::impl_wire_enum_conversions;

/// Stage of an analysis run
///
/// Runs move forward only: `Idle → Uploading → Polling → Extracting` and
/// then into exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineStatus {
    /// Created, not started
    #[default]
    Idle,
    /// Creating the remote document
    Uploading,
    /// Waiting for processing to finish
    Polling,
    /// Fetching extractions
    Extracting,
    /// Finished with extractions
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled by the caller
    Cancelled,
}

impl_wire_enum_conversions!(PipelineStatus {
    Idle => "IDLE",
    Uploading => "UPLOADING",
    Polling => "POLLING",
    Extracting => "EXTRACTING",
    Completed => "COMPLETED",
    Failed => "FAILED",
    Cancelled => "CANCELLED",
});

impl PipelineStatus {
    /// Whether no further transition can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Successful analysis of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Processed document
    pub remote_document: RemoteDocument,
    /// Its extractions
    pub extractions: ExtractionsContainer,
}

/// Terminal outcome of an analysis run
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Extractions for the processed document
    Success(AnalysisResult),
    /// Terminal error of the run
    Failure(CaptureError),
    /// Cancelled by the caller
    Cancelled,
}

impl AnalysisOutcome {
    /// Status a run ends in with this outcome
    pub fn status(&self) -> PipelineStatus {
        match self {
            Self::Success(_) => PipelineStatus::Completed,
            Self::Failure(_) => PipelineStatus::Failed,
            Self::Cancelled => PipelineStatus::Cancelled,
        }
    }

    /// Whether the run produced extractions
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Convert into a `Result`, with `Cancelled` as an error
    pub fn into_result(self) -> Result<AnalysisResult, CaptureError> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Failure(error) => Err(error),
            Self::Cancelled => Err(CaptureError::Cancelled),
        }
    }
}
