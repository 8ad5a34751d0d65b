//! Document analysis runs
//!
//! An [`AnalysisPipeline`] turns a local [`capture_domain::Document`] into an
//! [`capture_domain::AnalysisResult`] in three stages: upload, poll until the
//! backend finished processing, fetch extractions. Each call returns a
//! [`PipelineRun`] that can be observed and cancelled.

mod pipeline;
mod run;

pub use pipeline::AnalysisPipeline;
pub use run::{AnalysisListener, PipelineRun};
