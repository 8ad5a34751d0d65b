//! Domain types and models

pub mod analysis;
pub mod document;
pub mod event;
pub mod extraction;
pub mod feedback;
pub mod payment;
pub mod session;

pub use analysis::{AnalysisOutcome, AnalysisResult, PipelineStatus};
pub use document::{Document, PageImageSize, ProcessingState, RemoteDocument};
pub use event::ErrorEvent;
pub use extraction::{
    BoundingBox, CompoundExtraction, Extraction, ExtractionsContainer, ReturnReason,
};
pub use feedback::ExtractionFeedback;
pub use payment::{Payment, ResolvePaymentInput};
pub use session::{Session, UserCredentials};
