//! Command implementations
//!
//! Each command returns a serializable report; `main` prints it as JSON.

pub mod analyze;
pub mod feedback;
pub mod page;
pub mod sign_out;

pub use analyze::{analyze, AnalysisReport};
pub use feedback::{feedback, FeedbackReport};
pub use page::{page, PageReport};
pub use sign_out::sign_out;
