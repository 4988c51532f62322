//! Recommendation pipeline: filters, justification, and run orchestration.

pub mod filters;
pub mod justify;
pub mod pipeline;

pub use filters::{apply_filters, classify_audience, is_denied};
pub use justify::GENERIC_JUSTIFICATION;
pub use pipeline::{ProgressReporter, RunOptions, RunStage, SilentProgress, recommend};
