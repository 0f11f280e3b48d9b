//! Query analysis pipeline
//!
//! Query lifecycle, the brand/query records the pipeline works on, and the
//! sequential batch runner.

mod lifecycle;
mod records;
mod runner;

pub use lifecycle::QueryStatus;
pub use records::{BrandDraft, BrandProfile, TrackedQuery};
pub use runner::{AnalysisStore, BatchReport, BatchRunner, QueryFailure};
