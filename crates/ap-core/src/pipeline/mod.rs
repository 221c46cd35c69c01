//! Value types produced by one pipeline run. Nothing here is persisted.

mod error;
pub mod event;
pub mod outcome;
pub mod state;

pub use error::PipelineError;
pub use event::{ProgressEvent, COMPLETE_LABEL};
pub use outcome::{ProcessingOutcome, RunReport, RunSummary};
pub use state::RunState;
