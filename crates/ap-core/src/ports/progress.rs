use crate::pipeline::{ProcessingOutcome, ProgressEvent};

/// Caller-supplied sink for run progress. Called from the run's own task, in order.
pub trait ProgressSinkPort: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);

    fn on_outcome(&self, index: usize, outcome: &ProcessingOutcome);
}

pub struct NoopProgressSink;

impl ProgressSinkPort for NoopProgressSink {
    fn on_progress(&self, _event: &ProgressEvent) {}

    fn on_outcome(&self, _index: usize, _outcome: &ProcessingOutcome) {}
}
