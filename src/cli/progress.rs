use std::sync::atomic::{AtomicUsize, Ordering};

use ap_core::pipeline::{ProcessingOutcome, ProgressEvent};
use ap_core::ports::ProgressSinkPort;

/// Prints run progress to stdout as the pipeline reports it.
#[derive(Default)]
pub struct ConsoleProgressSink {
    total: AtomicUsize,
}

impl ConsoleProgressSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSinkPort for ConsoleProgressSink {
    fn on_progress(&self, event: &ProgressEvent) {
        self.total.store(event.total, Ordering::Relaxed);
        println!("{}", format_progress(event));
    }

    fn on_outcome(&self, index: usize, outcome: &ProcessingOutcome) {
        println!(
            "{}",
            format_outcome(index, self.total.load(Ordering::Relaxed), outcome)
        );
    }
}

pub fn format_progress(event: &ProgressEvent) -> String {
    if event.is_complete() {
        format!("[{}/{}] done", event.total, event.total)
    } else {
        format!("[{}/{}] {}", event.index + 1, event.total, event.label)
    }
}

pub fn format_outcome(index: usize, total: usize, outcome: &ProcessingOutcome) -> String {
    let prefix = format!("[{}/{}]", index + 1, total);
    if outcome.success {
        format!(
            "{prefix}   published \"{}\" {} ({:.1}s)",
            outcome.title,
            outcome.published_url.as_deref().unwrap_or("-"),
            outcome.elapsed_seconds
        )
    } else {
        format!(
            "{prefix}   failed: {} ({:.1}s)",
            outcome.error_message.as_deref().unwrap_or("unknown error"),
            outcome.elapsed_seconds
        )
    }
}
