use serde::Serialize;

use crate::ids::ProjectId;

use super::state::RunState;

/// Result of one keyword in one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingOutcome {
    pub keyword: String,
    pub success: bool,
    /// Empty when generation failed.
    pub title: String,
    pub published_post_id: Option<u64>,
    pub published_url: Option<String>,
    pub error_message: Option<String>,
    pub elapsed_seconds: f64,
}

impl ProcessingOutcome {
    pub fn published(
        keyword: impl Into<String>,
        title: impl Into<String>,
        post_id: u64,
        url: impl Into<String>,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            success: true,
            title: title.into(),
            published_post_id: Some(post_id),
            published_url: Some(url.into()),
            error_message: None,
            elapsed_seconds,
        }
    }

    pub fn failed(
        keyword: impl Into<String>,
        title: impl Into<String>,
        error: impl Into<String>,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            success: false,
            title: title.into(),
            published_post_id: None,
            published_url: None,
            error_message: Some(error.into()),
            elapsed_seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_outcomes(total: usize, outcomes: &[ProcessingOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            total,
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Everything a caller gets back from a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub project_id: ProjectId,
    pub state: RunState,
    pub outcomes: Vec<ProcessingOutcome>,
    pub summary: RunSummary,
    /// Set when `state` is `Failed`.
    pub error: Option<String>,
}

impl RunReport {
    /// Report for a run that entered `Running` but could not bind its
    /// collaborators. Ends in `Failed` with nothing attempted.
    pub fn setup_failed(project_id: ProjectId, total: usize, error: impl Into<String>) -> Self {
        Self {
            project_id,
            state: RunState::Failed,
            outcomes: Vec::new(),
            summary: RunSummary {
                total,
                ..Default::default()
            },
            error: Some(error.into()),
        }
    }
}
