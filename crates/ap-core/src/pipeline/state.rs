use serde::Serialize;
use std::fmt;

/// `Idle → Running → {Completed | Cancelled | Failed}`
///
/// A run enters `Running` once it holds the project's run slot. Binding the
/// collaborators happens inside `Running`, so a setup failure is
/// `Running → Failed` with no keyword attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    /// Run setup failed after entering `Running`; no keyword was attempted.
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Cancelled | RunState::Failed
        )
    }

    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Idle, RunState::Running)
                | (RunState::Running, RunState::Completed)
                | (RunState::Running, RunState::Cancelled)
                | (RunState::Running, RunState::Failed)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Cancelled => "cancelled",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}
