use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use ap_core::pipeline::PipelineError;
use ap_core::ProjectId;
use tracing::debug;

type ActiveRuns = Arc<Mutex<HashSet<ProjectId>>>;

/// Keeps at most one run per project in flight.
#[derive(Clone, Default)]
pub struct RunRegistry {
    active: ActiveRuns,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the project. Fails with `Conflict` while another token for the
    /// same id is alive.
    pub fn acquire(&self, project_id: &ProjectId) -> Result<RunToken, PipelineError> {
        let mut active = lock(&self.active);
        if !active.insert(project_id.clone()) {
            return Err(PipelineError::Conflict(project_id.clone()));
        }
        debug!(project_id = %project_id, "Run token acquired");

        Ok(RunToken {
            project_id: project_id.clone(),
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_running(&self, project_id: &ProjectId) -> bool {
        lock(&self.active).contains(project_id)
    }
}

/// Released on drop, whichever terminal state the run ends in.
pub struct RunToken {
    project_id: ProjectId,
    active: ActiveRuns,
}

impl RunToken {
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }
}

impl Drop for RunToken {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.project_id);
        debug!(project_id = %self.project_id, "Run token released");
    }
}

fn lock(active: &ActiveRuns) -> MutexGuard<'_, HashSet<ProjectId>> {
    // The set stays consistent even if a holder panicked.
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_conflicts_until_release() {
        let registry = RunRegistry::new();
        let id = ProjectId::new();

        let token = registry.acquire(&id).unwrap();
        assert!(registry.is_running(&id));
        assert!(matches!(
            registry.acquire(&id),
            Err(PipelineError::Conflict(ref p)) if p == &id
        ));

        drop(token);
        assert!(!registry.is_running(&id));
        assert!(registry.acquire(&id).is_ok());
    }

    #[test]
    fn different_projects_do_not_conflict() {
        let registry = RunRegistry::new();
        let _a = registry.acquire(&ProjectId::new()).unwrap();
        let _b = registry.acquire(&ProjectId::new()).unwrap();
    }

    #[test]
    fn clones_share_the_same_set() {
        let registry = RunRegistry::new();
        let id = ProjectId::new();
        let _token = registry.clone().acquire(&id).unwrap();
        assert!(registry.is_running(&id));
    }
}
