use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use ap_core::pipeline::{PipelineError, RunReport, RunState};
use ap_core::ports::{CollaboratorFactoryPort, ProgressSinkPort};
use ap_core::ProjectId;

use crate::pipeline::{Pipeline, RunRegistry};
use crate::repository::ProjectRepository;

/// Resolve a project, claim its run token, bind collaborators and run.
pub struct RunProject {
    repo: Arc<ProjectRepository>,
    factory: Arc<dyn CollaboratorFactoryPort>,
    registry: RunRegistry,
    interval: Duration,
}

impl RunProject {
    pub fn new(
        repo: Arc<ProjectRepository>,
        factory: Arc<dyn CollaboratorFactoryPort>,
        registry: RunRegistry,
        interval: Duration,
    ) -> Self {
        Self {
            repo,
            factory,
            registry,
            interval,
        }
    }

    /// Errors only when no run could start (unknown project, run already in
    /// flight). Holding the run token puts the run in `Running`; a
    /// collaborator setup failure then ends it as a `Failed` report.
    #[tracing::instrument(
        name = "usecase.run_project.execute",
        skip(self, sink, cancel),
        fields(project_id = %project_id)
    )]
    pub async fn execute(
        &self,
        project_id: &ProjectId,
        sink: &dyn ProgressSinkPort,
        cancel: &CancellationToken,
    ) -> Result<RunReport, PipelineError> {
        let project = self
            .repo
            .get(project_id)
            .await
            .ok_or_else(|| PipelineError::ProjectNotFound(project_id.clone()))?;

        let _token = self.registry.acquire(project_id)?;
        let total = project.keyword_count();
        debug!(from = %RunState::Idle, to = %RunState::Running, "Run state transition");

        match Pipeline::build(project, self.factory.as_ref(), self.interval) {
            Ok(mut pipeline) => Ok(pipeline.run(sink, cancel).await),
            Err(err) => {
                error!(error = %err, "Run setup failed");
                debug!(from = %RunState::Running, to = %RunState::Failed, "Run state transition");
                Ok(RunReport::setup_failed(
                    project_id.clone(),
                    total,
                    err.to_string(),
                ))
            }
        }
    }
}
