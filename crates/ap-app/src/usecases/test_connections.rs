use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use ap_core::pipeline::PipelineError;
use ap_core::ports::{Category, CollaboratorFactoryPort};
use ap_core::ProjectId;

use crate::repository::ProjectRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionCheck {
    pub ok: bool,
    pub error: Option<String>,
}

impl ConnectionCheck {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                error: None,
            },
            Err(err) => Self {
                ok: false,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub generator: ConnectionCheck,
    pub publisher: ConnectionCheck,
    /// Empty when the publisher check failed.
    pub categories: Vec<Category>,
}

impl ConnectionReport {
    pub fn all_ok(&self) -> bool {
        self.generator.ok && self.publisher.ok
    }
}

/// Probe both collaborators of a project. Neither failure stops the other check.
pub struct TestConnections {
    repo: Arc<ProjectRepository>,
    factory: Arc<dyn CollaboratorFactoryPort>,
}

impl TestConnections {
    pub fn new(repo: Arc<ProjectRepository>, factory: Arc<dyn CollaboratorFactoryPort>) -> Self {
        Self { repo, factory }
    }

    #[tracing::instrument(
        name = "usecase.test_connections.execute",
        skip(self),
        fields(project_id = %project_id)
    )]
    pub async fn execute(&self, project_id: &ProjectId) -> Result<ConnectionReport, PipelineError> {
        let project = self
            .repo
            .get(project_id)
            .await
            .ok_or_else(|| PipelineError::ProjectNotFound(project_id.clone()))?;

        let generator = self.factory.generator(&project)?;
        let publisher = self.factory.publisher(&project)?;

        let generator_check = ConnectionCheck::from_result(generator.test_connection().await);
        let publisher_check = ConnectionCheck::from_result(publisher.test_connection().await);

        let categories = if publisher_check.ok {
            match publisher.list_categories().await {
                Ok(categories) => categories,
                Err(err) => {
                    warn!(error = %err, "Failed to list categories");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        info!(
            generator_ok = generator_check.ok,
            publisher_ok = publisher_check.ok,
            "Connection test finished"
        );
        Ok(ConnectionReport {
            generator: generator_check,
            publisher: publisher_check,
            categories,
        })
    }
}
