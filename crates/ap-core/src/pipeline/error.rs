use thiserror::Error;

use crate::ids::ProjectId;
use crate::ports::{CollaboratorSetupError, StoreError};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Another run already holds the token for this project.
    #[error("a run is already in progress for project {0}")]
    Conflict(ProjectId),

    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("run setup failed: {0}")]
    Setup(#[from] CollaboratorSetupError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
