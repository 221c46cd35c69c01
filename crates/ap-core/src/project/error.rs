use thiserror::Error;

use crate::ids::ProjectId;
use crate::ports::StoreError;

use super::draft::ValidationError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("a project named '{0}' already exists")]
    DuplicateName(String),

    #[error("project not found: {0}")]
    NotFound(ProjectId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}
