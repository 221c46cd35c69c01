use std::sync::Arc;
use thiserror::Error;

use crate::project::ProjectRecord;

use super::content_generator::ContentGeneratorPort;
use super::publisher::PublisherPort;

#[derive(Debug, Error)]
pub enum CollaboratorSetupError {
    #[error("unsupported generator kind: {0}")]
    UnsupportedGenerator(String),

    #[error("invalid publisher configuration: {0}")]
    InvalidPublisher(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Binds a project record to concrete generation and publishing services.
pub trait CollaboratorFactoryPort: Send + Sync {
    fn generator(
        &self,
        project: &ProjectRecord,
    ) -> Result<Arc<dyn ContentGeneratorPort>, CollaboratorSetupError>;

    fn publisher(
        &self,
        project: &ProjectRecord,
    ) -> Result<Arc<dyn PublisherPort>, CollaboratorSetupError>;
}
