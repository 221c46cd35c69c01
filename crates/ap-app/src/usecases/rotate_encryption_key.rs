use std::sync::Arc;
use tracing::info;

use ap_core::project::RepositoryError;

use crate::repository::ProjectRepository;

pub struct RotateEncryptionKey {
    repo: Arc<ProjectRepository>,
}

impl RotateEncryptionKey {
    pub fn new(repo: Arc<ProjectRepository>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(name = "usecase.rotate_encryption_key.execute", skip(self))]
    pub async fn execute(&self) -> Result<(), RepositoryError> {
        self.repo.rotate_key().await?;
        info!(projects = self.repo.list().await.len(), "Encryption key rotated");
        Ok(())
    }
}
