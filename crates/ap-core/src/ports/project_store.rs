use async_trait::async_trait;
use std::path::PathBuf;

use crate::ports::errors::StoreError;
use crate::project::ProjectRecord;

/// The durable-persistence boundary for project records.
#[async_trait]
pub trait ProjectStorePort: Send + Sync {
    /// Empty on first run. Records that fail to decrypt are skipped, not fatal.
    async fn load(&self) -> Result<Vec<ProjectRecord>, StoreError>;

    /// Replaces the whole document atomically. Sensitive fields are encrypted first.
    async fn save(&self, records: &[ProjectRecord]) -> Result<(), StoreError>;

    /// Copies the current document to a timestamped sibling and returns its path.
    /// - Err(NotFound) if nothing has been saved yet
    async fn backup(&self) -> Result<PathBuf, StoreError>;

    /// Re-encrypts every record under a freshly generated key.
    async fn rotate_key(&self) -> Result<(), StoreError>;

    /// Directory the store actually reads and writes (may be the fallback).
    fn data_dir(&self) -> PathBuf;
}
