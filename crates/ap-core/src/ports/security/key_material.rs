use async_trait::async_trait;
use std::path::PathBuf;

use crate::security::{EncryptionError, EncryptionKey};

#[async_trait]
pub trait KeyMaterialPort: Send + Sync {
    /// Load the key for this data directory, generating and persisting it on first use.
    /// - Err(PermissionDenied) if no location can hold the key file
    async fn resolve_key(&self) -> Result<EncryptionKey, EncryptionError>;

    /// Where the key currently lives (may be the fallback location).
    async fn key_path(&self) -> PathBuf;
}
