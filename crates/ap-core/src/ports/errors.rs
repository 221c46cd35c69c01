use std::path::PathBuf;
use thiserror::Error;

use crate::security::EncryptionError;

#[derive(Debug, Error)]
pub enum AppDirsError {
    #[error("platform data directory is unavailable")]
    DataDirUnavailable,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Neither the primary nor the fallback directory is writable.
    #[error("no writable data directory (tried {tried:?})")]
    PermissionDenied { tried: Vec<PathBuf> },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported document version: {0}")]
    UnsupportedVersion(String),

    #[error("document is corrupt: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}
