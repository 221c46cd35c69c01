use std::io;
use std::path::{Path, PathBuf};

use ap_core::ports::StoreError;
use tracing::{info, warn};

const PROBE_FILE_NAME: &str = ".write_probe";

/// A directory that passed the write probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritableDir {
    pub path: PathBuf,
    pub is_fallback: bool,
}

/// Creates `dir` if needed, then writes and removes a probe file inside it.
pub async fn probe_writable(dir: &Path) -> io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let probe = dir.join(PROBE_FILE_NAME);
    tokio::fs::write(&probe, b"probe").await?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

/// Picks `primary` if it is writable, else `fallback`.
///
/// Any I/O failure on the primary counts as "not writable": a read-only mount,
/// a missing parent, or a file squatting on the path all end the same way.
pub async fn resolve_writable_dir(
    primary: &Path,
    fallback: &Path,
) -> Result<WritableDir, StoreError> {
    match probe_writable(primary).await {
        Ok(()) => {
            return Ok(WritableDir {
                path: primary.to_path_buf(),
                is_fallback: false,
            })
        }
        Err(err) => {
            warn!(
                dir = %primary.display(),
                kind = ?err.kind(),
                error = %err,
                "Primary data directory is not writable"
            );
        }
    }

    match probe_writable(fallback).await {
        Ok(()) => {
            info!(dir = %fallback.display(), "Using alternative data directory");
            Ok(WritableDir {
                path: fallback.to_path_buf(),
                is_fallback: true,
            })
        }
        Err(err) => {
            warn!(dir = %fallback.display(), error = %err, "Fallback data directory is not writable");
            Err(StoreError::PermissionDenied {
                tried: vec![primary.to_path_buf(), fallback.to_path_buf()],
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn writable_primary_is_kept() {
        let tmp = TempDir::new().unwrap();
        let primary = tmp.path().join("data");
        let fallback = tmp.path().join("fallback");

        let dir = resolve_writable_dir(&primary, &fallback).await.unwrap();
        assert_eq!(dir.path, primary);
        assert!(!dir.is_fallback);
        assert!(!primary.join(PROBE_FILE_NAME).exists());
        assert!(!fallback.exists());
    }

    #[tokio::test]
    async fn blocked_primary_switches_to_fallback() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let primary = blocker.join("data");
        let fallback = tmp.path().join("fallback");

        let dir = resolve_writable_dir(&primary, &fallback).await.unwrap();
        assert_eq!(dir.path, fallback);
        assert!(dir.is_fallback);
    }

    #[tokio::test]
    async fn no_writable_location_is_permission_denied() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let err = resolve_writable_dir(&blocker.join("a"), &blocker.join("b"))
            .await
            .unwrap_err();
        match err {
            StoreError::PermissionDenied { tried } => assert_eq!(tried.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
