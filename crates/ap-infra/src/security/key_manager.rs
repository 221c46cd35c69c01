use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use ap_core::ports::{KeyMaterialPort, SecretCipherPort};
use ap_core::security::{EncryptionError, EncryptionKey};

use crate::fs::atomic::{replace, tmp_path};

use super::encryption::XChaChaSecretCipher;

pub const KEY_FILE_NAME: &str = ".encryption_key";
/// The key that was live before the last rotation, kept until the document
/// re-encrypted under the new key is known to be in place.
pub const PREVIOUS_KEY_FILE_NAME: &str = ".encryption_key.prev";

struct ResolvedKey {
    key: EncryptionKey,
    path: PathBuf,
}

/// A new key written beside the live one, waiting to be renamed into place.
pub(crate) struct StagedKey {
    pub(crate) key: EncryptionKey,
    tmp: PathBuf,
    target: PathBuf,
}

/// Owns the single symmetric key of one data directory.
///
/// The key is read or generated once and cached for the session. When the
/// primary directory refuses the key file, the fallback directory takes it.
/// A key found in the fallback is preferred over generating a fresh one in the
/// primary, so data written while the primary was unusable stays readable.
pub struct FileKeyManager {
    primary_dir: PathBuf,
    fallback_dir: PathBuf,
    cipher: XChaChaSecretCipher,
    resolved: Mutex<Option<ResolvedKey>>,
}

impl FileKeyManager {
    pub fn new(primary_dir: impl Into<PathBuf>, fallback_dir: impl Into<PathBuf>) -> Self {
        Self {
            primary_dir: primary_dir.into(),
            fallback_dir: fallback_dir.into(),
            cipher: XChaChaSecretCipher,
            resolved: Mutex::new(None),
        }
    }

    pub fn cipher(&self) -> &XChaChaSecretCipher {
        &self.cipher
    }

    pub async fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        let key = self.resolve_key().await?;
        self.cipher.encrypt(&key, plaintext)
    }

    pub async fn decrypt(&self, ciphertext: &str) -> Result<String, EncryptionError> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }
        let key = self.resolve_key().await?;
        self.cipher.decrypt(&key, ciphertext)
    }

    /// Writes `key` to a temp file next to the live key file.
    pub(crate) async fn stage_key(&self, key: EncryptionKey) -> Result<StagedKey, EncryptionError> {
        self.resolve_key().await?;
        let target = self.key_path().await;
        let tmp = tmp_path(&target);
        write_key_file(&tmp, &key)
            .await
            .map_err(|e| EncryptionError::IoFailure(format!("{}: {e}", tmp.display())))?;

        Ok(StagedKey { key, tmp, target })
    }

    /// Renames a staged key over the live one and switches the session to it.
    pub(crate) async fn commit_key(&self, staged: StagedKey) -> Result<(), EncryptionError> {
        replace(&staged.tmp, &staged.target).await.map_err(|e| {
            EncryptionError::IoFailure(format!("{}: {e}", staged.target.display()))
        })?;

        let mut guard = self.resolved.lock().await;
        *guard = Some(ResolvedKey {
            key: staged.key,
            path: staged.target,
        });
        Ok(())
    }

    /// Copies the live key to [`PREVIOUS_KEY_FILE_NAME`] beside it.
    pub(crate) async fn retain_previous(&self) -> Result<(), EncryptionError> {
        let current = self.resolve_key().await?;
        let path = self.previous_key_path().await;
        persist_key(&path, &current)
            .await
            .map_err(|e| EncryptionError::IoFailure(format!("{}: {e}", path.display())))
    }

    pub(crate) async fn previous_key(&self) -> Result<Option<EncryptionKey>, EncryptionError> {
        read_key_file(&self.previous_key_path().await).await
    }

    pub(crate) async fn discard_previous(&self) -> Result<(), EncryptionError> {
        let path = self.previous_key_path().await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed previous encryption key");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(EncryptionError::IoFailure(format!(
                "{}: {err}",
                path.display()
            ))),
        }
    }

    async fn previous_key_path(&self) -> PathBuf {
        self.key_path()
            .await
            .with_file_name(PREVIOUS_KEY_FILE_NAME)
    }

    async fn load_or_create(&self) -> Result<ResolvedKey, EncryptionError> {
        let primary = self.primary_dir.join(KEY_FILE_NAME);
        if let Some(key) = read_key_file(&primary).await? {
            debug!(path = %primary.display(), "Loaded encryption key");
            return Ok(ResolvedKey { key, path: primary });
        }

        let fallback = self.fallback_dir.join(KEY_FILE_NAME);
        // An earlier session fell back; its data is encrypted under that key.
        if fallback != primary {
            if let Some(existing) = read_key_file(&fallback).await? {
                warn!(path = %fallback.display(), "Using encryption key from fallback location");
                return Ok(ResolvedKey {
                    key: existing,
                    path: fallback,
                });
            }
        }

        let key = EncryptionKey::generate()?;
        match persist_key(&primary, &key).await {
            Ok(()) => {
                info!(path = %primary.display(), "Generated new encryption key");
                return Ok(ResolvedKey { key, path: primary });
            }
            Err(err) => {
                warn!(
                    path = %primary.display(),
                    kind = ?err.kind(),
                    error = %err,
                    "Cannot write encryption key, trying fallback location"
                );
            }
        }

        match persist_key(&fallback, &key).await {
            Ok(()) => {
                warn!(path = %fallback.display(), "Generated encryption key in fallback location");
                Ok(ResolvedKey {
                    key,
                    path: fallback,
                })
            }
            Err(err) => Err(EncryptionError::PermissionDenied(format!(
                "{} and {}: {err}",
                primary.display(),
                fallback.display()
            ))),
        }
    }
}

#[async_trait]
impl KeyMaterialPort for FileKeyManager {
    async fn resolve_key(&self) -> Result<EncryptionKey, EncryptionError> {
        let mut guard = self.resolved.lock().await;
        if let Some(resolved) = guard.as_ref() {
            return Ok(resolved.key.clone());
        }

        let resolved = self.load_or_create().await?;
        let key = resolved.key.clone();
        *guard = Some(resolved);
        Ok(key)
    }

    async fn key_path(&self) -> PathBuf {
        match self.resolved.lock().await.as_ref() {
            Some(resolved) => resolved.path.clone(),
            None => self.primary_dir.join(KEY_FILE_NAME),
        }
    }
}

async fn read_key_file(path: &Path) -> Result<Option<EncryptionKey>, EncryptionError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => EncryptionKey::from_bytes(&bytes).map(Some),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(EncryptionError::IoFailure(format!(
            "{}: {err}",
            path.display()
        ))),
    }
}

async fn persist_key(path: &Path, key: &EncryptionKey) -> io::Result<()> {
    let tmp = tmp_path(path);
    write_key_file(&tmp, key).await?;
    replace(&tmp, path).await
}

async fn write_key_file(path: &Path, key: &EncryptionKey) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, key.as_bytes()).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(path, perms).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn first_resolve_generates_and_persists_key() {
        let tmp = TempDir::new().unwrap();
        let manager = FileKeyManager::new(tmp.path().join("data"), tmp.path().join("fb"));

        let key = manager.resolve_key().await.unwrap();
        let on_disk = std::fs::read(tmp.path().join("data").join(KEY_FILE_NAME)).unwrap();
        assert_eq!(on_disk, key.as_bytes());
        assert_eq!(
            manager.key_path().await,
            tmp.path().join("data").join(KEY_FILE_NAME)
        );
    }

    #[tokio::test]
    async fn existing_key_is_reused_across_instances() {
        let tmp = TempDir::new().unwrap();
        let first = FileKeyManager::new(tmp.path(), tmp.path().join("fb"));
        let second = FileKeyManager::new(tmp.path(), tmp.path().join("fb"));

        let a = first.resolve_key().await.unwrap();
        let b = second.resolve_key().await.unwrap();
        assert_eq!(a, b);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let manager = FileKeyManager::new(tmp.path(), tmp.path().join("fb"));
        manager.resolve_key().await.unwrap();

        let mode = std::fs::metadata(tmp.path().join(KEY_FILE_NAME))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn unwritable_primary_falls_back_and_remembers_path() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let fallback = tmp.path().join("fb");
        let manager = FileKeyManager::new(blocker.join("data"), &fallback);

        let key = manager.resolve_key().await.unwrap();
        assert_eq!(manager.key_path().await, fallback.join(KEY_FILE_NAME));

        let again = manager.resolve_key().await.unwrap();
        assert_eq!(key, again);
    }

    #[tokio::test]
    async fn existing_fallback_key_wins_over_generating_a_new_one() {
        let tmp = TempDir::new().unwrap();
        let primary = tmp.path().join("data");
        let fallback = tmp.path().join("fb");
        std::fs::create_dir_all(&fallback).unwrap();
        std::fs::write(fallback.join(KEY_FILE_NAME), [5u8; 32]).unwrap();

        let manager = FileKeyManager::new(&primary, &fallback);
        let key = manager.resolve_key().await.unwrap();

        assert_eq!(key.as_bytes(), &[5u8; 32]);
        assert_eq!(manager.key_path().await, fallback.join(KEY_FILE_NAME));
        assert!(!primary.join(KEY_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn previous_key_is_kept_until_discarded() {
        let tmp = TempDir::new().unwrap();
        let manager = FileKeyManager::new(tmp.path(), tmp.path().join("fb"));
        let old = manager.resolve_key().await.unwrap();
        assert!(manager.previous_key().await.unwrap().is_none());

        manager.retain_previous().await.unwrap();
        let staged = manager
            .stage_key(EncryptionKey::generate().unwrap())
            .await
            .unwrap();
        manager.commit_key(staged).await.unwrap();

        assert_ne!(manager.resolve_key().await.unwrap(), old);
        assert_eq!(manager.previous_key().await.unwrap(), Some(old));
        assert!(tmp.path().join(PREVIOUS_KEY_FILE_NAME).exists());

        manager.discard_previous().await.unwrap();
        assert!(manager.previous_key().await.unwrap().is_none());
        // Discarding twice is fine.
        manager.discard_previous().await.unwrap();
    }

    #[tokio::test]
    async fn no_writable_location_is_permission_denied() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let manager = FileKeyManager::new(blocker.join("a"), blocker.join("b"));

        let err = manager.resolve_key().await.unwrap_err();
        assert!(matches!(err, EncryptionError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn wrong_length_key_file_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(KEY_FILE_NAME), b"short").unwrap();
        let manager = FileKeyManager::new(tmp.path(), tmp.path().join("fb"));

        let err = manager.resolve_key().await.unwrap_err();
        assert!(matches!(err, EncryptionError::KeyMaterialCorrupt(_)));
    }

    #[tokio::test]
    async fn encrypt_decrypt_through_manager() {
        let tmp = TempDir::new().unwrap();
        let manager = FileKeyManager::new(tmp.path(), tmp.path().join("fb"));

        let text = manager.encrypt("app-password").await.unwrap();
        assert_eq!(manager.decrypt(&text).await.unwrap(), "app-password");
        assert_eq!(manager.encrypt("").await.unwrap(), "");
    }

    #[tokio::test]
    async fn committed_key_replaces_live_key() {
        let tmp = TempDir::new().unwrap();
        let manager = FileKeyManager::new(tmp.path(), tmp.path().join("fb"));
        let old = manager.resolve_key().await.unwrap();

        let staged = manager
            .stage_key(EncryptionKey::generate().unwrap())
            .await
            .unwrap();
        // Not live until committed.
        assert_eq!(
            std::fs::read(tmp.path().join(KEY_FILE_NAME)).unwrap(),
            old.as_bytes()
        );

        manager.commit_key(staged).await.unwrap();
        let new = manager.resolve_key().await.unwrap();
        assert_ne!(new, old);
        assert_eq!(
            std::fs::read(tmp.path().join(KEY_FILE_NAME)).unwrap(),
            new.as_bytes()
        );
    }
}
