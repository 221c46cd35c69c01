use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use ap_core::ports::{KeyMaterialPort, ProjectStorePort, StoreError};
use ap_core::project::ProjectRecord;
use ap_core::security::{EncryptionError, EncryptionKey};

use crate::fs::atomic::{replace, tmp_path, write_atomic};
use crate::fs::resolve_writable_dir;
use crate::security::{FileKeyManager, StagedKey};

use super::document::{ProjectRow, ProjectsDocument, DOCUMENT_VERSION};

pub const DOCUMENT_FILE_NAME: &str = "projects.json";
const BACKUP_PREFIX: &str = "projects_backup_";

/// Project records persisted as one versioned JSON document beside its key file.
pub struct FileProjectStore {
    data_dir: PathBuf,
    path: PathBuf,
    keys: FileKeyManager,
}

/// A rotation whose new key and re-encrypted document are both written to temp
/// files, with the outgoing key retained, but nothing renamed yet.
struct RotationPlan {
    staged: StagedKey,
    doc_tmp: PathBuf,
    count: usize,
}

impl FileProjectStore {
    /// Probe `primary`, switch to `fallback` if it is not writable, and bind
    /// the key manager to the chosen directory.
    ///
    /// The document always lives in the directory that holds the key. If the
    /// key ends up in the fallback, so does the document.
    ///
    /// Fails only when neither location accepts the document and its key.
    pub async fn open(primary: &Path, fallback: &Path) -> Result<Self, StoreError> {
        let dir = resolve_writable_dir(primary, fallback).await?;
        if dir.is_fallback {
            warn!(dir = %dir.path.display(), "Project store is using the fallback directory");
        }

        let keys = FileKeyManager::new(&dir.path, fallback);
        keys.resolve_key().await.map_err(|err| match err {
            EncryptionError::PermissionDenied(_) => StoreError::PermissionDenied {
                tried: vec![dir.path.clone(), fallback.to_path_buf()],
            },
            other => StoreError::Encryption(other),
        })?;

        let key_path = keys.key_path().await;
        let data_dir = match key_path.parent() {
            Some(key_dir) if key_dir != dir.path => {
                warn!(
                    checked = %dir.path.display(),
                    dir = %key_dir.display(),
                    "Encryption key lives elsewhere, keeping projects beside it"
                );
                key_dir.to_path_buf()
            }
            _ => dir.path,
        };

        Ok(Self {
            path: data_dir.join(DOCUMENT_FILE_NAME),
            data_dir,
            keys,
        })
    }

    pub fn document_path(&self) -> &Path {
        &self.path
    }

    pub fn key_manager(&self) -> &FileKeyManager {
        &self.keys
    }

    async fn read_document(&self) -> Result<Option<ProjectsDocument>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.map_io_error(err)),
        };

        let doc: ProjectsDocument =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if doc.version != DOCUMENT_VERSION {
            return Err(StoreError::UnsupportedVersion(doc.version));
        }
        Ok(Some(doc))
    }

    /// Decode every row. Bad rows are skipped unless `strict`, in which case
    /// the first one aborts.
    ///
    /// A row the live key cannot open is retried with `previous`, the key
    /// retained by a rotation that did not finish.
    fn decode_rows(
        &self,
        doc: ProjectsDocument,
        key: &EncryptionKey,
        previous: Option<&EncryptionKey>,
        strict: bool,
    ) -> Result<Vec<ProjectRecord>, StoreError> {
        let mut records = Vec::with_capacity(doc.projects.len());

        for (index, value) in doc.projects.into_iter().enumerate() {
            let name = value
                .get("name")
                .and_then(|n| n.as_str())
                .unwrap_or("unknown")
                .to_string();

            let row: ProjectRow = match serde_json::from_value(value) {
                Ok(row) => row,
                Err(err) if strict => return Err(StoreError::Corrupt(err.to_string())),
                Err(err) => {
                    error!(index, project = %name, error = %err, "Skipping malformed project record");
                    continue;
                }
            };

            let decoded = match (row.decode(key, self.keys.cipher()), previous) {
                (Err(_), Some(previous)) => {
                    let retried = row.decode(previous, self.keys.cipher());
                    if retried.is_ok() {
                        warn!(index, project = %name, "Project record is still under the previous key");
                    }
                    retried
                }
                (result, _) => result,
            };

            match decoded {
                Ok(record) => records.push(record),
                Err(err) if strict => return Err(StoreError::Encryption(err)),
                Err(err) => {
                    error!(index, project = %name, error = %err, "Skipping undecryptable project record");
                }
            }
        }

        Ok(records)
    }

    fn encode_document(
        &self,
        records: &[ProjectRecord],
        key: &EncryptionKey,
    ) -> Result<Vec<u8>, StoreError> {
        let mut projects = Vec::with_capacity(records.len());
        for record in records {
            let row = ProjectRow::encode(record, key, self.keys.cipher())?;
            projects.push(
                serde_json::to_value(row).map_err(|e| StoreError::Serialization(e.to_string()))?,
            );
        }

        let doc = ProjectsDocument {
            version: DOCUMENT_VERSION.to_string(),
            projects,
        };
        serde_json::to_vec_pretty(&doc).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// A retained key that cannot be read is logged and ignored.
    async fn previous_key(&self) -> Option<EncryptionKey> {
        match self.keys.previous_key().await {
            Ok(previous) => previous,
            Err(err) => {
                warn!(error = %err, "Ignoring unreadable previous encryption key");
                None
            }
        }
    }

    /// Re-encrypts everything under a fresh key into temp files.
    ///
    /// The live key is copied aside first, so whatever state a later rename
    /// leaves behind, every row on disk is readable with one of the two keys.
    async fn prepare_rotation(&self) -> Result<RotationPlan, StoreError> {
        let old_key = self.keys.resolve_key().await?;
        let previous = self.previous_key().await;
        let records = match self.read_document().await? {
            Some(doc) => self.decode_rows(doc, &old_key, previous.as_ref(), true)?,
            None => Vec::new(),
        };

        if previous.is_some() {
            // Bring leftover rows under the live key before that key is retained.
            self.save(&records).await?;
        }

        let new_key = EncryptionKey::generate()?;
        let bytes = self.encode_document(&records, &new_key)?;

        let doc_tmp = tmp_path(&self.path);
        tokio::fs::write(&doc_tmp, &bytes)
            .await
            .map_err(|e| self.map_io_error(e))?;

        let staged = match self.keys.retain_previous().await {
            Ok(()) => self.keys.stage_key(new_key).await,
            Err(err) => Err(err),
        };
        let staged = match staged {
            Ok(staged) => staged,
            Err(err) => {
                let _ = tokio::fs::remove_file(&doc_tmp).await;
                return Err(err.into());
            }
        };
        debug!(count = records.len(), "Re-encrypted projects under staged key");

        Ok(RotationPlan {
            staged,
            doc_tmp,
            count: records.len(),
        })
    }

    async fn commit_rotation(&self, plan: RotationPlan) -> Result<(), StoreError> {
        if let Err(err) = self.keys.commit_key(plan.staged).await {
            let _ = tokio::fs::remove_file(&plan.doc_tmp).await;
            return Err(err.into());
        }
        if let Err(err) = replace(&plan.doc_tmp, &self.path).await {
            error!(
                path = %self.path.display(),
                error = %err,
                "Key was rotated but the re-encrypted document could not be moved into place, \
                 records stay readable with the retained previous key"
            );
            return Err(self.map_io_error(err));
        }

        if let Err(err) = self.keys.discard_previous().await {
            warn!(error = %err, "Could not remove previous encryption key");
        }
        info!(count = plan.count, "Rotated encryption key");
        Ok(())
    }

    fn map_io_error(&self, err: io::Error) -> StoreError {
        if err.kind() == io::ErrorKind::PermissionDenied {
            StoreError::PermissionDenied {
                tried: vec![self.data_dir.clone()],
            }
        } else {
            StoreError::Io(format!("{}: {err}", self.path.display()))
        }
    }
}

#[async_trait]
impl ProjectStorePort for FileProjectStore {
    async fn load(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let Some(doc) = self.read_document().await? else {
            info!(path = %self.path.display(), "Projects file not found, starting with empty list");
            return Ok(Vec::new());
        };

        let key = self.keys.resolve_key().await?;
        let previous = self.previous_key().await;
        let total = doc.projects.len();
        let records = self.decode_rows(doc, &key, previous.as_ref(), false)?;

        info!(
            loaded = records.len(),
            skipped = total - records.len(),
            path = %self.path.display(),
            "Loaded projects"
        );
        Ok(records)
    }

    async fn save(&self, records: &[ProjectRecord]) -> Result<(), StoreError> {
        let key = self.keys.resolve_key().await?;
        let bytes = self.encode_document(records, &key)?;

        write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| self.map_io_error(e))?;

        // Every row is now under the live key.
        if let Err(err) = self.keys.discard_previous().await {
            warn!(error = %err, "Could not remove previous encryption key");
        }

        info!(count = records.len(), path = %self.path.display(), "Saved projects");
        Ok(())
    }

    async fn backup(&self) -> Result<PathBuf, StoreError> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Err(StoreError::NotFound(format!(
                "no projects file to back up at {}",
                self.path.display()
            )));
        }

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let backup = self
            .data_dir
            .join(format!("{BACKUP_PREFIX}{timestamp}.json"));

        tokio::fs::copy(&self.path, &backup)
            .await
            .map_err(|e| self.map_io_error(e))?;

        info!(backup = %backup.display(), "Created backup");
        Ok(backup)
    }

    async fn rotate_key(&self) -> Result<(), StoreError> {
        let plan = self.prepare_rotation().await?;
        self.commit_rotation(plan).await
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::project::{GeneratorKind, PostStatus, ProjectDraft};
    use ap_core::security::SecretString;
    use crate::security::{KEY_FILE_NAME, PREVIOUS_KEY_FILE_NAME};
    use tempfile::TempDir;

    fn record(name: &str) -> ProjectRecord {
        ProjectRecord::create(
            ProjectDraft {
                name: name.into(),
                site_url: "https://blog.test".into(),
                username: "editor".into(),
                app_password: SecretString::new("wp-pass"),
                category_id: 1,
                post_status: PostStatus::Draft,
                keywords: vec!["cold brew".into()],
                prompt_template: "Write about <keyword>".into(),
                generator_api_key: SecretString::new("gm-key"),
                generator_kind: GeneratorKind::Gemini,
            },
            Utc::now(),
        )
        .unwrap()
    }

    async fn open(dir: &Path) -> FileProjectStore {
        FileProjectStore::open(&dir.join("data"), &dir.join("fallback"))
            .await
            .unwrap()
    }

    fn names(records: &[ProjectRecord]) -> Vec<String> {
        records.iter().map(|r| r.name.clone()).collect()
    }

    #[tokio::test]
    async fn interrupted_rotation_keeps_records_readable() {
        let tmp = TempDir::new().unwrap();
        let data = tmp.path().join("data");
        let store = open(tmp.path()).await;
        store.save(&[record("Alpha"), record("Beta")]).await.unwrap();
        let old_key = std::fs::read(data.join(KEY_FILE_NAME)).unwrap();

        let plan = store.prepare_rotation().await.unwrap();
        // Lose the re-encrypted document between the key rename and its own.
        std::fs::remove_file(&plan.doc_tmp).unwrap();
        assert!(store.commit_rotation(plan).await.is_err());

        assert_ne!(std::fs::read(data.join(KEY_FILE_NAME)).unwrap(), old_key);
        assert_eq!(
            std::fs::read(data.join(PREVIOUS_KEY_FILE_NAME)).unwrap(),
            old_key
        );
        assert_eq!(names(&store.load().await.unwrap()), ["Alpha", "Beta"]);

        let reopened = open(tmp.path()).await;
        let records = reopened.load().await.unwrap();
        assert_eq!(names(&records), ["Alpha", "Beta"]);
        assert_eq!(records[0].app_password.expose(), "wp-pass");

        // The next save moves every row to the live key and drops the old one.
        reopened.save(&records).await.unwrap();
        assert!(!data.join(PREVIOUS_KEY_FILE_NAME).exists());
        assert_eq!(names(&open(tmp.path()).await.load().await.unwrap()), ["Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn rotation_after_an_interrupted_one_keeps_every_record() {
        let tmp = TempDir::new().unwrap();
        let store = open(tmp.path()).await;
        store.save(&[record("Alpha")]).await.unwrap();

        let plan = store.prepare_rotation().await.unwrap();
        std::fs::remove_file(&plan.doc_tmp).unwrap();
        assert!(store.commit_rotation(plan).await.is_err());

        store.rotate_key().await.unwrap();

        let data = tmp.path().join("data");
        assert!(!data.join(PREVIOUS_KEY_FILE_NAME).exists());
        assert_eq!(names(&open(tmp.path()).await.load().await.unwrap()), ["Alpha"]);
    }

    #[tokio::test]
    async fn completed_rotation_leaves_no_previous_key() {
        let tmp = TempDir::new().unwrap();
        let store = open(tmp.path()).await;
        store.save(&[record("Alpha")]).await.unwrap();

        store.rotate_key().await.unwrap();

        assert!(!tmp.path().join("data").join(PREVIOUS_KEY_FILE_NAME).exists());
        assert_eq!(names(&store.load().await.unwrap()), ["Alpha"]);
    }
}
