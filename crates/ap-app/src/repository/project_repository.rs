use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use ap_core::ports::{ClockPort, ProjectStorePort};
use ap_core::project::{ProjectDraft, ProjectPatch, ProjectRecord, RepositoryError};
use ap_core::ProjectId;

/// In-memory source of truth for the project set, backed by the store.
///
/// Every mutation runs under one lock together with its `save`, so the
/// collection and the document never disagree after a successful call.
pub struct ProjectRepository {
    store: Arc<dyn ProjectStorePort>,
    clock: Arc<dyn ClockPort>,
    records: Mutex<Vec<ProjectRecord>>,
}

impl ProjectRepository {
    /// Empty repository. Call [`ProjectRepository::reload`] to read the store.
    pub fn new(store: Arc<dyn ProjectStorePort>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            store,
            clock,
            records: Mutex::new(Vec::new()),
        }
    }

    pub async fn open(
        store: Arc<dyn ProjectStorePort>,
        clock: Arc<dyn ClockPort>,
    ) -> Result<Self, RepositoryError> {
        let repo = Self::new(store, clock);
        repo.reload().await?;
        Ok(repo)
    }

    pub async fn reload(&self) -> Result<usize, RepositoryError> {
        let loaded = self.store.load().await?;
        let count = loaded.len();
        *self.records.lock().await = loaded;
        Ok(count)
    }

    /// Build a record from `draft` and add it.
    pub async fn create(&self, draft: ProjectDraft) -> Result<ProjectRecord, RepositoryError> {
        let record = ProjectRecord::create(draft, self.clock.now())?;
        self.add(record.clone()).await?;
        Ok(record)
    }

    /// Append and persist.
    ///
    /// A failed save leaves the record in memory but not durable; the caller
    /// retries or deletes it.
    pub async fn add(&self, record: ProjectRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.name == record.name) {
            return Err(RepositoryError::DuplicateName(record.name));
        }

        info!(project_id = %record.id, name = %record.name, "Adding project");
        records.push(record);
        self.persist(&records).await
    }

    /// Whole-record replacement. `id` and `created_at` of the existing record are kept.
    pub async fn update(
        &self,
        id: &ProjectId,
        new_record: ProjectRecord,
    ) -> Result<ProjectRecord, RepositoryError> {
        let mut records = self.records.lock().await;
        let index = Self::position(&records, id)?;
        new_record.validate()?;
        Self::ensure_name_free(&records, &new_record.name, id)?;

        let replaced = records[index].replaced_by(new_record, self.clock.now());
        records[index] = replaced.clone();
        self.persist(&records).await?;
        Ok(replaced)
    }

    pub async fn patch(
        &self,
        id: &ProjectId,
        patch: ProjectPatch,
    ) -> Result<ProjectRecord, RepositoryError> {
        let mut records = self.records.lock().await;
        let index = Self::position(&records, id)?;

        let patched = patch.apply_to(&records[index], self.clock.now())?;
        Self::ensure_name_free(&records, &patched.name, id)?;

        records[index] = patched.clone();
        self.persist(&records).await?;
        Ok(patched)
    }

    pub async fn delete(&self, id: &ProjectId) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().await;
        let index = Self::position(&records, id)?;

        let removed = records.remove(index);
        info!(project_id = %removed.id, name = %removed.name, "Deleting project");
        self.persist(&records).await
    }

    pub async fn get(&self, id: &ProjectId) -> Option<ProjectRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| &r.id == id)
            .cloned()
    }

    pub async fn get_by_name(&self, name: &str) -> Option<ProjectRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.name == name)
            .cloned()
    }

    pub async fn list(&self) -> Vec<ProjectRecord> {
        self.records.lock().await.clone()
    }

    pub async fn backup(&self) -> Result<PathBuf, RepositoryError> {
        let _records = self.records.lock().await;
        Ok(self.store.backup().await?)
    }

    /// Re-encrypt the stored document under a fresh key. The in-memory set is
    /// unchanged; no mutation can interleave.
    pub async fn rotate_key(&self) -> Result<(), RepositoryError> {
        let _records = self.records.lock().await;
        Ok(self.store.rotate_key().await?)
    }

    async fn persist(&self, records: &[ProjectRecord]) -> Result<(), RepositoryError> {
        self.store.save(records).await.map_err(|err| {
            warn!(error = %err, "Failed to persist projects");
            RepositoryError::Store(err)
        })
    }

    fn position(records: &[ProjectRecord], id: &ProjectId) -> Result<usize, RepositoryError> {
        records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }

    fn ensure_name_free(
        records: &[ProjectRecord],
        name: &str,
        owner: &ProjectId,
    ) -> Result<(), RepositoryError> {
        if records.iter().any(|r| r.name == name && &r.id != owner) {
            return Err(RepositoryError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}
