//! Shared fakes for unit tests.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ap_core::ports::{ClockPort, ProjectStorePort, StoreError};
use ap_core::project::{GeneratorKind, PostStatus, ProjectDraft, ProjectRecord};
use ap_core::security::SecretString;

pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(day: u32) -> Self {
        Self(Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap())
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// In-memory store that keeps the last saved snapshot.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub saved: Arc<Mutex<Vec<ProjectRecord>>>,
    pub save_calls: Arc<AtomicUsize>,
    pub rotate_calls: Arc<AtomicUsize>,
    pub fail_saves: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn with(records: Vec<ProjectRecord>) -> Self {
        let store = Self::default();
        *store.saved.lock().unwrap() = records;
        store
    }

    pub fn snapshot(&self) -> Vec<ProjectRecord> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectStorePort for MemoryStore {
    async fn load(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, records: &[ProjectRecord]) -> Result<(), StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io("disk full".into()));
        }
        *self.saved.lock().unwrap() = records.to_vec();
        Ok(())
    }

    async fn backup(&self) -> Result<PathBuf, StoreError> {
        Ok(PathBuf::from("/tmp/projects_backup_test.json"))
    }

    async fn rotate_key(&self) -> Result<(), StoreError> {
        self.rotate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn data_dir(&self) -> PathBuf {
        PathBuf::from("/tmp")
    }
}

pub fn draft(name: &str, keywords: &[&str]) -> ProjectDraft {
    ProjectDraft {
        name: name.into(),
        site_url: "https://site.test".into(),
        username: "editor".into(),
        app_password: SecretString::new("wp-pass"),
        category_id: 5,
        post_status: PostStatus::Draft,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        prompt_template: "Write about <keyword>".into(),
        generator_api_key: SecretString::new("gm-key"),
        generator_kind: GeneratorKind::Gemini,
    }
}

pub fn record(name: &str, keywords: &[&str]) -> ProjectRecord {
    ProjectRecord::create(draft(name, keywords), FixedClock::at(1).0).unwrap()
}
