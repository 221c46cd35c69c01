use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ap_core::ports::SecretCipherPort;
use ap_core::project::{GeneratorKind, PostStatus, ProjectRecord};
use ap_core::security::{EncryptionError, EncryptionKey, SecretString};
use ap_core::ProjectId;

pub const DOCUMENT_VERSION: &str = "1.0";

/// The whole persisted file.
///
/// Rows stay as raw JSON values until each one is decoded on its own, so one
/// malformed row never takes the rest of the document down with it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectsDocument {
    pub version: String,
    #[serde(default)]
    pub projects: Vec<serde_json::Value>,
}

/// One project as it sits on disk. Sensitive fields hold ciphertext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub website_url: String,
    pub username: String,
    pub app_password: String,
    pub category_id: u64,
    pub status: PostStatus,
    pub keywords: Vec<String>,
    pub prompt_template: String,
    pub ai_api_key: String,
    pub ai_provider_type: GeneratorKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRow {
    pub fn encode(
        record: &ProjectRecord,
        key: &EncryptionKey,
        cipher: &dyn SecretCipherPort,
    ) -> Result<Self, EncryptionError> {
        Ok(Self {
            id: record.id.as_str().to_string(),
            name: record.name.clone(),
            website_url: record.site_url.clone(),
            username: record.username.clone(),
            app_password: cipher.encrypt(key, record.app_password.expose())?,
            category_id: record.category_id,
            status: record.post_status,
            keywords: record.keywords.clone(),
            prompt_template: record.prompt_template.clone(),
            ai_api_key: cipher.encrypt(key, record.generator_api_key.expose())?,
            ai_provider_type: record.generator_kind,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn decode(
        &self,
        key: &EncryptionKey,
        cipher: &dyn SecretCipherPort,
    ) -> Result<ProjectRecord, EncryptionError> {
        let app_password = SecretString::new(cipher.decrypt(key, &self.app_password)?);
        let generator_api_key = SecretString::new(cipher.decrypt(key, &self.ai_api_key)?);

        Ok(ProjectRecord {
            id: ProjectId::from(self.id.as_str()),
            name: self.name.clone(),
            site_url: self.website_url.clone(),
            username: self.username.clone(),
            app_password,
            category_id: self.category_id,
            post_status: self.status,
            keywords: self.keywords.clone(),
            prompt_template: self.prompt_template.clone(),
            generator_api_key,
            generator_kind: self.ai_provider_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
