use chrono::{DateTime, Utc};

use crate::security::SecretString;

use super::draft::{normalize_site_url, validate_fields, ValidationError};
use super::model::{GeneratorKind, PostStatus, ProjectRecord};

/// Typed partial update listing exactly the mutable fields of a project.
///
/// `id` and `created_at` are not representable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub site_url: Option<String>,
    pub username: Option<String>,
    pub app_password: Option<SecretString>,
    pub category_id: Option<u64>,
    pub post_status: Option<PostStatus>,
    pub keywords: Option<Vec<String>>,
    pub prompt_template: Option<String>,
    pub generator_api_key: Option<SecretString>,
    pub generator_kind: Option<GeneratorKind>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns the patched copy of `record`, validated, with `updated_at = now`.
    pub fn apply_to(
        self,
        record: &ProjectRecord,
        now: DateTime<Utc>,
    ) -> Result<ProjectRecord, ValidationError> {
        let mut next = record.clone();

        if let Some(name) = self.name {
            next.name = name.trim().to_string();
        }
        if let Some(url) = self.site_url {
            next.site_url = normalize_site_url(&url);
        }
        if let Some(username) = self.username {
            next.username = username.trim().to_string();
        }
        if let Some(password) = self.app_password {
            next.app_password = SecretString::new(password.expose().trim());
        }
        if let Some(category_id) = self.category_id {
            next.category_id = category_id;
        }
        if let Some(status) = self.post_status {
            next.post_status = status;
        }
        if let Some(keywords) = self.keywords {
            next.keywords = keywords
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(template) = self.prompt_template {
            next.prompt_template = template;
        }
        if let Some(key) = self.generator_api_key {
            next.generator_api_key = SecretString::new(key.expose().trim());
        }
        if let Some(kind) = self.generator_kind {
            next.generator_kind = kind;
        }

        validate_fields(
            &next.name,
            &next.site_url,
            &next.username,
            &next.app_password,
            &next.generator_api_key,
            &next.keywords,
        )?;

        next.updated_at = now;
        Ok(next)
    }
}
