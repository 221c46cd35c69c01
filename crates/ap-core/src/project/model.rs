use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ids::ProjectId;
use crate::security::SecretString;

use super::draft::{validate_fields, ProjectDraft, ValidationError};

/// Publication status requested for every post of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Publish,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Publish => "publish",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "publish" => Ok(PostStatus::Publish),
            other => Err(ValidationError::UnknownPostStatus(other.to_string())),
        }
    }
}

/// Which content generation service a project is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    #[default]
    Gemini,
}

impl GeneratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(GeneratorKind::Gemini),
            other => Err(ValidationError::UnknownGeneratorKind(other.to_string())),
        }
    }
}

/// A saved site/credential/keyword-batch/prompt combination.
///
/// The record deliberately has no `Serialize` impl: the store maps it to its
/// on-disk row and encrypts `app_password` and `generator_api_key` on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    pub site_url: String,
    pub username: String,
    pub app_password: SecretString,
    pub category_id: u64,
    pub post_status: PostStatus,
    /// Processing order. Duplicates are allowed.
    pub keywords: Vec<String>,
    pub prompt_template: String,
    pub generator_api_key: SecretString,
    pub generator_kind: GeneratorKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// Factory: validates the draft and assigns `id`, `created_at` and `updated_at`.
    pub fn create(draft: ProjectDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let draft = draft.normalized();
        draft.validate()?;

        Ok(Self {
            id: ProjectId::new(),
            name: draft.name,
            site_url: draft.site_url,
            username: draft.username,
            app_password: draft.app_password,
            category_id: draft.category_id,
            post_status: draft.post_status,
            keywords: draft.keywords,
            prompt_template: draft.prompt_template,
            generator_api_key: draft.generator_api_key,
            generator_kind: draft.generator_kind,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whole-record replacement that keeps identity and creation time.
    pub fn replaced_by(&self, mut next: ProjectRecord, now: DateTime<Utc>) -> ProjectRecord {
        next.id = self.id.clone();
        next.created_at = self.created_at;
        next.updated_at = now;
        next
    }

    /// Same field rules a draft or patch must pass.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(
            &self.name,
            &self.site_url,
            &self.username,
            &self.app_password,
            &self.generator_api_key,
            &self.keywords,
        )
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}
