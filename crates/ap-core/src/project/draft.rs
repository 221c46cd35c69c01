use serde::Deserialize;

use crate::security::SecretString;

use super::model::{GeneratorKind, PostStatus};
use super::prompt::DEFAULT_PROMPT_TEMPLATE;

/// Factory input for a new project record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub site_url: String,
    pub username: String,
    pub app_password: SecretString,
    pub category_id: u64,
    pub post_status: PostStatus,
    pub keywords: Vec<String>,
    pub prompt_template: String,
    pub generator_api_key: SecretString,
    pub generator_kind: GeneratorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("at least one keyword is required")]
    NoKeywords,

    #[error("keyword at position {0} is empty")]
    EmptyKeyword(usize),

    #[error("site URL must start with http:// or https://: {0}")]
    InvalidSiteUrl(String),

    #[error("unknown post status: {0}")]
    UnknownPostStatus(String),

    #[error("unknown generator kind: {0}")]
    UnknownGeneratorKind(String),
}

impl ProjectDraft {
    /// Trims every stored field, drops blank keywords and the trailing `/`
    /// of the site URL, and falls back to the default prompt template.
    pub fn normalized(self) -> Self {
        let prompt_template = if self.prompt_template.trim().is_empty() {
            DEFAULT_PROMPT_TEMPLATE.to_string()
        } else {
            self.prompt_template
        };

        Self {
            name: self.name.trim().to_string(),
            site_url: normalize_site_url(&self.site_url),
            username: self.username.trim().to_string(),
            app_password: SecretString::new(self.app_password.expose().trim()),
            keywords: self
                .keywords
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
            prompt_template,
            generator_api_key: SecretString::new(self.generator_api_key.expose().trim()),
            ..self
        }
    }

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
}

pub(crate) fn normalize_site_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

pub(crate) fn validate_fields(
    name: &str,
    site_url: &str,
    username: &str,
    app_password: &SecretString,
    generator_api_key: &SecretString,
    keywords: &[String],
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if site_url.trim().is_empty() {
        return Err(ValidationError::MissingField("site_url"));
    }
    if !(site_url.starts_with("http://") || site_url.starts_with("https://")) {
        return Err(ValidationError::InvalidSiteUrl(site_url.to_string()));
    }
    if username.trim().is_empty() {
        return Err(ValidationError::MissingField("username"));
    }
    if app_password.expose().trim().is_empty() {
        return Err(ValidationError::MissingField("app_password"));
    }
    if generator_api_key.expose().trim().is_empty() {
        return Err(ValidationError::MissingField("generator_api_key"));
    }
    if keywords.is_empty() {
        return Err(ValidationError::NoKeywords);
    }
    if let Some(pos) = keywords.iter().position(|k| k.trim().is_empty()) {
        return Err(ValidationError::EmptyKeyword(pos));
    }
    Ok(())
}

/// Draft as written by hand in a TOML or JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDraftFile {
    pub name: String,
    pub site_url: String,
    pub username: String,
    pub app_password: String,
    pub category_id: u64,
    #[serde(default)]
    pub post_status: PostStatus,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub prompt_template: String,
    pub generator_api_key: String,
    #[serde(default)]
    pub generator_kind: GeneratorKind,
}

impl From<ProjectDraftFile> for ProjectDraft {
    fn from(file: ProjectDraftFile) -> Self {
        Self {
            name: file.name,
            site_url: file.site_url,
            username: file.username,
            app_password: SecretString::from(file.app_password),
            category_id: file.category_id,
            post_status: file.post_status,
            keywords: file.keywords,
            prompt_template: file.prompt_template,
            generator_api_key: SecretString::from(file.generator_api_key),
            generator_kind: file.generator_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProjectDraft {
        ProjectDraft {
            name: "  Site  ".into(),
            site_url: " https://example.com/// ".into(),
            username: "admin".into(),
            app_password: SecretString::new("pw"),
            category_id: 3,
            post_status: PostStatus::Publish,
            keywords: vec![" a ".into(), "".into(), "b".into(), "a".into()],
            prompt_template: "".into(),
            generator_api_key: SecretString::new("key"),
            generator_kind: GeneratorKind::Gemini,
        }
    }

    #[test]
    fn normalized_trims_and_keeps_keyword_order_and_duplicates() {
        let d = draft().normalized();
        assert_eq!(d.name, "Site");
        assert_eq!(d.site_url, "https://example.com");
        assert_eq!(d.keywords, vec!["a", "b", "a"]);
        assert_eq!(d.prompt_template, DEFAULT_PROMPT_TEMPLATE);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let mut d = draft().normalized();
        d.username = String::new();
        assert_eq!(d.validate(), Err(ValidationError::MissingField("username")));

        let mut d = draft().normalized();
        d.app_password = SecretString::default();
        assert_eq!(d.validate(), Err(ValidationError::MissingField("app_password")));

        let mut d = draft().normalized();
        d.generator_api_key = SecretString::default();
        assert_eq!(
            d.validate(),
            Err(ValidationError::MissingField("generator_api_key"))
        );
    }

    #[test]
    fn validate_requires_keywords() {
        let mut d = draft().normalized();
        d.keywords.clear();
        assert_eq!(d.validate(), Err(ValidationError::NoKeywords));
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let mut d = draft().normalized();
        d.site_url = "ftp://example.com".into();
        assert!(matches!(d.validate(), Err(ValidationError::InvalidSiteUrl(_))));
    }

    #[test]
    fn draft_file_defaults_optional_fields() {
        let file: ProjectDraftFile = serde_json::from_str(
            r#"{
                "name": "n",
                "site_url": "https://x.test",
                "username": "u",
                "app_password": "p",
                "category_id": 1,
                "generator_api_key": "k"
            }"#,
        )
        .unwrap();

        let d = ProjectDraft::from(file);
        assert_eq!(d.post_status, PostStatus::Draft);
        assert_eq!(d.generator_kind, GeneratorKind::Gemini);
        assert!(d.keywords.is_empty());
    }
}
