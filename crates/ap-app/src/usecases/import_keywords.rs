use std::sync::Arc;
use tracing::info;

use ap_core::project::{parse_keywords, KeywordFormat, ProjectPatch, RepositoryError};
use ap_core::ProjectId;

use crate::repository::ProjectRepository;

/// Append (or replace with) keywords parsed from a text or CSV payload.
pub struct ImportKeywords {
    repo: Arc<ProjectRepository>,
}

impl ImportKeywords {
    pub fn new(repo: Arc<ProjectRepository>) -> Self {
        Self { repo }
    }

    /// Returns how many keywords were imported.
    #[tracing::instrument(
        name = "usecase.import_keywords.execute",
        skip(self, text),
        fields(project_id = %project_id)
    )]
    pub async fn execute(
        &self,
        project_id: &ProjectId,
        text: &str,
        format: KeywordFormat,
        replace: bool,
    ) -> Result<usize, RepositoryError> {
        let project = self
            .repo
            .get(project_id)
            .await
            .ok_or_else(|| RepositoryError::NotFound(project_id.clone()))?;

        let imported = parse_keywords(text, format);
        let count = imported.len();

        let keywords = if replace {
            imported
        } else {
            let mut keywords = project.keywords;
            keywords.extend(imported);
            keywords
        };

        self.repo
            .patch(
                project_id,
                ProjectPatch {
                    keywords: Some(keywords),
                    ..Default::default()
                },
            )
            .await?;

        info!(count, replace, "Imported keywords");
        Ok(count)
    }
}
