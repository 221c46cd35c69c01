use std::sync::Arc;
use std::time::Duration;

use ap_core::config::{GeneratorConfig, PublisherConfig};
use ap_core::ports::{
    CollaboratorFactoryPort, CollaboratorSetupError, ContentGeneratorPort, PublisherPort,
};
use ap_core::project::{GeneratorKind, ProjectRecord};

use super::gemini::GeminiGenerator;
use super::wordpress::WordPressPublisher;

/// Builds HTTP-backed collaborators. Clients are created once and shared by
/// every project.
pub struct HttpCollaboratorFactory {
    generator_config: GeneratorConfig,
    generator_client: reqwest::Client,
    publisher_client: reqwest::Client,
}

impl HttpCollaboratorFactory {
    pub fn new(
        generator: &GeneratorConfig,
        publisher: &PublisherConfig,
    ) -> Result<Self, CollaboratorSetupError> {
        let generator_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(generator.timeout_secs))
            .build()
            .map_err(|e| CollaboratorSetupError::Client(e.to_string()))?;
        let publisher_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(publisher.timeout_secs))
            .user_agent(publisher.user_agent.clone())
            .build()
            .map_err(|e| CollaboratorSetupError::Client(e.to_string()))?;

        Ok(Self {
            generator_config: generator.clone(),
            generator_client,
            publisher_client,
        })
    }
}

impl CollaboratorFactoryPort for HttpCollaboratorFactory {
    fn generator(
        &self,
        project: &ProjectRecord,
    ) -> Result<Arc<dyn ContentGeneratorPort>, CollaboratorSetupError> {
        match project.generator_kind {
            GeneratorKind::Gemini => Ok(Arc::new(GeminiGenerator::new(
                self.generator_client.clone(),
                &self.generator_config,
                project.generator_api_key.clone(),
            ))),
        }
    }

    fn publisher(
        &self,
        project: &ProjectRecord,
    ) -> Result<Arc<dyn PublisherPort>, CollaboratorSetupError> {
        let url = reqwest::Url::parse(&project.site_url).map_err(|e| {
            CollaboratorSetupError::InvalidPublisher(format!("{}: {e}", project.site_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CollaboratorSetupError::InvalidPublisher(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        Ok(Arc::new(WordPressPublisher::new(
            self.publisher_client.clone(),
            &project.site_url,
            &project.username,
            project.app_password.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ap_core::project::{PostStatus, ProjectDraft};
    use ap_core::security::SecretString;
    use chrono::Utc;

    fn project(site_url: &str) -> ProjectRecord {
        let mut record = ProjectRecord::create(
            ProjectDraft {
                name: "n".into(),
                site_url: "https://site.test".into(),
                username: "u".into(),
                app_password: SecretString::new("p"),
                category_id: 1,
                post_status: PostStatus::Draft,
                keywords: vec!["k".into()],
                prompt_template: String::new(),
                generator_api_key: SecretString::new("k"),
                generator_kind: GeneratorKind::Gemini,
            },
            Utc::now(),
        )
        .unwrap();
        record.site_url = site_url.to_string();
        record
    }

    fn factory() -> HttpCollaboratorFactory {
        HttpCollaboratorFactory::new(&GeneratorConfig::default(), &PublisherConfig::default())
            .unwrap()
    }

    #[test]
    fn builds_both_collaborators_for_a_valid_project() {
        let factory = factory();
        let p = project("https://site.test");
        assert!(factory.generator(&p).is_ok());
        assert!(factory.publisher(&p).is_ok());
    }

    #[test]
    fn unparseable_site_url_is_a_setup_error() {
        let err = factory().publisher(&project("not a url")).err().unwrap();
        assert!(matches!(err, CollaboratorSetupError::InvalidPublisher(_)));
    }
}
