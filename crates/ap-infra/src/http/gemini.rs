use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use ap_core::config::GeneratorConfig;
use ap_core::ports::{ContentGeneratorPort, GeneratedArticle, GenerationError};
use ap_core::security::SecretString;

use super::parse::parse_article;

const FORMAT_INSTRUCTIONS: &str = "Please provide your response in the following format:
TITLE: [Create an engaging, SEO-friendly title]
CONTENT: [Write the full article content with proper HTML formatting including headings, paragraphs, and structure]

Make sure to:
- Use H2 tags for main headings
- Include the keyword naturally throughout the content
- Write in a conversational, engaging tone
- Provide valuable, actionable information
- Include an introduction and conclusion";

const CONNECTION_PROBE_PROMPT: &str = "Write a short test message to verify API connection.";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl GeminiGenerator {
    pub fn new(client: reqwest::Client, config: &GeneratorConfig, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// One round trip; returns the concatenated text of the first candidate.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(transport_message(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timeout".to_string()
    } else if err.is_connect() {
        format!("connection error: {err}")
    } else {
        err.to_string()
    }
}

#[async_trait]
impl ContentGeneratorPort for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<GeneratedArticle, GenerationError> {
        let enhanced = format!("{prompt}\n\n{FORMAT_INSTRUCTIONS}\n");
        debug!(model = %self.model, "Generating content");

        let text = self.complete(&enhanced).await.map_err(|err| {
            error!(error = %err, "Content generation failed");
            err
        })?;

        let article = parse_article(&text);
        info!(title = %article.title, "Content generated");
        Ok(article)
    }

    async fn test_connection(&self) -> Result<(), GenerationError> {
        self.complete(CONNECTION_PROBE_PROMPT).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn generator(base_url: String) -> GeminiGenerator {
        let config = GeneratorConfig {
            base_url,
            ..GeneratorConfig::default()
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        GeminiGenerator::new(client, &config, SecretString::new("gm-key"))
    }

    fn answer(text: &str) -> String {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn generate_posts_prompt_and_parses_article() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .match_header("x-goog-api-key", "gm-key")
            .match_body(Matcher::Regex("best espresso".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(answer("TITLE: Espresso\nCONTENT: <p>Body.</p>"))
            .create_async()
            .await;

        let article = generator(server.url())
            .generate("Write about best espresso")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(article.title, "Espresso");
        assert_eq!(article.body, "<p>Body.</p>");
    }

    #[tokio::test]
    async fn empty_text_is_empty_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let err = generator(server.url()).generate("x").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(403)
            .with_body("API key not valid")
            .create_async()
            .await;

        match generator(server.url()).generate("x").await.unwrap_err() {
            GenerationError::Upstream { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_connection_succeeds_on_any_text() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_body(answer("Hello"))
            .create_async()
            .await;

        generator(server.url()).test_connection().await.unwrap();
    }
}
