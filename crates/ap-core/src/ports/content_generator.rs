use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArticle {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("empty response from generation service")]
    EmptyResponse,

    #[error("generation service returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("generation request failed: {0}")]
    Transport(String),

    #[error("invalid generation response: {0}")]
    InvalidResponse(String),
}

/// Turns a filled prompt into an article.
#[async_trait]
pub trait ContentGeneratorPort: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedArticle, GenerationError>;

    async fn test_connection(&self) -> Result<(), GenerationError>;
}
