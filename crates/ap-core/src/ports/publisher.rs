use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::project::PostStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub title: String,
    pub body: String,
    pub slug: String,
    pub category_id: u64,
    pub status: PostStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub post_id: u64,
    pub post_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum PublishError {
    /// Any non-2xx answer, carrying the upstream status and body.
    #[error("HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid publisher response: {0}")]
    InvalidResponse(String),
}

/// Submits finished articles to the publishing service.
#[async_trait]
pub trait PublisherPort: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishedPost, PublishError>;

    async fn test_connection(&self) -> Result<(), PublishError>;

    async fn list_categories(&self) -> Result<Vec<Category>, PublishError>;
}
