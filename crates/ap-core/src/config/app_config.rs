//! Application configuration domain model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub pipeline: PipelineConfig,
    pub generator: GeneratorConfig,
    pub publisher: PublisherConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Primary data directory. `None` means the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Used when the primary directory is not writable. `None` means the system temp dir.
    pub fallback_dir: Option<PathBuf>,
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pause between two consecutive keywords.
    pub request_interval_secs: u64,
}

impl PipelineConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_secs(self.request_interval_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_interval_secs: 5,
        }
    }
}

/// Content generation service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Publishing service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("autopress/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
