//! # ap-core
//!
//! Core domain models and ports for Autopress.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod app_dirs;
pub mod config;
pub mod ids;
pub mod pipeline;
pub mod ports;
pub mod project;
pub mod security;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use ids::ProjectId;
pub use pipeline::{
    PipelineError, ProcessingOutcome, ProgressEvent, RunReport, RunState, RunSummary,
};
pub use project::{
    GeneratorKind, PostStatus, ProjectDraft, ProjectPatch, ProjectRecord, RepositoryError,
    ValidationError,
};
pub use security::{EncryptedBlob, EncryptionError, EncryptionKey, SecretString};
