//! # Pure Data Module - Configuration DTOs
//!
//! Holds the configuration structures and their defaults only. Loading the
//! file is done by the composition root; interpreting the values is done by
//! the adapters that receive them.

mod app_config;

pub use app_config::{AppConfig, GeneratorConfig, PipelineConfig, PublisherConfig, StorageConfig};
