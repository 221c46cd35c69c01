//! # Dependency Injection
//!
//! Creates the infra implementations and hands them to the application layer
//! behind their port traits. Assembly only: no decision about what a command
//! should do lives here.
//!
//! This is the only place allowed to depend on ap-infra and ap-app at once.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use ap_app::{ProjectRepository, RunRegistry};
use ap_core::ports::{AppDirsPort, ClockPort, CollaboratorFactoryPort, ProjectStorePort};
use ap_core::AppConfig;
use ap_infra::fs::DirsAppDirs;
use ap_infra::http::HttpCollaboratorFactory;
use ap_infra::store::FileProjectStore;
use ap_infra::SystemClock;

/// Everything the use cases need, already behind ports.
pub struct AppDeps {
    pub config: AppConfig,
    pub repo: Arc<ProjectRepository>,
    pub factory: Arc<dyn CollaboratorFactoryPort>,
    pub registry: RunRegistry,
}

/// Wire the store, repository and collaborator factory for `config`.
///
/// # Errors
///
/// Fails when no data directory is writable, the key file is corrupt, the
/// project document cannot be read, or the HTTP clients cannot be built.
pub async fn wire_dependencies(config: AppConfig) -> anyhow::Result<AppDeps> {
    let app_dirs = DirsAppDirs::from_config(&config.storage)
        .get_app_dirs()
        .context("Failed to resolve application directories")?;

    let store = FileProjectStore::open(&app_dirs.app_data_root, &app_dirs.fallback_root)
        .await
        .context("Failed to open project store")?;
    info!(path = %store.document_path().display(), "Project store opened");
    let store: Arc<dyn ProjectStorePort> = Arc::new(store);

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let repo = ProjectRepository::open(store, clock)
        .await
        .context("Failed to load projects")?;

    let factory = HttpCollaboratorFactory::new(&config.generator, &config.publisher)
        .context("Failed to build HTTP clients")?;

    Ok(AppDeps {
        config,
        repo: Arc::new(repo),
        factory: Arc::new(factory),
        registry: RunRegistry::new(),
    })
}
