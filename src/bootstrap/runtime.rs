//! Application runtime: owns the wired dependencies and hands out use cases.

use ap_app::usecases::{ImportKeywords, RotateEncryptionKey, RunProject, TestConnections};
use ap_app::ProjectRepository;

use super::wiring::AppDeps;

pub struct AppRuntime {
    deps: AppDeps,
}

impl AppRuntime {
    pub fn new(deps: AppDeps) -> Self {
        Self { deps }
    }

    pub fn repo(&self) -> &ProjectRepository {
        &self.deps.repo
    }

    pub fn usecases(&self) -> UseCases<'_> {
        UseCases::new(self)
    }
}

/// Use case accessor for [`AppRuntime`].
///
/// Commands ask for a use case by name and never see which ports it needs.
pub struct UseCases<'a> {
    runtime: &'a AppRuntime,
}

impl<'a> UseCases<'a> {
    pub fn new(runtime: &'a AppRuntime) -> Self {
        Self { runtime }
    }

    /// Every run shares the runtime's registry, so two runs of the same
    /// project from one process conflict.
    pub fn run_project(&self) -> RunProject {
        let deps = &self.runtime.deps;
        RunProject::new(
            deps.repo.clone(),
            deps.factory.clone(),
            deps.registry.clone(),
            deps.config.pipeline.request_interval(),
        )
    }

    pub fn test_connections(&self) -> TestConnections {
        let deps = &self.runtime.deps;
        TestConnections::new(deps.repo.clone(), deps.factory.clone())
    }

    pub fn import_keywords(&self) -> ImportKeywords {
        ImportKeywords::new(self.runtime.deps.repo.clone())
    }

    pub fn rotate_encryption_key(&self) -> RotateEncryptionKey {
        RotateEncryptionKey::new(self.runtime.deps.repo.clone())
    }
}
