mod project_repository;

pub use project_repository::ProjectRepository;
