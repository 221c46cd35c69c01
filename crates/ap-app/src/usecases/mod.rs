//! Business logic use cases driven by the CLI.
//!
//! Plain CRUD goes straight to [`crate::ProjectRepository`]; anything that
//! combines the repository with collaborators or the run guard lives here.

pub mod import_keywords;
pub mod rotate_encryption_key;
pub mod run_project;
pub mod test_connections;

pub use import_keywords::ImportKeywords;
pub use rotate_encryption_key::RotateEncryptionKey;
pub use run_project::RunProject;
pub use test_connections::{ConnectionCheck, ConnectionReport, TestConnections};
