//! Application layer: the project repository, the batch pipeline and the
//! use cases the CLI drives.

pub mod pipeline;
pub mod repository;
pub mod usecases;

#[cfg(test)]
pub(crate) mod test_support;

pub use pipeline::{Pipeline, RunRegistry, RunToken};
pub use repository::ProjectRepository;
