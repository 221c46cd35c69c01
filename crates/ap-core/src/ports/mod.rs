//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. This follows Hexagonal Architecture
//! principles, allowing the core business logic to remain independent of
//! external dependencies.
//!
//! ## Port Placement Guidelines
//!
//! Before adding a new port to `ap-core/ports`, ask yourself three questions:
//!
//! 1. **Does this port represent a business capability?**
//! 2. **Will it be depended upon by multiple use cases or domains?**
//! 3. **Is it implemented by the infrastructure layer?**
//!
//! If all three answers are **yes**, place it in `ap-core/ports`.
//! Otherwise, place it in the relevant domain module.

pub mod app_dirs;
mod clock;
pub mod collaborators;
pub mod content_generator;
pub mod errors;
pub mod progress;
pub mod project_store;
pub mod publisher;
pub mod security;

pub use app_dirs::AppDirsPort;
pub use clock::*;
pub use collaborators::{CollaboratorFactoryPort, CollaboratorSetupError};
pub use content_generator::{ContentGeneratorPort, GeneratedArticle, GenerationError};
pub use errors::{AppDirsError, StoreError};
pub use progress::{NoopProgressSink, ProgressSinkPort};
pub use project_store::ProjectStorePort;
pub use publisher::{Category, PublishError, PublishRequest, PublishedPost, PublisherPort};
pub use security::cipher::SecretCipherPort;
pub use security::key_material::KeyMaterialPort;
