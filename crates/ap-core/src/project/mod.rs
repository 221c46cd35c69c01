//! Project configuration domain: the record, its factory input, its patch
//! type and the pure helpers the pipeline derives from it.

pub mod draft;
mod error;
pub mod keywords;
pub mod model;
pub mod patch;
pub mod prompt;
pub mod slug;

pub use draft::{ProjectDraft, ProjectDraftFile, ValidationError};
pub use error::RepositoryError;
pub use keywords::{parse_keywords, KeywordFormat};
pub use model::{GeneratorKind, PostStatus, ProjectRecord};
pub use patch::ProjectPatch;
pub use prompt::{fill_prompt, DEFAULT_PROMPT_TEMPLATE, KEYWORD_PLACEHOLDER};
pub use slug::slugify;
