mod document;
mod file_store;

pub use document::{ProjectRow, ProjectsDocument, DOCUMENT_VERSION};
pub use file_store::{FileProjectStore, DOCUMENT_FILE_NAME};
