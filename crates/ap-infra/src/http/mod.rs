//! HTTP adapters for the two external collaborators.

mod factory;
mod gemini;
mod parse;
mod wordpress;

pub use factory::HttpCollaboratorFactory;
pub use gemini::GeminiGenerator;
pub use parse::{parse_article, plain_text_to_html};
pub use wordpress::WordPressPublisher;
