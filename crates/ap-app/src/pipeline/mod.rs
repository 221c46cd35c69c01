mod registry;
mod runner;

pub use registry::{RunRegistry, RunToken};
pub use runner::Pipeline;
