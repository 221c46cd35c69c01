//! Autopress
//!
//! Composition root and command-line surface over the ap-* crates.

pub mod bootstrap;
pub mod cli;
