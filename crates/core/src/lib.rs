//! bzlgen - Generates buildozer commands that keep Bazel BUILD files in sync
//! with a source tree
//!
//! This crate provides functionality to:
//! - Parse and derive Bazel labels
//! - Resolve source references (relative imports, module specifiers, paths) to labels
//! - Model build rules and lower them into ordered, mergeable buildozer commands
//! - Run generators that produce rules for a file or directory
pub mod buildozer;
pub mod config;
pub mod error;
pub mod generators;
pub mod label;
pub mod resolver;
pub mod rule;
pub mod workspace;

// Re-export commonly used types and traits
pub use error::{Error, Result};

// Re-export main API components
pub use buildozer::{Buildozer, CommandBatch, LoadSites};
pub use config::Config;
pub use generators::{Generator, GeneratorContext, GeneratorRegistry, run_generator};
pub use label::Label;
pub use resolver::{ResolutionMode, Resolver, ResolverConfig};
pub use rule::{AttrValue, Rule};
pub use workspace::Workspace;
