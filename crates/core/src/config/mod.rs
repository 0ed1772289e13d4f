//! Configuration management for bzlgen

mod settings;
pub mod validation;

// Re-export main types
pub use settings::{
    CONFIG_FILE_NAME, Config, DEFAULT_SCSS_BINARY_SUFFIX, DEFAULT_SCSS_LIBRARY_SUFFIX, LabelMapping,
};
pub use validation::{ConfigValidator, MainConfigValidator};
