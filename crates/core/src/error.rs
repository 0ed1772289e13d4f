use std::io;

/// Errors that can occur during label resolution and BUILD file generation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Label '{label}' is not valid: {reason}")]
    InvalidLabelError { label: String, reason: String },

    #[error("Unable to generate label for: {reference}")]
    UnresolvableReferenceError { reference: String },

    #[error("Query error: {0}")]
    QueryToolFailure(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Glob error: {0}")]
    GlobError(#[from] globset::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("No generator found for type {0}")]
    UnknownGenerator(String),

    #[error("Generator error: {0}")]
    GeneratorError(String),
}

impl Error {
    pub(crate) fn invalid_label(label: &str, reason: impl Into<String>) -> Self {
        Error::InvalidLabelError {
            label: label.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolvable(reference: &str) -> Self {
        Error::UnresolvableReferenceError {
            reference: reference.to_string(),
        }
    }
}

/// Result type alias for bzlgen operations
pub type Result<T> = std::result::Result<T, Error>;
