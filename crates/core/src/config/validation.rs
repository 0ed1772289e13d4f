//! Configuration validation, run before a config is used or saved

use crate::{
    config::{Config, LabelMapping},
    error::{Error, Result},
    label::Label,
    resolver::StaticMappings,
};

/// Trait for validating configurations
pub trait ConfigValidator {
    fn validate(&self, config: &Config) -> Result<()>;

    fn validate_label_mapping(&self, mapping: &LabelMapping) -> Result<()>;
}

/// Checks labels parse, globs compile and the scalar settings are usable
#[derive(Debug, Default)]
pub struct MainConfigValidator;

impl MainConfigValidator {
    pub fn new() -> Self {
        Self
    }

    fn require_label(field: &str, label: &str) -> Result<()> {
        Label::parse_absolute(label)
            .map(|_| ())
            .map_err(|e| Error::ConfigError(format!("{field}: {e}")))
    }

    fn require_non_empty(field: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) if value.trim().is_empty() => {
                Err(Error::ConfigError(format!("{field} must not be empty")))
            }
            _ => Ok(()),
        }
    }
}

impl ConfigValidator for MainConfigValidator {
    fn validate(&self, config: &Config) -> Result<()> {
        for mapping in &config.label_mapping {
            self.validate_label_mapping(mapping)?;
        }

        for (name, label) in &config.builtin_mapping {
            Self::require_label(&format!("builtin_mapping.{name}"), label)?;
        }

        for (kind, site) in &config.load_mapping {
            Self::require_non_empty(&format!("load_mapping.{kind}"), Some(site.as_str()))?;
        }

        for label in config.default_visibility() {
            Self::require_label("default_visibility", label)?;
        }

        if let Some(label) = &config.ts_config_label {
            Self::require_label("ts_config_label", label)?;
        }

        Self::require_non_empty("npm_workspace_name", config.npm_workspace_name.as_deref())?;
        Self::require_non_empty("bazel_binary", config.bazel_binary.as_deref())?;
        Self::require_non_empty("build_file_name", config.build_file_name.as_deref())?;
        Self::require_non_empty("suffix_separator", config.suffix_separator.as_deref())?;
        Self::require_non_empty("scss_library_suffix", config.scss_library_suffix.as_deref())?;
        Self::require_non_empty("scss_binary_suffix", config.scss_binary_suffix.as_deref())?;

        if config.query_cache_size == Some(0) {
            return Err(Error::ConfigError(
                "query_cache_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_label_mapping(&self, mapping: &LabelMapping) -> Result<()> {
        StaticMappings::new([(&mapping.pattern, &mapping.label)])
            .map(|_| ())
            .map_err(|e| {
                Error::ConfigError(format!(
                    "label_mapping {}={}: {e}",
                    mapping.pattern, mapping.label
                ))
            })
    }
}

impl Config {
    /// Validate this configuration
    pub fn validate(&self) -> Result<()> {
        MainConfigValidator::new().validate(self)
    }

    /// Save with validation
    pub fn save_validated(&self, path: &std::path::Path) -> Result<()> {
        self.validate()?;
        self.save_to_file(path)
    }
}
