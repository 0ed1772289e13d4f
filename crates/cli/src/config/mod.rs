//! Config file loading and command line overrides

use anyhow::{Context, Result};
use bzlgen_core::config::{Config, LabelMapping};
use std::path::Path;
use tracing::debug;

use crate::cli::GlobalOptions;
use crate::utils::parse_key_value;

/// The file config (explicit `--config` or the nearest `.bzlgen.json`) with
/// command line flags layered on top
pub fn load_config(options: &GlobalOptions, base_dir: &Path) -> Result<Config> {
    let config_path = match &options.config {
        Some(path) => Some(path.clone()),
        None => Config::find_config_file(base_dir),
    };

    let file_config = match config_path {
        Some(path) => {
            debug!("Loading config from {:?}", path);
            Config::load_from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => Config::default(),
    };

    let config = file_config.merge_with(cli_overrides(options)?);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Config holding only what was set on the command line
pub fn cli_overrides(options: &GlobalOptions) -> Result<Config> {
    let mut config = Config::default();

    for mapping in &options.label_mapping {
        config.label_mapping.push(LabelMapping::parse(mapping)?);
    }

    for mapping in &options.load_mapping {
        let (kind, module) = parse_key_value(mapping, "load-mapping")?;
        config.load_mapping.insert(kind, module);
    }

    config.npm_workspace_name = options.npm_workspace_name.clone();
    if options.use_bazel_query {
        config.use_bazel_query = Some(true);
    }
    if options.exact_labels {
        config.pkg_default_dep_labels = Some(false);
    }
    if options.shorten_labels {
        config.shorten_labels = Some(true);
    }

    Ok(config)
}
