use anyhow::{Context, Result};
use bzlgen_core::config::{CONFIG_FILE_NAME, Config};
use tracing::info;

use super::base_dir;
use crate::cli::GlobalOptions;
use crate::config::cli_overrides;

/// Write `.bzlgen.json` to the workspace root, seeded from the command line flags
pub fn init_command(options: &GlobalOptions, force: bool) -> Result<()> {
    let base_dir = base_dir(options)?;
    let config_path = base_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        npm_workspace_name: Some("npm".to_string()),
        pkg_default_dep_labels: Some(true),
        use_bazel_query: Some(false),
        ..Default::default()
    }
    .merge_with(cli_overrides(options)?);

    config
        .save_validated(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    info!("Created config at {:?}", config_path);
    println!("Created config: {}", config_path.display());
    Ok(())
}
