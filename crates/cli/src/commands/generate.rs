use anyhow::{Context, Result};
use bzlgen_core::{GeneratorContext, GeneratorRegistry, Label, run_generator};
use std::io::Write;
use tracing::info;

use super::base_dir;
use crate::cli::GlobalOptions;
use crate::config::load_config;
use crate::display::format_buildozer;
use crate::utils::normalize_path_arg;

pub fn generate_command(options: &GlobalOptions, generator_type: &str, path: &str) -> Result<()> {
    let path = normalize_path_arg(path)?;
    let base_dir = base_dir(options)?;
    let config = load_config(options, &base_dir)?;
    Label::set_shorten_labels(config.shorten_labels.unwrap_or(false));

    let registry = GeneratorRegistry::with_defaults();
    let generator = registry.create(generator_type)?;

    let mut context = GeneratorContext::from_config(&config, &base_dir, &path)?;
    context.workspace().assert_bazel_workspace()?;

    run_generator(generator.as_ref(), &mut context)
        .with_context(|| format!("Failed to generate {generator_type} for {path}"))?;

    let buildozer = context.into_buildozer();
    info!("Generated {} commands", buildozer.to_commands().len());

    let output = format_buildozer(&buildozer, options.output)?;
    std::io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write commands")?;
    Ok(())
}
