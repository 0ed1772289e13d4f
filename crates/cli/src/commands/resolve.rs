use anyhow::{Context, Result};
use bzlgen_core::{Label, Resolver};
use std::io::Write;

use super::base_dir;
use crate::cli::GlobalOptions;
use crate::config::load_config;
use crate::display::format_resolutions;
use crate::utils::normalize_path_arg;

/// Print the label each reference resolves to, without generating rules
pub fn resolve_command(options: &GlobalOptions, path: &str, references: &[String]) -> Result<()> {
    let path = normalize_path_arg(path)?;
    let base_dir = base_dir(options)?;
    let config = load_config(options, &base_dir)?;
    Label::set_shorten_labels(config.shorten_labels.unwrap_or(false));

    let workspace = config.workspace(&base_dir, &path);
    let mut resolver = Resolver::new(workspace.clone(), config.resolver_config(&workspace)?)?;

    let mut resolutions = Vec::with_capacity(references.len());
    for reference in references {
        let label = resolver
            .resolve(reference)
            .with_context(|| format!("Failed to resolve {reference} from {path}"))?;
        resolutions.push((reference.clone(), label));
    }

    let output = format_resolutions(&resolutions, options.output)?;
    std::io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write resolutions")?;
    Ok(())
}
