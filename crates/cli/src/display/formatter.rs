use anyhow::Result;
use bzlgen_core::{Buildozer, Label};
use serde::Serialize;

use crate::cli::OutputFormat;

#[derive(Serialize)]
struct Resolution<'a> {
    reference: &'a str,
    label: String,
}

#[derive(Serialize)]
struct GeneratorInfo<'a> {
    generator_type: &'a str,
    description: &'a str,
}

/// Flat `command|target` lines, or the batches as JSON
pub fn format_buildozer(buildozer: &Buildozer, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Commands => buildozer.to_command_file(),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&buildozer.to_command_batches())?;
            json.push('\n');
            json
        }
    })
}

/// `reference=label` lines
pub fn format_resolutions(resolutions: &[(String, Label)], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Commands => resolutions
            .iter()
            .map(|(reference, label)| format!("{reference}={label}\n"))
            .collect(),
        OutputFormat::Json => {
            let entries: Vec<_> = resolutions
                .iter()
                .map(|(reference, label)| Resolution {
                    reference,
                    label: label.to_string(),
                })
                .collect();
            let mut json = serde_json::to_string_pretty(&entries)?;
            json.push('\n');
            json
        }
    })
}

pub fn format_generators(generators: &[(&str, &str)], format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Commands => {
            let width = generators.iter().map(|(t, _)| t.len()).max().unwrap_or(0);
            generators
                .iter()
                .map(|(generator_type, description)| {
                    format!("{generator_type:<width$}  {description}\n")
                })
                .collect()
        }
        OutputFormat::Json => {
            let entries: Vec<_> = generators
                .iter()
                .map(|(generator_type, description)| GeneratorInfo {
                    generator_type,
                    description,
                })
                .collect();
            let mut json = serde_json::to_string_pretty(&entries)?;
            json.push('\n');
            json
        }
    })
}
