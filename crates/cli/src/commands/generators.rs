use anyhow::Result;
use bzlgen_core::GeneratorRegistry;

use crate::cli::OutputFormat;
use crate::display::format_generators;

pub fn generators_command(format: OutputFormat) -> Result<()> {
    let registry = GeneratorRegistry::with_defaults();
    print!("{}", format_generators(&registry.list(), format)?);
    Ok(())
}
