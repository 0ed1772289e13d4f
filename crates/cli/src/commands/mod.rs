pub mod generate;
pub mod generators;
pub mod init;
pub mod resolve;

pub use generate::generate_command;
pub use generators::generators_command;
pub use init::init_command;
pub use resolve::resolve_command;

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::cli::GlobalOptions;

/// `--base-dir` or the current directory, made absolute
pub(crate) fn base_dir(options: &GlobalOptions) -> Result<PathBuf> {
    let base_dir = match &options.base_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };

    base_dir
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize base dir {}", base_dir.display()))
}
