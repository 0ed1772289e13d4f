use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::commands::{generate_command, generators_command, init_command, resolve_command};

#[derive(Parser, Debug)]
#[command(name = "bzlgen")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand. Set values override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Config file (defaults to the nearest .bzlgen.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Map references matching a glob to a fixed label
    #[arg(long = "label-mapping", global = true, value_name = "PATTERN=LABEL")]
    pub label_mapping: Vec<String>,

    /// Load a rule kind from a different module
    #[arg(long = "load-mapping", global = true, value_name = "KIND=MODULE")]
    pub load_mapping: Vec<String>,

    /// Name of the workspace external packages live in
    #[arg(long, global = true, value_name = "NAME")]
    pub npm_workspace_name: Option<String>,

    /// Ask bazel which rule owns an imported file
    #[arg(long, global = true)]
    pub use_bazel_query: bool,

    /// Name dependencies after files instead of their package default rule
    #[arg(long, global = true)]
    pub exact_labels: bool,

    /// Elide redundant `:target` suffixes in the output
    #[arg(long, global = true)]
    pub shorten_labels: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Commands)]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `command|target` lines for `buildozer -f`
    #[default]
    Commands,
    /// JSON batches of `{ commands, targets }`
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate buildozer commands for a file or directory
    #[command(visible_alias = "g")]
    Generate {
        /// Generator type, see `bzlgen generators`
        generator: String,

        /// Workspace-relative file or directory
        path: String,
    },
    /// Resolve references as seen from a file or directory
    #[command(visible_alias = "r")]
    Resolve {
        /// Workspace-relative file or directory the references appear in
        path: String,

        /// References to resolve
        #[arg(required = true)]
        references: Vec<String>,
    },
    /// List the available generators
    Generators,
    /// Write a default .bzlgen.json to the workspace root
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate { generator, path } => {
                generate_command(&self.options, &generator, &path)
            }
            Commands::Resolve { path, references } => {
                resolve_command(&self.options, &path, &references)
            }
            Commands::Generators => generators_command(self.options.output),
            Commands::Init { force } => init_command(&self.options, force),
        }
    }
}
