//! Asking the build graph which rule owns a file
//!
//! Best effort only: any failure is reported as an error for the caller to
//! log and fall back from.

use crate::error::{Error, Result};
use crate::label::Label;
use crate::workspace::{file_name, parent_dir};
use std::path::PathBuf;
use std::process::Command;

/// Finds the rule that lists a workspace-relative file in its sources
pub trait LabelQuery {
    fn owning_rule(&self, file: &str) -> Result<Option<Label>>;
}

/// Runs `bazel query` in the workspace root
#[derive(Debug, Clone)]
pub struct BazelQuery {
    binary: String,
    base_dir: PathBuf,
}

impl BazelQuery {
    const QUERY_FLAGS: [&'static str; 3] = ["--output", "label", "--order_output=no"];

    pub fn new(binary: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Rules with `file` in either `src` or `srcs`
    pub fn query_expression(file: &str) -> String {
        let label = format!("//{}:{}", parent_dir(file), file_name(file));
        format!("attr('src', {label}, //...) + attr('srcs', {label}, //...)")
    }
}

impl LabelQuery for BazelQuery {
    fn owning_rule(&self, file: &str) -> Result<Option<Label>> {
        let expression = Self::query_expression(file);
        tracing::debug!("Query for containing rule for file {}: {}", file, expression);

        let output = Command::new(&self.binary)
            .arg("query")
            .args(Self::QUERY_FLAGS)
            .arg(&expression)
            .current_dir(&self.base_dir)
            .output()
            .map_err(|e| Error::QueryToolFailure(format!("failed to run {}: {e}", self.binary)))?;

        if !output.status.success() {
            return Err(Error::QueryToolFailure(format!(
                "{} query exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.lines().map(str::trim).find(|line| !line.is_empty()) {
            Some(line) => Label::parse_absolute(line).map(Some),
            None => Ok(None),
        }
    }
}
