//! Bazel labels
//!
//! A label is always absolute: `[@workspace]//package[:target]`. When the
//! target is omitted it defaults to the last segment of the package.

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

pub const WORKSPACE_MARKER: &str = "@";
pub const PKG_ROOT_MARKER: &str = "//";
pub const PKG_SEP: char = '/';
pub const TARGET_ROOT_MARKER: &str = ":";

/// Pseudo target that addresses a package rather than a rule in it
pub const PKG_TARGET: &str = "__pkg__";

static SHORTEN_LABELS: AtomicBool = AtomicBool::new(false);

/// An absolute Bazel label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    workspace: String,
    package: String,
    target: String,
}

impl Label {
    /// Toggle eliding `:target` from `Display` output when it matches the package name
    pub fn set_shorten_labels(enabled: bool) {
        SHORTEN_LABELS.store(enabled, AtomicOrdering::Relaxed);
    }

    pub fn shorten_labels() -> bool {
        SHORTEN_LABELS.load(AtomicOrdering::Relaxed)
    }

    pub fn is_absolute(label: &str) -> bool {
        label.starts_with(PKG_ROOT_MARKER) || label.starts_with(WORKSPACE_MARKER)
    }

    /// Parse an absolute label string
    pub fn parse_absolute(label: &str) -> Result<Self> {
        if !Self::is_absolute(label) {
            return Err(Error::invalid_label(label, "label is not absolute"));
        }

        let has_workspace = label.starts_with(WORKSPACE_MARKER);
        let Some(workspace_end) = label.find(PKG_ROOT_MARKER) else {
            let reason = if label.contains(TARGET_ROOT_MARKER) {
                "workspace and target present without a package root marker"
            } else {
                "missing package root marker"
            };
            return Err(Error::invalid_label(label, reason));
        };

        let workspace = if has_workspace {
            &label[WORKSPACE_MARKER.len()..workspace_end]
        } else {
            ""
        };

        if workspace.contains(TARGET_ROOT_MARKER) {
            return Err(Error::invalid_label(label, "target marker inside workspace name"));
        }

        let rest = &label[workspace_end + PKG_ROOT_MARKER.len()..];
        let (package, target) = match rest.find(TARGET_ROOT_MARKER) {
            Some(idx) => (&rest[..idx], &rest[idx + TARGET_ROOT_MARKER.len()..]),
            None => (rest, last_segment(rest)),
        };

        if target.is_empty() {
            return Err(Error::invalid_label(label, "empty target"));
        }

        Ok(Self {
            workspace: workspace.to_string(),
            package: package.to_string(),
            target: target.to_string(),
        })
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Workspace prefixed with `@`, or an empty string for the current workspace
    pub fn workspace_with_marker(&self) -> String {
        if self.workspace.is_empty() {
            String::new()
        } else {
            format!("{WORKSPACE_MARKER}{}", self.workspace)
        }
    }

    pub fn package_with_marker(&self) -> String {
        format!("{PKG_ROOT_MARKER}{}", self.package)
    }

    pub fn target_with_marker(&self) -> String {
        format!("{TARGET_ROOT_MARKER}{}", self.target)
    }

    /// Derive a label in the same workspace and package with a different target.
    /// The result goes through the same validation as a freshly parsed label.
    pub fn with_target(&self, target: &str) -> Result<Self> {
        Self::parse_absolute(&format!(
            "{}{}{TARGET_ROOT_MARKER}{target}",
            self.workspace_with_marker(),
            self.package_with_marker()
        ))
    }

    /// The package's default rule, whose target is the last package segment
    pub fn as_default_label(&self) -> Result<Self> {
        self.with_target(last_segment(&self.package))
    }

    /// The `__pkg__` location used when mutating the package itself
    pub fn package_label(&self) -> Self {
        Self {
            workspace: self.workspace.clone(),
            package: self.package.clone(),
            target: PKG_TARGET.to_string(),
        }
    }

    pub fn is_default_target(&self) -> bool {
        !self.package.is_empty() && last_segment(&self.package) == self.target
    }

    /// Render the label, optionally eliding a redundant `:target`
    pub fn format(&self, shorten: bool) -> String {
        let mut out = self.workspace_with_marker();
        out.push_str(&self.package_with_marker());
        if !(shorten && self.is_default_target()) {
            out.push_str(&self.target_with_marker());
        }
        out
    }

    /// Unshortened form, stable regardless of the global shortening switch
    pub fn canonical(&self) -> String {
        self.format(false)
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit(PKG_SEP).next().unwrap_or(path)
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(Self::shorten_labels()))
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_absolute(s)
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().cmp(&other.canonical())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.to_string()
    }
}

impl From<&Label> for String {
    fn from(label: &Label) -> Self {
        label.to_string()
    }
}
