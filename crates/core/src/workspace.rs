//! Path context for a single generation run
//!
//! All workspace-relative paths use `/` separators, the same way Bazel
//! packages and module specifiers do.

use crate::error::{Error, Result};
use crate::label::Label;
use globset::Glob;
use heck::ToKebabCase;
use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BUILD_FILE_NAME: &str = "BUILD";
pub const DEFAULT_SUFFIX_SEPARATOR: &str = "-";

/// The workspace root plus the file or directory being generated for
#[derive(Debug, Clone)]
pub struct Workspace {
    base_dir: PathBuf,
    path: String,
    build_file_name: String,
    suffix_separator: String,
    pattern: Option<String>,
    listing: OnceCell<Vec<String>>,
}

impl Workspace {
    pub fn new(base_dir: impl Into<PathBuf>, path: &str) -> Self {
        Self {
            base_dir: base_dir.into(),
            path: normalize_path(path),
            build_file_name: DEFAULT_BUILD_FILE_NAME.to_string(),
            suffix_separator: DEFAULT_SUFFIX_SEPARATOR.to_string(),
            pattern: None,
            listing: OnceCell::new(),
        }
    }

    pub fn with_build_file_name(mut self, name: impl Into<String>) -> Self {
        self.build_file_name = name.into();
        self
    }

    pub fn with_suffix_separator(mut self, separator: impl Into<String>) -> Self {
        self.suffix_separator = separator.into();
        self
    }

    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The workspace-relative path this run generates for
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn build_file_name(&self) -> &str {
        &self.build_file_name
    }

    pub fn absolute_path(&self) -> PathBuf {
        self.base_dir.join(&self.path)
    }

    pub fn is_directory(&self) -> bool {
        self.absolute_path().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.absolute_path().is_file()
    }

    /// The directory containing `path` when it is a file, otherwise `path` itself
    pub fn path_as_directory(&self) -> String {
        if self.is_file() {
            parent_dir(&self.path).to_string()
        } else {
            self.path.clone()
        }
    }

    /// Tests whether `path` is rooted at the workspace, i.e. its first segment
    /// names an entry in the workspace root
    pub fn is_workspace_relative(&self, path: &str) -> bool {
        let first = path
            .split('/')
            .find(|segment| !segment.is_empty() && *segment != ".");
        match first {
            None | Some("..") => false,
            Some(first) => self.root_listing().iter().any(|entry| entry == first),
        }
    }

    fn root_listing(&self) -> &[String] {
        self.listing.get_or_init(|| match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
                .collect(),
            Err(e) => {
                tracing::debug!("Unable to list workspace root {:?}: {}", self.base_dir, e);
                Vec::new()
            }
        })
    }

    /// Resolve `path` to a normalized path rooted at the workspace.
    /// Paths that are not already workspace relative are taken relative to
    /// the directory being generated for.
    pub fn resolve_relative_to_workspace(&self, path: &str) -> String {
        if self.is_workspace_relative(path) {
            return normalize_path(path);
        }
        normalize_path(&join_path(&self.path_as_directory(), path))
    }

    pub fn resolve_absolute(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            return PathBuf::from(path);
        }
        self.base_dir.join(self.resolve_relative_to_workspace(path))
    }

    /// Workspace-relative files in `path` when it is a directory, sorted, with
    /// build files excluded and the optional glob pattern applied
    pub fn read_directory(&self) -> Result<Vec<String>> {
        if !self.is_directory() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(self.absolute_path())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name == self.build_file_name {
                continue;
            }
            files.push(join_path(&self.path, &name));
        }
        files.sort();

        if let Some(pattern) = &self.pattern {
            let matcher = Glob::new(&join_path(&self.path, pattern))?.compile_matcher();
            files.retain(|file| matcher.is_match(file));
        }

        Ok(files)
    }

    /// Reads a file given relative to the workspace or to `path`
    pub fn read_file(&self, path: &str) -> Result<String> {
        Ok(fs::read_to_string(self.resolve_absolute(path))?)
    }

    pub fn build_file_path(&self) -> PathBuf {
        self.base_dir
            .join(self.path_as_directory())
            .join(&self.build_file_name)
    }

    pub fn has_build_file(&self) -> bool {
        self.build_file_path().is_file()
    }

    /// Checks that the base dir holds a root build file and a `WORKSPACE` file
    pub fn assert_bazel_workspace(&self) -> Result<()> {
        let message = format!(
            "The workspace at {} does not appear to be a bazel workspace.",
            self.base_dir.display()
        );

        for name in [self.build_file_name.as_str(), "WORKSPACE"] {
            let file = self.base_dir.join(name);
            if !file.exists() {
                return Err(Error::ConfigError(format!("{message} Missing {name} file")));
            }
            if !file.is_file() {
                return Err(Error::ConfigError(format!("{message} {name} is not a file")));
            }
        }

        Ok(())
    }

    /// Label for the default target of the package at `path`
    pub fn label_for_path(&self) -> Result<Label> {
        self.label_for(&self.path, None)
    }

    /// Label for the package containing `path`. A file is considered part of
    /// its directory's package.
    pub fn label_for(&self, path: &str, target: Option<&str>) -> Result<Label> {
        let path = self.resolve_relative_to_workspace(path);
        let package = if self.base_dir.join(&path).is_file() {
            parent_dir(&path)
        } else {
            path.as_str()
        };

        match target {
            Some(target) => Label::parse_absolute(&format!("//{package}:{target}")),
            None => Label::parse_absolute(&format!("//{package}")),
        }
    }

    /// Best guess label for the rule that `file` belongs to
    pub fn label_for_file(&self, file: &str, suffix: Option<&str>) -> Result<Label> {
        let file = self.resolve_relative_to_workspace(file);
        let name = self.rule_name_for_file(&file, suffix);
        Label::parse_absolute(&format!("//{}:{}", parent_dir(&file), name))
    }

    /// Label naming the file itself, which may cross a package boundary
    pub fn file_label(&self, file: &str) -> Result<Label> {
        let file = self.resolve_relative_to_workspace(file);
        Label::parse_absolute(&format!("//{}:{}", parent_dir(&file), file_name(&file)))
    }

    /// Kebab-cased file stem joined with the suffix separator, eg
    /// `foo.component.scss` + `theme` = `foo-component-theme`
    pub fn rule_name_for_file(&self, file: &str, suffix: Option<&str>) -> String {
        let stem = Path::new(file_name(file))
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let mut name = stem.to_kebab_case();
        if self.suffix_separator != "-" {
            name = name.replace('-', &self.suffix_separator);
        }
        if let Some(suffix) = suffix {
            name = format!("{name}{}{suffix}", self.suffix_separator);
        }
        name
    }
}

/// Fold `.` and `..` segments and redundant separators. `..` never escapes
/// above the root.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

pub fn join_path(base: &str, path: &str) -> String {
    if base.is_empty() {
        path.to_string()
    } else {
        format!("{base}/{path}")
    }
}

pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[..idx]).unwrap_or("")
}

pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
