use crate::{
    buildozer::LoadSites,
    error::{Error, Result},
    resolver::{
        DEFAULT_BAZEL_BINARY, DEFAULT_EXTERNAL_WORKSPACE, DEFAULT_QUERY_CACHE_SIZE, PathAliases,
        ResolutionMode, ResolverConfig,
    },
    workspace::{DEFAULT_BUILD_FILE_NAME, DEFAULT_SUFFIX_SEPARATOR, Workspace},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".bzlgen.json";
pub const DEFAULT_SCSS_LIBRARY_SUFFIX: &str = "scss_library";
pub const DEFAULT_SCSS_BINARY_SUFFIX: &str = "scss";

/// A glob over workspace-relative paths or module specifiers and the label
/// that satisfies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMapping {
    pub pattern: String,
    pub label: String,
}

impl LabelMapping {
    pub fn new(pattern: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            label: label.into(),
        }
    }

    /// Parse the `pattern=label` form used on the command line
    pub fn parse(mapping: &str) -> Result<Self> {
        match mapping.split_once('=') {
            Some((pattern, label)) if !pattern.is_empty() && !label.is_empty() => {
                Ok(Self::new(pattern.trim(), label.trim()))
            }
            _ => Err(Error::ConfigError(format!(
                "Invalid label mapping '{mapping}', expected PATTERN=LABEL"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    // Resolution
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_mapping: Vec<LabelMapping>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub builtin_mapping: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm_workspace_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkg_default_dep_labels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_bazel_query: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bazel_binary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_cache_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose_import_mappings: Option<bool>,

    // Generation
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub load_mapping: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix_separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_visibility: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_config_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scss_library_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scss_binary_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shorten_labels: Option<bool>,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Walk up from `start_path` looking for `.bzlgen.json`
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }

            current = current.parent()?;
        }
    }

    /// Layer `other` on top of `self`. Set fields of `other` win, label
    /// mappings are appended after ours and load mappings are overlaid.
    pub fn merge_with(mut self, other: Config) -> Self {
        self.label_mapping.extend(other.label_mapping);
        self.builtin_mapping.extend(other.builtin_mapping);
        self.load_mapping.extend(other.load_mapping);

        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }

        overlay!(
            npm_workspace_name,
            pkg_default_dep_labels,
            use_bazel_query,
            bazel_binary,
            query_cache_size,
            ts_config,
            verbose_import_mappings,
            build_file_name,
            suffix_separator,
            default_visibility,
            ts_config_label,
            pattern,
            scss_library_suffix,
            scss_binary_suffix,
            shorten_labels,
        );

        self
    }

    pub fn npm_workspace_name(&self) -> &str {
        self.npm_workspace_name
            .as_deref()
            .unwrap_or(DEFAULT_EXTERNAL_WORKSPACE)
    }

    pub fn resolution_mode(&self) -> ResolutionMode {
        if self.pkg_default_dep_labels.unwrap_or(true) {
            ResolutionMode::PackageDefault
        } else {
            ResolutionMode::Exact
        }
    }

    pub fn default_visibility(&self) -> &[String] {
        self.default_visibility.as_deref().unwrap_or_default()
    }

    /// `(library, binary)` suffixes appended to sass rule names
    pub fn scss_suffixes(&self) -> (&str, &str) {
        (
            self.scss_library_suffix
                .as_deref()
                .unwrap_or(DEFAULT_SCSS_LIBRARY_SUFFIX),
            self.scss_binary_suffix
                .as_deref()
                .unwrap_or(DEFAULT_SCSS_BINARY_SUFFIX),
        )
    }

    /// Workspace for generating `path`, with this config's build file name,
    /// suffix separator and listing pattern
    pub fn workspace(&self, base_dir: impl Into<PathBuf>, path: &str) -> Workspace {
        Workspace::new(base_dir, path)
            .with_build_file_name(
                self.build_file_name
                    .as_deref()
                    .unwrap_or(DEFAULT_BUILD_FILE_NAME),
            )
            .with_suffix_separator(
                self.suffix_separator
                    .as_deref()
                    .unwrap_or(DEFAULT_SUFFIX_SEPARATOR),
            )
            .with_pattern(self.pattern.clone())
    }

    /// Resolver settings, reading path aliases from `ts_config` when set
    pub fn resolver_config(&self, workspace: &Workspace) -> Result<ResolverConfig> {
        let path_aliases = match &self.ts_config {
            Some(ts_config) => PathAliases::from_tsconfig(workspace, ts_config)?,
            None => None,
        };

        Ok(ResolverConfig {
            label_mappings: self
                .label_mapping
                .iter()
                .map(|m| (m.pattern.clone(), m.label.clone()))
                .collect(),
            builtins: self
                .builtin_mapping
                .iter()
                .map(|(name, label)| (name.clone(), label.clone()))
                .collect(),
            external_workspace: self.npm_workspace_name().to_string(),
            mode: self.resolution_mode(),
            verbose_import_mappings: self.verbose_import_mappings.unwrap_or(false),
            use_query: self.use_bazel_query.unwrap_or(false),
            bazel_binary: self
                .bazel_binary
                .clone()
                .unwrap_or_else(|| DEFAULT_BAZEL_BINARY.to_string()),
            query_cache_size: self.query_cache_size.unwrap_or(DEFAULT_QUERY_CACHE_SIZE),
            path_aliases,
            ..ResolverConfig::default()
        })
    }

    pub fn load_sites(&self) -> LoadSites {
        LoadSites::with_overrides(&self.load_mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serialization() {
        let config = Config {
            label_mapping: vec![LabelMapping::new("rxjs/operators", "//external:rxjs")],
            load_mapping: IndexMap::from([(
                "ts_library".to_string(),
                "//tools:defaults.bzl".to_string(),
            )]),
            npm_workspace_name: Some("deps".to_string()),
            pkg_default_dep_labels: Some(false),
            ..Default::default()
        };

        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"npm_workspace_name\": \"deps\""));
        assert!(!json.contains("bazel_binary"));

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.resolution_mode(), ResolutionMode::Exact);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.npm_workspace_name(), "npm");
        assert_eq!(config.resolution_mode(), ResolutionMode::PackageDefault);
        assert!(config.default_visibility().is_empty());
        assert_eq!(config.scss_suffixes(), ("scss_library", "scss"));

        let temp = TempDir::new().unwrap();
        let resolver_config = config
            .resolver_config(&config.workspace(temp.path(), ""))
            .unwrap();
        assert!(!resolver_config.use_query);
        assert_eq!(resolver_config.bazel_binary, "bazel");
        assert_eq!(resolver_config.query_cache_size, 1024);
    }

    #[test]
    fn test_label_mapping_parse() {
        let mapping = LabelMapping::parse("src/foo/*=//fother").unwrap();
        assert_eq!(mapping, LabelMapping::new("src/foo/*", "//fother"));

        assert!(LabelMapping::parse("src/foo").is_err());
        assert!(LabelMapping::parse("=//foo").is_err());
        assert!(LabelMapping::parse("src=").is_err());
    }

    #[test]
    fn test_merge_with() {
        let base = Config {
            label_mapping: vec![LabelMapping::new("a", "//a")],
            load_mapping: IndexMap::from([
                ("ts_library".to_string(), "//base:ts.bzl".to_string()),
                ("ng_module".to_string(), "//base:ng.bzl".to_string()),
            ]),
            npm_workspace_name: Some("npm".to_string()),
            bazel_binary: Some("bazelisk".to_string()),
            ..Default::default()
        };
        let cli = Config {
            label_mapping: vec![LabelMapping::new("b", "//b")],
            load_mapping: IndexMap::from([("ts_library".to_string(), "//cli:ts.bzl".to_string())]),
            npm_workspace_name: Some("deps".to_string()),
            ..Default::default()
        };

        let merged = base.merge_with(cli);
        assert_eq!(
            merged.label_mapping,
            vec![LabelMapping::new("a", "//a"), LabelMapping::new("b", "//b")]
        );
        assert_eq!(merged.load_mapping["ts_library"], "//cli:ts.bzl");
        assert_eq!(merged.load_mapping["ng_module"], "//base:ng.bzl");
        assert_eq!(merged.npm_workspace_name(), "deps");
        assert_eq!(merged.bazel_binary.as_deref(), Some("bazelisk"));
    }

    #[test]
    fn test_find_and_load_config_file() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src/app");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Config {
            use_bazel_query: Some(true),
            suffix_separator: Some("_".to_string()),
            ..Default::default()
        };
        let path = temp.path().join(CONFIG_FILE_NAME);
        config.save_to_file(&path).unwrap();

        assert_eq!(Config::find_config_file(&nested), Some(path.clone()));
        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_workspace_and_load_sites() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("src/foo.component.ts"), "").unwrap();

        let config = Config {
            suffix_separator: Some("_".to_string()),
            build_file_name: Some("BUILD.bazel".to_string()),
            load_mapping: IndexMap::from([("ts_library".to_string(), "//tools:ts.bzl".to_string())]),
            ..Default::default()
        };

        let workspace = config.workspace(temp.path(), "src");
        assert_eq!(workspace.build_file_name(), "BUILD.bazel");
        assert_eq!(
            workspace.rule_name_for_file("src/foo.component.ts", None),
            "foo_component"
        );

        let load_sites = config.load_sites();
        assert_eq!(load_sites.get("ts_library"), Some("//tools:ts.bzl"));
        assert_eq!(
            load_sites.get("sass_library"),
            Some("@io_bazel_rules_sass//sass:sass.bzl")
        );
    }

    #[test]
    fn test_resolver_config_reads_tsconfig() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("tsconfig.json"),
            r#"{ "compilerOptions": { "paths": { "@lib/*": ["src/lib/*"] } } }"#,
        )
        .unwrap();

        let config = Config {
            ts_config: Some("tsconfig.json".to_string()),
            ..Default::default()
        };
        let workspace = config.workspace(temp.path(), "");
        assert!(config.resolver_config(&workspace).unwrap().path_aliases.is_some());

        let missing = Config {
            ts_config: Some("nope.json".to_string()),
            ..Default::default()
        };
        assert!(missing.resolver_config(&workspace).is_err());
    }
}
