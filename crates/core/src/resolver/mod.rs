//! Turns raw source references into labels
//!
//! Policies are tried in a fixed order and the first one to produce a label
//! wins:
//!
//! 1. static glob mappings from configuration
//! 2. the built-in module table, for non-relative references only
//! 3. path alias rewriting, which feeds into 4 or 5
//! 4. relative resolution against the file system, consulting the static
//!    mappings and then the build graph query for the located file
//! 5. the external package fallback
//!
//! Every cache lives on the `Resolver` instance. Build a new resolver when the
//! mapping or alias configuration changes.

mod builtins;
mod path_alias;
mod query;
mod static_mapping;

pub use builtins::{BuiltinModules, NODE_BUILTINS};
pub use path_alias::PathAliases;
pub use query::{BazelQuery, LabelQuery};
pub use static_mapping::StaticMappings;

use crate::error::{Error, Result};
use crate::label::Label;
use crate::workspace::{Workspace, join_path};
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;

pub const DEFAULT_EXTERNAL_WORKSPACE: &str = "npm";
pub const DEFAULT_FILE_EXTENSION: &str = ".ts";
pub const DEFAULT_DIRECTORY_INDEX: &str = "index.ts";
pub const DEFAULT_BAZEL_BINARY: &str = "bazel";
pub const DEFAULT_QUERY_CACHE_SIZE: usize = 1024;

const SCOPE_MARKER: char = '@';

/// How a relative reference maps onto a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// One rule per directory, named after the directory
    #[default]
    PackageDefault,
    /// One rule per file, named after the file
    Exact,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Ordered `(glob, label)` pairs, first match wins
    pub label_mappings: Vec<(String, String)>,
    /// Extra or replacement entries for the built-in module table
    pub builtins: Vec<(String, String)>,
    pub external_workspace: String,
    pub mode: ResolutionMode,
    pub file_extension: String,
    pub directory_index: String,
    pub verbose_import_mappings: bool,
    pub use_query: bool,
    pub bazel_binary: String,
    pub query_cache_size: usize,
    pub path_aliases: Option<PathAliases>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            label_mappings: Vec::new(),
            builtins: Vec::new(),
            external_workspace: DEFAULT_EXTERNAL_WORKSPACE.to_string(),
            mode: ResolutionMode::default(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            directory_index: DEFAULT_DIRECTORY_INDEX.to_string(),
            verbose_import_mappings: false,
            use_query: false,
            bazel_binary: DEFAULT_BAZEL_BINARY.to_string(),
            query_cache_size: DEFAULT_QUERY_CACHE_SIZE,
            path_aliases: None,
        }
    }
}

impl ResolverConfig {
    pub fn with_label_mapping(mut self, pattern: impl Into<String>, label: impl Into<String>) -> Self {
        self.label_mappings.push((pattern.into(), label.into()));
        self
    }

    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_path_aliases(mut self, aliases: PathAliases) -> Self {
        self.path_aliases = Some(aliases);
        self
    }
}

pub struct Resolver {
    workspace: Workspace,
    static_mappings: StaticMappings,
    builtins: BuiltinModules,
    aliases: Option<PathAliases>,
    external_workspace: String,
    mode: ResolutionMode,
    file_extension: String,
    directory_index: String,
    verbose: bool,
    query: Option<Box<dyn LabelQuery>>,
    query_cache: LruCache<String, Label>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("workspace", &self.workspace)
            .field("static_mappings", &self.static_mappings.len())
            .field("external_workspace", &self.external_workspace)
            .field("mode", &self.mode)
            .field("query", &self.query.is_some())
            .finish()
    }
}

impl Resolver {
    pub fn new(workspace: Workspace, config: ResolverConfig) -> Result<Self> {
        let static_mappings = StaticMappings::new(config.label_mappings)?;

        let mut builtins = BuiltinModules::node(&config.external_workspace)?;
        for (name, label) in config.builtins {
            builtins.insert(name, Label::parse_absolute(&label)?);
        }

        let query: Option<Box<dyn LabelQuery>> = if config.use_query {
            Some(Box::new(BazelQuery::new(
                config.bazel_binary,
                workspace.base_dir().to_path_buf(),
            )))
        } else {
            None
        };

        let capacity = NonZeroUsize::new(config.query_cache_size)
            .ok_or_else(|| Error::ConfigError("query_cache_size must be at least 1".to_string()))?;

        Ok(Self {
            workspace,
            static_mappings,
            builtins,
            aliases: config.path_aliases.filter(|aliases| !aliases.is_empty()),
            external_workspace: config.external_workspace,
            mode: config.mode,
            file_extension: config.file_extension,
            directory_index: config.directory_index,
            verbose: config.verbose_import_mappings,
            query,
            query_cache: LruCache::new(capacity),
        })
    }

    /// Replace the build graph query, enabling the query step
    pub fn with_query(mut self, query: Box<dyn LabelQuery>) -> Self {
        self.query = Some(query);
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    pub fn resolve(&mut self, reference: &str) -> Result<Label> {
        self.resolve_with_mode(reference, self.mode)
    }

    pub fn resolve_with_mode(&mut self, reference: &str, mode: ResolutionMode) -> Result<Label> {
        let label = self.resolve_inner(reference, mode)?;
        if self.verbose {
            tracing::info!("{}={}", reference, label);
        }
        Ok(label)
    }

    /// Resolve `references` in order and return the distinct labels in the
    /// order they were first produced
    pub fn resolve_all<S: AsRef<str>>(&mut self, references: &[S], mode: ResolutionMode) -> Result<Vec<Label>> {
        let mut seen = HashSet::new();
        let mut labels = Vec::new();
        for reference in references {
            let label = self.resolve_with_mode(reference.as_ref(), mode)?;
            if seen.insert(label.canonical()) {
                labels.push(label);
            }
        }
        Ok(labels)
    }

    /// Label for a workspace-relative path, honouring static mappings before
    /// falling back to the package layout
    pub fn label_for(&mut self, path: &str, target: Option<&str>) -> Result<Label> {
        if let Some(label) = self.static_mappings.lookup(path) {
            return Ok(label);
        }
        self.workspace.label_for(path, target)
    }

    /// Best guess label for the rule owning `file`, with an optional target
    /// suffix. Static mappings and the build graph query take precedence.
    pub fn label_for_file(&mut self, file: &str, suffix: Option<&str>) -> Result<Label> {
        let path = self.workspace.resolve_relative_to_workspace(file);
        if let Some(label) = self.static_mappings.lookup(&path) {
            return Ok(label);
        }
        if let Some(label) = self.query_owning_rule(&path) {
            return Ok(label);
        }
        self.workspace.label_for_file(&path, suffix)
    }

    fn resolve_inner(&mut self, reference: &str, mode: ResolutionMode) -> Result<Label> {
        // dot-relative references are matched in their workspace-relative form
        let mapped = if is_dot_relative(reference) {
            self.static_mappings
                .lookup(&self.workspace.resolve_relative_to_workspace(reference))
        } else {
            self.static_mappings.lookup(reference)
        };
        if let Some(label) = mapped {
            return Ok(label);
        }

        let is_relative = is_dot_relative(reference) || self.workspace.is_workspace_relative(reference);

        if !is_relative {
            if let Some(label) = self.builtins.get(reference) {
                tracing::debug!("{} is a built-in module", reference);
                return Ok(label.clone());
            }
        }

        let rewritten = self.aliases.as_ref().and_then(|aliases| {
            aliases.rewrite(
                reference,
                &self.workspace,
                &self.file_extension,
                &self.directory_index,
            )
        });

        match rewritten {
            Some(path) => self.resolve_relative(reference, &path, mode),
            None if is_relative => self.resolve_relative(reference, reference, mode),
            None => external_package_label(&self.external_workspace, reference),
        }
    }

    fn resolve_relative(&mut self, original: &str, reference: &str, mode: ResolutionMode) -> Result<Label> {
        let path = self.workspace.resolve_relative_to_workspace(reference);
        let Some(file) = self.locate_file(&path) else {
            return Err(Error::unresolvable(original));
        };
        tracing::debug!("{} located at {}", original, file);

        if let Some(label) = self.static_mappings.lookup(&file) {
            return Ok(label);
        }

        if let Some(label) = self.query_owning_rule(&file) {
            return Ok(label);
        }

        let exact = self.workspace.label_for_file(&file, None)?;
        match mode {
            ResolutionMode::Exact => Ok(exact),
            ResolutionMode::PackageDefault => match exact.as_default_label() {
                Ok(label) => Ok(label),
                Err(_) => {
                    tracing::debug!("{} is in the root package, using {}", file, exact);
                    Ok(exact)
                }
            },
        }
    }

    /// The directory index wins over `<path><ext>`, which wins over `path` itself
    fn locate_file(&self, path: &str) -> Option<String> {
        let root = self.workspace.base_dir();
        [
            join_path(path, &self.directory_index),
            format!("{path}{}", self.file_extension),
            path.to_string(),
        ]
        .into_iter()
        .find(|candidate| !candidate.is_empty() && root.join(candidate).is_file())
    }

    fn query_owning_rule(&mut self, file: &str) -> Option<Label> {
        let query = self.query.as_ref()?;

        if let Some(label) = self.query_cache.get(file) {
            tracing::debug!("Query cache hit for {}", file);
            return Some(label.clone());
        }

        match query.owning_rule(file) {
            Ok(Some(label)) => {
                self.query_cache.put(file.to_string(), label.clone());
                Some(label)
            }
            Ok(None) => {
                tracing::debug!("No rule owns {}", file);
                None
            }
            Err(e) => {
                tracing::debug!("Falling back from query for {}: {}", file, e);
                None
            }
        }
    }
}

fn is_dot_relative(reference: &str) -> bool {
    reference.starts_with('.')
}

/// `@<workspace>//<package>` for a third-party module specifier, dropping any
/// path below the package (`@scope/pkg/deep` becomes `@scope/pkg`)
pub fn external_package_label(external_workspace: &str, reference: &str) -> Result<Label> {
    let keep = if reference.starts_with(SCOPE_MARKER) { 2 } else { 1 };
    let package = reference
        .split('/')
        .filter(|segment| !segment.is_empty())
        .take(keep)
        .collect::<Vec<_>>()
        .join("/");

    if package.is_empty() {
        return Err(Error::unresolvable(reference));
    }

    Label::parse_absolute(&format!("@{external_workspace}//{package}"))
}
