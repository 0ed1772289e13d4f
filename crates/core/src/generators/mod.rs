//! Generators turn a workspace path into rules on a shared buildozer
//!
//! Generators are registered explicitly in a [`GeneratorRegistry`] at start
//! up. Each run gets its own [`GeneratorContext`] holding the resolver and the
//! buildozer the rules are lowered into.

mod bzl_library;
mod filegroup;
mod nodejs_binary;
mod sass;
mod ts_library;

pub use bzl_library::BzlLibraryGenerator;
pub use filegroup::FilegroupGenerator;
pub use nodejs_binary::NodejsBinaryGenerator;
pub use sass::{SassGenerator, SassImportExtractor};
pub use ts_library::{ImportStatementExtractor, ReferenceExtractor, TsLibraryGenerator};

use crate::{
    buildozer::Buildozer,
    config::{Config, DEFAULT_SCSS_BINARY_SUFFIX, DEFAULT_SCSS_LIBRARY_SUFFIX},
    error::{Error, Result},
    label::Label,
    resolver::Resolver,
    workspace::Workspace,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

pub trait Generator {
    /// Name used to select the generator, usually the rule kind it emits
    fn generator_type(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn supports_directories(&self) -> bool {
        true
    }

    /// Check the path can be generated for before any command is emitted
    fn validate(&self, workspace: &Workspace) -> Result<()> {
        let path = workspace.absolute_path();
        if !path.exists() {
            return Err(Error::GeneratorError(format!(
                "Path {} does not exist",
                workspace.path()
            )));
        }
        if workspace.is_directory() && !self.supports_directories() {
            return Err(Error::GeneratorError(format!(
                "Generator {} does not support directories",
                self.generator_type()
            )));
        }
        Ok(())
    }

    fn generate(&self, context: &mut GeneratorContext) -> Result<()>;
}

/// Everything one generation run mutates
#[derive(Debug)]
pub struct GeneratorContext {
    pub resolver: Resolver,
    pub buildozer: Buildozer,
    default_visibility: Vec<String>,
    ts_config_label: Option<String>,
    scss_library_suffix: String,
    scss_binary_suffix: String,
}

impl GeneratorContext {
    pub fn new(resolver: Resolver, buildozer: Buildozer) -> Self {
        Self {
            resolver,
            buildozer,
            default_visibility: Vec::new(),
            ts_config_label: None,
            scss_library_suffix: DEFAULT_SCSS_LIBRARY_SUFFIX.to_string(),
            scss_binary_suffix: DEFAULT_SCSS_BINARY_SUFFIX.to_string(),
        }
    }

    /// Context for generating `path` under `base_dir` with `config`
    pub fn from_config(config: &Config, base_dir: impl Into<PathBuf>, path: &str) -> Result<Self> {
        let workspace = config.workspace(base_dir, path);
        let resolver = Resolver::new(workspace.clone(), config.resolver_config(&workspace)?)?;

        let (library_suffix, binary_suffix) = config.scss_suffixes();
        Ok(Self::new(resolver, Buildozer::new(config.load_sites()))
            .with_default_visibility(config.default_visibility().to_vec())
            .with_ts_config_label(config.ts_config_label.clone())
            .with_scss_suffixes(library_suffix, binary_suffix))
    }

    pub fn with_default_visibility(mut self, visibility: Vec<String>) -> Self {
        self.default_visibility = visibility;
        self
    }

    pub fn with_ts_config_label(mut self, label: Option<String>) -> Self {
        self.ts_config_label = label;
        self
    }

    pub fn with_scss_suffixes(mut self, library: impl Into<String>, binary: impl Into<String>) -> Self {
        self.scss_library_suffix = library.into();
        self.scss_binary_suffix = binary.into();
        self
    }

    pub fn workspace(&self) -> &Workspace {
        self.resolver.workspace()
    }

    pub fn scss_library_suffix(&self) -> &str {
        &self.scss_library_suffix
    }

    pub fn scss_binary_suffix(&self) -> &str {
        &self.scss_binary_suffix
    }

    pub fn default_visibility(&self) -> &[String] {
        &self.default_visibility
    }

    pub fn ts_config_label(&self) -> Option<&str> {
        self.ts_config_label.as_deref()
    }

    /// File labels for `files`, as they appear in `srcs`
    pub fn file_labels(&self, files: &[String]) -> Result<Vec<Label>> {
        files
            .iter()
            .map(|file| self.workspace().file_label(file))
            .collect()
    }

    /// The files the run covers: the listing of a directory or the single file
    pub fn files(&self) -> Result<Vec<String>> {
        let workspace = self.workspace();
        if workspace.is_directory() {
            workspace.read_directory()
        } else {
            Ok(vec![workspace.path().to_string()])
        }
    }

    pub fn into_buildozer(self) -> Buildozer {
        self.buildozer
    }
}

type GeneratorConstructor = Box<dyn Fn() -> Box<dyn Generator>>;

struct GeneratorEntry {
    description: &'static str,
    constructor: GeneratorConstructor,
}

/// Registry of generators keyed by generator type
pub struct GeneratorRegistry {
    entries: BTreeMap<String, GeneratorEntry>,
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry holding the built-in generators
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(|| FilegroupGenerator);
        registry.register(|| BzlLibraryGenerator);

        let extractor: Arc<dyn ReferenceExtractor> = Arc::new(ImportStatementExtractor::new());
        registry.register(move || TsLibraryGenerator::new(extractor.clone()));
        registry.register(|| NodejsBinaryGenerator);

        let extractor: Arc<dyn ReferenceExtractor> = Arc::new(SassImportExtractor::new());
        registry.register(move || SassGenerator::new(extractor.clone()));

        registry
    }

    /// Register a generator constructor. A later registration for the same
    /// type replaces the earlier one.
    pub fn register<G, F>(&mut self, constructor: F)
    where
        G: Generator + 'static,
        F: Fn() -> G + 'static,
    {
        let generator = constructor();
        let generator_type = generator.generator_type().to_string();
        tracing::debug!("Registering generator {}", generator_type);

        self.entries.insert(
            generator_type,
            GeneratorEntry {
                description: generator.description(),
                constructor: Box::new(move || Box::new(constructor()) as Box<dyn Generator>),
            },
        );
    }

    pub fn contains(&self, generator_type: &str) -> bool {
        self.entries.contains_key(generator_type)
    }

    pub fn create(&self, generator_type: &str) -> Result<Box<dyn Generator>> {
        self.entries
            .get(generator_type)
            .map(|entry| (entry.constructor)())
            .ok_or_else(|| Error::UnknownGenerator(generator_type.to_string()))
    }

    /// `(type, description)` pairs sorted by type
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|(generator_type, entry)| (generator_type.as_str(), entry.description))
            .collect()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Validate and run `generator` against the context's workspace
pub fn run_generator(generator: &dyn Generator, context: &mut GeneratorContext) -> Result<()> {
    generator.validate(context.workspace())?;

    tracing::info!(
        "Running {} generator for {}",
        generator.generator_type(),
        context.workspace().path()
    );
    generator.generate(context)?;

    if context.buildozer.is_empty() {
        tracing::warn!(
            "Generator {} produced no commands for {}",
            generator.generator_type(),
            context.workspace().path()
        );
    }

    Ok(())
}
