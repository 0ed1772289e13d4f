use super::{Generator, GeneratorContext, ReferenceExtractor};
use crate::error::{Error, Result};
use crate::rule::{SassBinary, SassLibrary};
use crate::workspace::file_name;
use indexmap::IndexSet;
use regex::Regex;
use std::sync::{Arc, LazyLock};

const SCSS_EXTENSION: &str = ".scss";
const PARTIAL_PREFIX: char = '_';

static SASS_IMPORT_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r#"@(?:import|use)\s+['"]([^'"\n]+)['"]"#));

/// Collects the targets of `@import` and `@use` at-rules
#[derive(Debug, Default, Clone, Copy)]
pub struct SassImportExtractor;

impl SassImportExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceExtractor for SassImportExtractor {
    fn extract(&self, _file: &str, contents: &str) -> Result<Vec<String>> {
        let pattern = SASS_IMPORT_PATTERN
            .as_ref()
            .map_err(|e| Error::RegexError(e.clone()))?;

        Ok(pattern
            .captures_iter(contents)
            .filter_map(|captures| captures.get(1))
            .map(|path| path.as_str().to_string())
            .collect())
    }
}

/// A `sass_library` for a partial (`_name.scss`), otherwise a `sass_binary`.
/// Imports become deps on the library rule of the imported file.
#[derive(Clone)]
pub struct SassGenerator {
    extractor: Arc<dyn ReferenceExtractor>,
}

impl std::fmt::Debug for SassGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SassGenerator").finish_non_exhaustive()
    }
}

impl SassGenerator {
    pub fn new(extractor: Arc<dyn ReferenceExtractor>) -> Self {
        Self { extractor }
    }
}

impl Generator for SassGenerator {
    fn generator_type(&self) -> &'static str {
        "sass"
    }

    fn description(&self) -> &'static str {
        "Generates a sass_library or sass_binary for the given scss file"
    }

    fn supports_directories(&self) -> bool {
        false
    }

    fn generate(&self, context: &mut GeneratorContext) -> Result<()> {
        let library_suffix = context.scss_library_suffix().to_string();
        let binary_suffix = context.scss_binary_suffix().to_string();

        let workspace = context.workspace();
        let file = workspace.path().to_string();
        let src = file_name(&file).to_string();
        if !src.ends_with(SCSS_EXTENSION) {
            return Err(Error::GeneratorError(format!("{file} is not an {SCSS_EXTENSION} file")));
        }

        let is_library = src.starts_with(PARTIAL_PREFIX);
        let suffix = if is_library { &library_suffix } else { &binary_suffix };
        let name = workspace.rule_name_for_file(&file, Some(suffix));
        let label = workspace.label_for_path()?.with_target(&name)?;
        let contents = workspace.read_file(&file)?;

        let mut deps = IndexSet::new();
        for import in self.extractor.extract(&file, &contents)? {
            let dep = context.resolver.label_for_file(&import, Some(&library_suffix))?;
            tracing::debug!("{}={}", import, dep);
            deps.insert(dep.to_string());
        }
        let deps: Vec<String> = deps.into_iter().collect();
        let visibility = context.default_visibility().to_vec();

        if is_library {
            let mut rule = SassLibrary::new(label);
            rule.set_srcs([src]).set_deps(deps).set_visibility(visibility);
            context.buildozer.add_rule(rule);
        } else {
            let mut rule = SassBinary::new(label);
            rule.set_src(src).set_deps(deps).set_visibility(visibility);
            context.buildozer.add_rule(rule);
        }
        Ok(())
    }
}
