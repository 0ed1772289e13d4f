use super::{Generator, GeneratorContext};
use crate::error::{Error, Result};
use crate::rule::TsLibrary;
use crate::workspace::{Workspace, file_name};
use indexmap::IndexSet;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};

const TS_EXTENSION: &str = ".ts";
const SPEC_SUFFIX: &str = ".spec.ts";

static IMPORT_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r#"\b(?:from|import|require)\s*\(?\s*['"]([^'"\n]+)['"]"#)
});

/// Produces the raw references a source file makes, in source order
pub trait ReferenceExtractor {
    fn extract(&self, file: &str, contents: &str) -> Result<Vec<String>>;
}

/// Scans `import`, `export ... from` and `require` specifiers with a regular
/// expression. Specifiers inside comments or strings are picked up as well.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportStatementExtractor;

impl ImportStatementExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ReferenceExtractor for ImportStatementExtractor {
    fn extract(&self, _file: &str, contents: &str) -> Result<Vec<String>> {
        let pattern = IMPORT_PATTERN
            .as_ref()
            .map_err(|e| Error::RegexError(e.clone()))?;

        Ok(pattern
            .captures_iter(contents)
            .filter_map(|captures| captures.get(1))
            .map(|specifier| specifier.as_str().to_string())
            .collect())
    }
}

/// A `ts_library` over the TypeScript sources in the path, with deps
/// resolved from each file's imports
#[derive(Clone)]
pub struct TsLibraryGenerator {
    extractor: Arc<dyn ReferenceExtractor>,
}

impl std::fmt::Debug for TsLibraryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsLibraryGenerator").finish_non_exhaustive()
    }
}

impl TsLibraryGenerator {
    pub fn new(extractor: Arc<dyn ReferenceExtractor>) -> Self {
        Self { extractor }
    }

    fn is_source_file(file: &str) -> bool {
        file.ends_with(TS_EXTENSION) && !file.ends_with(SPEC_SUFFIX)
    }

    /// Relative references to another source of the same rule are not deps
    fn is_sibling_source(workspace: &Workspace, reference: &str, files: &[String]) -> bool {
        if !reference.starts_with('.') && !workspace.is_workspace_relative(reference) {
            return false;
        }
        let path = workspace.resolve_relative_to_workspace(reference);
        let path = if path.ends_with(TS_EXTENSION) {
            path
        } else {
            format!("{path}{TS_EXTENSION}")
        };
        files.contains(&path)
    }
}

impl Generator for TsLibraryGenerator {
    fn generator_type(&self) -> &'static str {
        TsLibrary::KIND
    }

    fn description(&self) -> &'static str {
        "Generates a ts_library for the TypeScript sources in the given path"
    }

    fn generate(&self, context: &mut GeneratorContext) -> Result<()> {
        let files: Vec<String> = context
            .files()?
            .into_iter()
            .filter(|file| Self::is_source_file(file))
            .collect();

        if files.is_empty() {
            return Err(Error::GeneratorError(format!(
                "No TypeScript sources found in {}",
                context.workspace().path()
            )));
        }

        let mode = context.resolver.mode();
        let workspace = context.workspace();
        let label = if workspace.is_file() {
            let stem = Path::new(file_name(workspace.path()))
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            workspace.label_for_path()?.with_target(stem)?
        } else {
            workspace.label_for_path()?
        };

        let mut deps = IndexSet::new();
        for file in &files {
            let contents = context.workspace().read_file(file)?;
            let references: Vec<String> = self
                .extractor
                .extract(file, &contents)?
                .into_iter()
                .filter(|reference| !Self::is_sibling_source(context.workspace(), reference, &files))
                .collect();
            tracing::debug!("{} references {:?}", file, references);

            for dep in context.resolver.resolve_all(&references, mode)? {
                if dep == label {
                    continue;
                }
                deps.insert(dep.to_string());
            }
        }

        let mut rule = TsLibrary::new(label);
        rule.set_srcs(files.iter().map(|file| file_name(file)).collect::<Vec<_>>())
            .set_deps(deps.into_iter().collect::<Vec<_>>());
        if let Some(tsconfig) = context.ts_config_label() {
            rule.set_tsconfig(tsconfig);
        }
        rule.set_visibility(context.default_visibility().to_vec());

        context.buildozer.add_rule(rule);
        Ok(())
    }
}
