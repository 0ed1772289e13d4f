use super::{Generator, GeneratorContext};
use crate::error::{Error, Result};
use crate::rule::BzlLibrary;

const BZL_EXTENSION: &str = ".bzl";
const TARGET_NAME: &str = "bzl";

/// A `bzl_library` named `bzl` over the Starlark files in the path
#[derive(Debug, Default, Clone, Copy)]
pub struct BzlLibraryGenerator;

impl Generator for BzlLibraryGenerator {
    fn generator_type(&self) -> &'static str {
        BzlLibrary::KIND
    }

    fn description(&self) -> &'static str {
        "Generates a bzl_library for the .bzl files in the given path"
    }

    fn generate(&self, context: &mut GeneratorContext) -> Result<()> {
        let files: Vec<String> = context
            .files()?
            .into_iter()
            .filter(|file| file.ends_with(BZL_EXTENSION))
            .collect();

        if files.is_empty() {
            return Err(Error::GeneratorError(format!(
                "No {BZL_EXTENSION} files found in {}",
                context.workspace().path()
            )));
        }

        let workspace = context.workspace();
        let label = workspace.label_for(workspace.path(), Some(TARGET_NAME))?;

        let mut rule = BzlLibrary::new(label);
        rule.set_srcs(context.file_labels(&files)?)
            .set_visibility(context.default_visibility().to_vec());

        context.buildozer.add_rule(rule);
        Ok(())
    }
}
