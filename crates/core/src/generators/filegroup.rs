use super::{Generator, GeneratorContext};
use crate::error::Result;
use crate::rule::Filegroup;

/// A native `filegroup` at the package's default label holding every file in
/// the path
#[derive(Debug, Default, Clone, Copy)]
pub struct FilegroupGenerator;

impl Generator for FilegroupGenerator {
    fn generator_type(&self) -> &'static str {
        Filegroup::KIND
    }

    fn description(&self) -> &'static str {
        "Generates a filegroup containing all the files in the given path"
    }

    fn generate(&self, context: &mut GeneratorContext) -> Result<()> {
        let files = context.files()?;
        let label = context.workspace().label_for_path()?;

        let mut rule = Filegroup::new(label);
        rule.set_srcs(context.file_labels(&files)?)
            .set_visibility(context.default_visibility().to_vec());

        context.buildozer.add_rule(rule);
        Ok(())
    }
}
