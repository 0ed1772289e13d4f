use super::{Generator, GeneratorContext};
use crate::error::Result;
use crate::rule::NodejsBinary;

const TARGET_NAME: &str = "bin";

/// A `nodejs_binary` named `bin` with the file as its entry point
#[derive(Debug, Default, Clone, Copy)]
pub struct NodejsBinaryGenerator;

impl Generator for NodejsBinaryGenerator {
    fn generator_type(&self) -> &'static str {
        NodejsBinary::KIND
    }

    fn description(&self) -> &'static str {
        "Generates a nodejs_binary using the given file as the entry point"
    }

    fn supports_directories(&self) -> bool {
        false
    }

    fn generate(&self, context: &mut GeneratorContext) -> Result<()> {
        let workspace = context.workspace();
        let entry = workspace.path().to_string();
        let label = workspace.label_for_path()?.with_target(TARGET_NAME)?;
        let entry_point = workspace.file_label(&entry)?;

        // the rule the entry point itself belongs to
        let data = context.resolver.label_for_file(&entry, None)?;

        let mut rule = NodejsBinary::new(label);
        rule.set_entry_point(entry_point)
            .set_data(vec![data.to_string()]);

        context.buildozer.add_rule(rule);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, LabelMapping};
    use crate::error::Error;
    use crate::generators::run_generator;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("tools/server")).unwrap();
        fs::write(temp.path().join("tools/server/main.server.ts"), "").unwrap();
        temp
    }

    #[test]
    fn test_nodejs_binary() {
        let temp = fixture();
        let mut context = GeneratorContext::from_config(
            &Config::default(),
            temp.path(),
            "tools/server/main.server.ts",
        )
        .unwrap();
        run_generator(&NodejsBinaryGenerator, &mut context).unwrap();

        insta::assert_snapshot!(context.buildozer.to_command_file(), @r#"
        new_load @build_bazel_rules_nodejs//:index.bzl nodejs_binary|//tools/server:__pkg__
        new nodejs_binary bin|//tools/server:__pkg__
        set entry_point "//tools/server:main.server.ts"|//tools/server:bin
        add data //tools/server:main-server|//tools/server:bin
        "#);
    }

    #[test]
    fn test_data_honours_static_mappings() {
        let temp = fixture();
        let config = Config {
            label_mapping: vec![LabelMapping::new("tools/server/*", "//tools/server:lib")],
            ..Default::default()
        };
        let mut context =
            GeneratorContext::from_config(&config, temp.path(), "tools/server/main.server.ts")
                .unwrap();
        run_generator(&NodejsBinaryGenerator, &mut context).unwrap();

        assert_eq!(
            context.buildozer.to_commands().last().unwrap(),
            "add data //tools/server:lib|//tools/server:bin"
        );
    }

    #[test]
    fn test_directories_are_rejected() {
        let temp = fixture();
        let mut context =
            GeneratorContext::from_config(&Config::default(), temp.path(), "tools/server").unwrap();

        assert!(matches!(
            run_generator(&NodejsBinaryGenerator, &mut context),
            Err(Error::GeneratorError(_))
        ));
        assert!(context.buildozer.is_empty());
    }
}
