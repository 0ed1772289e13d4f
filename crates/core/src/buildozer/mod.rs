//! Accumulates buildozer commands for a generation run
//!
//! Commands are grouped per target label, keeping the order they were added
//! and the order in which each target was first seen. Rule creation and load
//! statements mutate the package, so they are keyed by `//pkg:__pkg__`.

mod load_sites;

pub use load_sites::{DEFAULT_LOAD_SITES, LoadSites};

use crate::label::Label;
use crate::rule::Rule;
use indexmap::IndexMap;
use serde::Serialize;

/// Commands applied to a set of targets, the shape buildozer's batch API takes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandBatch {
    pub commands: Vec<String>,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Buildozer {
    load_sites: LoadSites,
    commands: IndexMap<String, Vec<String>>,
    rules: IndexMap<String, Rule>,
}

impl Buildozer {
    pub fn new(load_sites: LoadSites) -> Self {
        Self {
            load_sites,
            commands: IndexMap::new(),
            rules: IndexMap::new(),
        }
    }

    /// Register `rule` under its label and lower it into commands.
    ///
    /// Adding a second rule for the same label replaces the registry entry
    /// but both rules' commands stay in the output.
    pub fn add_rule(&mut self, rule: impl Into<Rule>) {
        let rule = rule.into();
        let key = rule.label().canonical();
        if self.rules.contains_key(&key) {
            tracing::warn!("Rule {} was already added, its commands will be emitted twice", key);
        }

        rule.to_commands(self);
        self.rules.insert(key, rule);
    }

    pub fn get_rule(&self, label: &Label) -> Option<&Rule> {
        self.rules.get(&label.canonical())
    }

    pub fn get_rule_mut(&mut self, label: &Label) -> Option<&mut Rule> {
        self.rules.get_mut(&label.canonical())
    }

    pub fn has_rule(&self, label: &Label) -> bool {
        self.rules.contains_key(&label.canonical())
    }

    pub fn get_rule_load_site(&self, kind: &str) -> Option<&str> {
        self.load_sites.get(kind)
    }

    /// Emit a load for `kind` when it has a known load site, native kinds are skipped
    pub fn load_rule(&mut self, kind: &str, label: &Label) {
        let Some(from) = self.load_sites.get(kind).map(str::to_string) else {
            tracing::debug!("No load site for rule kind {}, assuming native", kind);
            return;
        };
        self.new_load(&from, kind, label);
    }

    pub fn new_rule(&mut self, kind: &str, label: &Label) {
        self.push(
            &label.package_label(),
            format!("new {kind} {}", label.target()),
        );
    }

    pub fn new_load(&mut self, from: &str, symbol: &str, label: &Label) {
        if from.is_empty() {
            return;
        }
        self.push(&label.package_label(), format!("new_load {from} {symbol}"));
    }

    pub fn add_attr<S: AsRef<str>>(&mut self, attr: &str, values: &[S], label: &Label) {
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        self.push(label, format!("add {attr} {joined}"));
    }

    pub fn set_attr(&mut self, attr: &str, value: &str, label: &Label) {
        let value = value.replace('\\', "\\\\").replace('"', "\\\"");
        self.push(label, format!("set {attr} \"{value}\""));
    }

    pub fn remove_attr(&mut self, attr: &str, label: &Label) {
        self.push(label, format!("remove {attr}"));
    }

    pub fn set_visibility<S: AsRef<str>>(&mut self, visibility: &[S], label: &Label) {
        self.add_attr("visibility", visibility, label);
    }

    fn push(&mut self, label: &Label, command: String) {
        self.commands
            .entry(label.canonical())
            .or_default()
            .push(command);
    }

    /// Append `other`'s commands after ours for each target and take over its
    /// rule registrations
    pub fn merge(&mut self, other: Buildozer) {
        for (target, commands) in other.commands {
            self.commands.entry(target).or_default().extend(commands);
        }
        for (label, rule) in other.rules {
            self.rules.insert(label, rule);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// One batch per target in first-seen order
    pub fn to_command_batches(&self) -> Vec<CommandBatch> {
        self.commands
            .iter()
            .map(|(target, commands)| CommandBatch {
                commands: commands.clone(),
                targets: vec![target.clone()],
            })
            .collect()
    }

    /// Flat `command|target` lines, the format `buildozer -f` reads
    pub fn to_commands(&self) -> Vec<String> {
        self.to_command_batches()
            .into_iter()
            .flat_map(|batch| {
                let CommandBatch { commands, targets } = batch;
                commands.into_iter().flat_map(move |command| {
                    targets
                        .iter()
                        .map(|target| format!("{command}|{target}"))
                        .collect::<Vec<_>>()
                })
            })
            .collect()
    }

    /// Contents of a command file for `buildozer -f`
    pub fn to_command_file(&self) -> String {
        let mut file = self.to_commands().join("\n");
        if !file.is_empty() {
            file.push('\n');
        }
        file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::TsLibrary;

    fn label(s: &str) -> Label {
        Label::parse_absolute(s).unwrap()
    }

    fn ts_library(target: &str) -> Rule {
        let mut rule = Rule::new("ts_library", label(target));
        rule.set_srcs(["a.ts"]).set_deps(["//x:y"]);
        rule
    }

    #[test]
    fn test_batch_ordering() {
        let mut buildozer = Buildozer::new(LoadSites::default());
        buildozer.add_rule(ts_library("//foo:bar"));

        assert_eq!(
            buildozer.to_commands(),
            vec![
                "new_load @npm//@bazel/typescript:index.bzl ts_library|//foo:__pkg__",
                "new ts_library bar|//foo:__pkg__",
                "add srcs a.ts|//foo:bar",
                "add deps //x:y|//foo:bar",
            ]
        );
    }

    #[test]
    fn test_command_batches() {
        let mut buildozer = Buildozer::default();
        let mut rule = TsLibrary::new(label("//foo:bar"));
        rule.set_deps(["baz"]).set_srcs(["foo.ts"]);
        rule.set_tsconfig("//:tsconfig");
        rule.set_visibility(["//:__subpackages__"]);
        buildozer.add_rule(rule);

        let batches = buildozer.to_command_batches();
        assert_eq!(batches.len(), 2);

        let commands: Vec<_> = batches.iter().flat_map(|b| b.commands.clone()).collect();
        assert_eq!(
            commands,
            vec![
                "new_load @npm//@bazel/typescript:index.bzl ts_library",
                "new ts_library bar",
                "add deps baz",
                "add srcs foo.ts",
                "set tsconfig \"//:tsconfig\"",
                "add visibility //:__subpackages__",
            ]
        );

        let targets: Vec<_> = batches.iter().flat_map(|b| b.targets.clone()).collect();
        assert_eq!(targets, vec!["//foo:__pkg__", "//foo:bar"]);

        let json = serde_json::to_value(&batches[1]).unwrap();
        assert_eq!(json["targets"][0], "//foo:bar");
        assert_eq!(json["commands"][0], "add deps baz");
    }

    #[test]
    fn test_set_attr_escapes_quotes() {
        let mut buildozer = Buildozer::default();
        let target = label("//foo:bar");
        buildozer.set_attr("entry_point", r#"say "hi".js"#, &target);
        buildozer.set_attr("src", r"dir\file.scss", &target);

        assert_eq!(
            buildozer.to_commands(),
            vec![
                r#"set entry_point "say \"hi\".js"|//foo:bar"#,
                r#"set src "dir\\file.scss"|//foo:bar"#,
            ]
        );
    }

    #[test]
    fn test_load_rule_skips_native_kinds() {
        let mut buildozer = Buildozer::default();
        buildozer.load_rule("filegroup", &label("//foo:foo"));
        assert!(buildozer.is_empty());

        buildozer.load_rule("sass_library", &label("//foo:foo"));
        assert_eq!(
            buildozer.to_commands(),
            vec!["new_load @io_bazel_rules_sass//sass:sass.bzl sass_library|//foo:__pkg__"]
        );
    }

    #[test]
    fn test_load_site_overrides() {
        let buildozer = Buildozer::new(LoadSites::with_overrides([(
            "ts_library",
            "//tools/bazel/defaults.bzl",
        )]));
        assert_eq!(
            buildozer.get_rule_load_site("sass_binary"),
            Some("@io_bazel_rules_sass//sass:sass.bzl")
        );
        assert_eq!(
            buildozer.get_rule_load_site("ts_library"),
            Some("//tools/bazel/defaults.bzl")
        );
        assert_eq!(buildozer.get_rule_load_site("foo"), None);
    }

    #[test]
    fn test_low_level_primitives() {
        let mut buildozer = Buildozer::default();
        let target = label("//foo:bar");
        buildozer.new_rule("genrule", &target);
        buildozer.set_attr("cmd", "echo hi > $@", &target);
        buildozer.remove_attr("outs", &target);
        buildozer.set_visibility(&["//visibility:public"], &target);
        buildozer.new_load("", "genrule", &target);

        assert_eq!(
            buildozer.to_commands(),
            vec![
                "new genrule bar|//foo:__pkg__",
                "set cmd \"echo hi > $@\"|//foo:bar",
                "remove outs|//foo:bar",
                "add visibility //visibility:public|//foo:bar",
            ]
        );
    }

    #[test]
    fn test_rule_registry() {
        let mut buildozer = Buildozer::default();
        let target = label("//foo:bar");
        assert!(!buildozer.has_rule(&target));

        buildozer.add_rule(ts_library("//foo:bar"));
        assert!(buildozer.has_rule(&target));
        assert_eq!(buildozer.get_rule(&target).unwrap().kind(), "ts_library");

        buildozer
            .get_rule_mut(&target)
            .unwrap()
            .set_private_attr("entry", "main.ts");
        assert!(buildozer.get_rule(&target).unwrap().get_private_attr("entry").is_some());
    }

    #[test]
    fn test_re_adding_rule_duplicates_commands() {
        let mut buildozer = Buildozer::default();
        buildozer.add_rule(ts_library("//foo:bar"));

        let mut replacement = Rule::new("filegroup", label("//foo:bar"));
        replacement.set_srcs(["b.txt"]);
        buildozer.add_rule(replacement);

        assert_eq!(buildozer.get_rule(&label("//foo:bar")).unwrap().kind(), "filegroup");
        assert_eq!(
            buildozer.to_commands(),
            vec![
                "new_load @npm//@bazel/typescript:index.bzl ts_library|//foo:__pkg__",
                "new ts_library bar|//foo:__pkg__",
                "new filegroup bar|//foo:__pkg__",
                "add srcs a.ts|//foo:bar",
                "add deps //x:y|//foo:bar",
                "add srcs b.txt|//foo:bar",
            ]
        );
    }

    #[test]
    fn test_merge_preserves_order() {
        let mut a = Buildozer::default();
        a.add_rule(ts_library("//foo:bar"));
        a.set_attr("tsconfig", "//:tsconfig", &label("//other:other"));

        let mut b = Buildozer::default();
        b.set_attr("tsconfig", "//:b", &label("//foo:bar"));
        b.add_rule(Rule::new("filegroup", label("//baz:baz")));

        a.merge(b);

        assert_eq!(
            a.to_commands(),
            vec![
                "new_load @npm//@bazel/typescript:index.bzl ts_library|//foo:__pkg__",
                "new ts_library bar|//foo:__pkg__",
                "add srcs a.ts|//foo:bar",
                "add deps //x:y|//foo:bar",
                "set tsconfig \"//:b\"|//foo:bar",
                "set tsconfig \"//:tsconfig\"|//other:other",
                "new filegroup baz|//baz:__pkg__",
            ]
        );
        assert!(a.has_rule(&label("//baz:baz")));
    }

    #[test]
    fn test_merge_overlays_registry() {
        let mut a = Buildozer::default();
        a.add_rule(ts_library("//foo:bar"));

        let mut b = Buildozer::default();
        b.add_rule(Rule::new("filegroup", label("//foo:bar")));

        a.merge(b);
        assert_eq!(a.get_rule(&label("//foo:bar")).unwrap().kind(), "filegroup");
    }

    #[test]
    fn test_command_file() {
        let mut buildozer = Buildozer::default();
        assert_eq!(buildozer.to_command_file(), "");

        buildozer.remove_attr("deps", &label("//a:b"));
        assert_eq!(buildozer.to_command_file(), "remove deps|//a:b\n");
    }
}
