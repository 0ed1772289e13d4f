//! Where each rule kind has to be loaded from

use std::collections::HashMap;

/// Built-in load sites, overridable through configuration
pub const DEFAULT_LOAD_SITES: &[(&str, &str)] = &[
    ("sass_library", "@io_bazel_rules_sass//sass:sass.bzl"),
    ("sass_binary", "@io_bazel_rules_sass//sass:sass.bzl"),
    ("ts_library", "@npm//@bazel/typescript:index.bzl"),
    ("ng_module", "@npm//@angular/bazel:index.bzl"),
    ("nodejs_binary", "@build_bazel_rules_nodejs//:index.bzl"),
    ("bzl_library", "@bazel_skylib//:bzl_library.bzl"),
    ("container_layer", "@io_bazel_rules_docker//container:container.bzl"),
];

/// Rule kind to load site table. Kinds without an entry are native and need
/// no load statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSites {
    sites: HashMap<String, String>,
}

impl LoadSites {
    /// Defaults merged with `overrides`, overrides win and unknown kinds are added
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut sites = Self::default();
        for (kind, site) in overrides {
            sites.sites.insert(kind.into(), site.into());
        }
        sites
    }

    pub fn get(&self, kind: &str) -> Option<&str> {
        self.sites.get(kind).map(String::as_str)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.sites.contains_key(kind)
    }
}

impl Default for LoadSites {
    fn default() -> Self {
        Self {
            sites: DEFAULT_LOAD_SITES
                .iter()
                .map(|(kind, site)| (kind.to_string(), site.to_string()))
                .collect(),
        }
    }
}
