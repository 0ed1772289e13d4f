//! End to end label resolution against an on-disk workspace

use bzlgen_workspace::{
    Error, Label, ResolutionMode, Resolver, ResolverConfig, WorkspaceFixture,
    config::Config,
    resolver::{LabelQuery, PathAliases},
};

fn fixture() -> WorkspaceFixture {
    WorkspaceFixture::new()
        .and_then(|w| w.file("src/app/app.component.ts", ""))
        .and_then(|w| w.file("src/app/app.module.ts", ""))
        .and_then(|w| w.file("src/shared/index.ts", ""))
        .and_then(|w| w.file("src/shared/button.ts", ""))
        .and_then(|w| w.file("src/vendor/legacy.ts", ""))
        .and_then(|w| {
            w.file(
                "tsconfig.json",
                r#"{
                    "compilerOptions": {
                        "baseUrl": "src",
                        "paths": { "@shared/*": ["shared/*"], "@shared": ["shared"] }
                    }
                }"#,
            )
        })
        .unwrap()
}

fn resolve(resolver: &mut Resolver, reference: &str) -> String {
    resolver.resolve(reference).unwrap().canonical()
}

#[test]
fn test_tier_precedence() {
    let fixture = fixture();
    let config = ResolverConfig::default()
        .with_label_mapping("rxjs/operators", "//external:rxjs")
        .with_label_mapping("src/vendor/**", "//third_party:vendor")
        .with_label_mapping("fs", "//shims:fs");
    let mut resolver = Resolver::new(fixture.workspace("src/app"), config).unwrap();

    // static mappings beat every other tier
    assert_eq!(resolve(&mut resolver, "rxjs/operators"), "//external:rxjs");
    assert_eq!(resolve(&mut resolver, "fs"), "//shims:fs");
    assert_eq!(resolve(&mut resolver, "../vendor/legacy"), "//third_party:vendor");

    // then built-ins, then the external fallback
    assert_eq!(resolve(&mut resolver, "path"), "@npm//@types/node:node");
    assert_eq!(resolve(&mut resolver, "rxjs"), "@npm//rxjs:rxjs");
    assert_eq!(resolve(&mut resolver, "@ngrx/store/src/x"), "@npm//@ngrx/store:store");
}

#[test]
fn test_modes() {
    let fixture = fixture();
    let mut resolver =
        Resolver::new(fixture.workspace("src/app/app.module.ts"), ResolverConfig::default()).unwrap();

    assert_eq!(resolve(&mut resolver, "./app.component"), "//src/app:app");
    assert_eq!(
        resolver
            .resolve_with_mode("./app.component", ResolutionMode::Exact)
            .unwrap()
            .canonical(),
        "//src/app:app-component"
    );
    assert_eq!(resolve(&mut resolver, "../shared"), "//src/shared:shared");
}

#[test]
fn test_aliases_from_config() {
    let fixture = fixture();
    let config = Config {
        ts_config: Some("tsconfig.json".to_string()),
        pkg_default_dep_labels: Some(false),
        ..Default::default()
    };
    let workspace = config.workspace(fixture.root(), "src/app");
    let mut resolver =
        Resolver::new(workspace.clone(), config.resolver_config(&workspace).unwrap()).unwrap();

    assert_eq!(resolve(&mut resolver, "@shared/button"), "//src/shared:button");
    assert_eq!(resolve(&mut resolver, "@shared"), "//src/shared:index");
    assert_eq!(resolve(&mut resolver, "@shared-ui/core"), "@npm//@shared-ui/core:core");

    let aliases = PathAliases::from_tsconfig(&workspace, "tsconfig.json").unwrap();
    assert!(aliases.is_some());
}

#[test]
fn test_unresolvable_is_fatal() {
    let fixture = fixture();
    let mut resolver =
        Resolver::new(fixture.workspace("src/app"), ResolverConfig::default()).unwrap();

    let err = resolver
        .resolve_all(&["rxjs", "./does-not-exist", "fs"], ResolutionMode::PackageDefault)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnresolvableReferenceError { ref reference } if reference == "./does-not-exist"
    ));
}

struct FixedQuery(&'static str);

impl LabelQuery for FixedQuery {
    fn owning_rule(&self, file: &str) -> bzlgen_workspace::Result<Option<Label>> {
        if file.starts_with("src/shared/") {
            Label::parse_absolute(self.0).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[test]
fn test_query_owner_is_preferred_over_heuristics() {
    let fixture = fixture();
    let mut resolver = Resolver::new(fixture.workspace("src/app"), ResolverConfig::default())
        .unwrap()
        .with_query(Box::new(FixedQuery("//src/shared:ui")));

    assert_eq!(resolve(&mut resolver, "../shared/button"), "//src/shared:ui");
    assert_eq!(resolve(&mut resolver, "./app.module"), "//src/app:app");
}

#[test]
fn test_missing_query_binary_falls_back() {
    let fixture = fixture();
    let config = ResolverConfig {
        use_query: true,
        bazel_binary: "bzlgen-test-missing-bazel".to_string(),
        ..ResolverConfig::default()
    };
    let mut resolver = Resolver::new(fixture.workspace("src/app"), config).unwrap();

    assert_eq!(resolve(&mut resolver, "../shared/button"), "//src/shared:shared");
}
