//! Path alias rewriting, following tsconfig `compilerOptions.paths`
//!
//! Patterns contain at most one `*`. The pattern with the longest literal
//! prefix is tried first, and within a pattern each substitution is tried
//! in order until one lands on an existing file.

use crate::error::{Error, Result};
use crate::workspace::{Workspace, join_path, normalize_path, parent_dir};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfig {
    #[serde(default)]
    compiler_options: CompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    base_url: Option<String>,
    paths: Option<IndexMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq)]
struct PathAlias {
    prefix: String,
    suffix: Option<String>,
    substitutions: Vec<String>,
}

impl PathAlias {
    fn parse(pattern: &str, substitutions: Vec<String>) -> Self {
        match pattern.split_once('*') {
            Some((prefix, suffix)) => Self {
                prefix: prefix.to_string(),
                suffix: Some(suffix.to_string()),
                substitutions,
            },
            None => Self {
                prefix: pattern.to_string(),
                suffix: None,
                substitutions,
            },
        }
    }

    /// The text captured by `*`, or an empty capture for exact patterns
    fn capture<'a>(&self, reference: &'a str) -> Option<&'a str> {
        match &self.suffix {
            None => (reference == self.prefix).then_some(""),
            Some(suffix) => {
                if reference.len() < self.prefix.len() + suffix.len() {
                    return None;
                }
                reference
                    .strip_prefix(self.prefix.as_str())
                    .and_then(|rest| rest.strip_suffix(suffix.as_str()))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathAliases {
    base_url: String,
    aliases: Vec<PathAlias>,
}

impl PathAliases {
    /// `base_url` is workspace relative, empty for the workspace root
    pub fn new<I>(base_url: &str, paths: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let mut aliases: Vec<PathAlias> = paths
            .into_iter()
            .map(|(pattern, substitutions)| PathAlias::parse(&pattern, substitutions))
            .collect();
        aliases.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        Self {
            base_url: normalize_path(base_url),
            aliases,
        }
    }

    /// Read `compilerOptions.paths` from a tsconfig file given relative to the
    /// workspace. Returns `None` when the file declares no paths.
    pub fn from_tsconfig(workspace: &Workspace, tsconfig: &str) -> Result<Option<Self>> {
        let tsconfig = normalize_path(tsconfig);
        let contents = fs::read_to_string(workspace.base_dir().join(&tsconfig)).map_err(|e| {
            Error::ConfigError(format!("failed to load tsconfig.json from {tsconfig}: {e}"))
        })?;
        Self::from_tsconfig_str(&contents, parent_dir(&tsconfig))
    }

    pub fn from_tsconfig_str(contents: &str, tsconfig_dir: &str) -> Result<Option<Self>> {
        let config: TsConfig = serde_json::from_str(&strip_jsonc(contents))?;
        let Some(paths) = config.compiler_options.paths else {
            return Ok(None);
        };

        let base_url = match config.compiler_options.base_url {
            Some(base_url) => join_path(tsconfig_dir, &base_url),
            None => tsconfig_dir.to_string(),
        };

        Ok(Some(Self::new(&base_url, paths)))
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Rewrite `reference` to a workspace-relative path (without extension)
    /// when an alias matches and the target exists
    pub fn rewrite(
        &self,
        reference: &str,
        workspace: &Workspace,
        extension: &str,
        directory_index: &str,
    ) -> Option<String> {
        for alias in &self.aliases {
            let Some(captured) = alias.capture(reference) else {
                continue;
            };

            for substitution in &alias.substitutions {
                let candidate =
                    normalize_path(&join_path(&self.base_url, &substitution.replacen('*', captured, 1)));
                let root = workspace.base_dir();

                let exists = root.join(format!("{candidate}{extension}")).is_file()
                    || root.join(&candidate).is_file()
                    || root.join(&candidate).join(directory_index).is_file();

                if exists {
                    tracing::debug!("Rewrote {} to {} using path aliases", reference, candidate);
                    return Some(candidate);
                }
            }
        }

        None
    }
}

/// Reduce tsconfig's JSON-with-comments dialect to plain JSON: `//` and
/// `/* */` comments are dropped along with commas before a closing bracket.
/// String contents pass through untouched.
fn strip_jsonc(contents: &str) -> String {
    let mut out = String::with_capacity(contents.len());
    let mut chars = contents.chars().peekable();
    // offset in `out` of a comma that may turn out to be trailing
    let mut pending_comma: Option<usize> = None;

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                pending_comma = None;
                out.push(c);
                while let Some(c) = chars.next() {
                    out.push(c);
                    match c {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                out.push(escaped);
                            }
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push(c);
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                for c in chars.by_ref() {
                    if previous == '*' && c == '/' {
                        break;
                    }
                    previous = c;
                }
                out.push(' ');
            }
            ',' => {
                pending_comma = Some(out.len());
                out.push(c);
            }
            '}' | ']' => {
                if let Some(offset) = pending_comma.take() {
                    out.replace_range(offset..offset + 1, " ");
                }
                out.push(c);
            }
            c if c.is_whitespace() => out.push(c),
            c => {
                pending_comma = None;
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Workspace) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/lib/util")).unwrap();
        fs::create_dir_all(root.join("src/app")).unwrap();
        fs::write(root.join("src/lib/util/strings.ts"), "").unwrap();
        fs::write(root.join("src/lib/util/index.ts"), "").unwrap();
        fs::write(root.join("src/app/main.ts"), "").unwrap();
        let workspace = Workspace::new(root, "src/app");
        (temp, workspace)
    }

    #[test]
    fn test_wildcard_alias() {
        let (_temp, workspace) = fixture();
        let aliases = PathAliases::new(
            "",
            [("@lib/*".to_string(), vec!["src/lib/*".to_string()])],
        );

        assert_eq!(
            aliases.rewrite("@lib/util/strings", &workspace, ".ts", "index.ts"),
            Some("src/lib/util/strings".to_string())
        );
        assert_eq!(
            aliases.rewrite("@lib/util", &workspace, ".ts", "index.ts"),
            Some("src/lib/util".to_string())
        );
        assert_eq!(aliases.rewrite("@lib/missing", &workspace, ".ts", "index.ts"), None);
        assert_eq!(aliases.rewrite("rxjs", &workspace, ".ts", "index.ts"), None);
    }

    #[test]
    fn test_exact_alias_and_fallback_substitutions() {
        let (_temp, workspace) = fixture();
        let aliases = PathAliases::new(
            "src",
            [
                ("app".to_string(), vec!["app/main".to_string()]),
                (
                    "~/*".to_string(),
                    vec!["missing/*".to_string(), "lib/*".to_string()],
                ),
            ],
        );

        assert_eq!(
            aliases.rewrite("app", &workspace, ".ts", "index.ts"),
            Some("src/app/main".to_string())
        );
        assert_eq!(
            aliases.rewrite("~/util/strings", &workspace, ".ts", "index.ts"),
            Some("src/lib/util/strings".to_string())
        );
        assert_eq!(aliases.rewrite("app/other", &workspace, ".ts", "index.ts"), None);
    }

    #[test]
    fn test_longest_prefix_first() {
        let aliases = PathAliases::new(
            "",
            [
                ("@lib/*".to_string(), vec!["a/*".to_string()]),
                ("@lib/util/*".to_string(), vec!["b/*".to_string()]),
            ],
        );
        assert_eq!(aliases.aliases[0].prefix, "@lib/util/");
    }

    #[test]
    fn test_from_tsconfig() {
        let (temp, workspace) = fixture();
        fs::write(
            temp.path().join("tsconfig.json"),
            r#"{
                "compilerOptions": {
                    "baseUrl": ".",
                    "paths": { "@lib/*": ["src/lib/*"] }
                }
            }"#,
        )
        .unwrap();

        let aliases = PathAliases::from_tsconfig(&workspace, "tsconfig.json")
            .unwrap()
            .unwrap();
        assert_eq!(aliases.base_url, "");
        assert_eq!(
            aliases.rewrite("@lib/util/strings", &workspace, ".ts", "index.ts"),
            Some("src/lib/util/strings".to_string())
        );
    }

    #[test]
    fn test_tsconfig_without_paths() {
        let aliases = PathAliases::from_tsconfig_str(r#"{ "compilerOptions": {} }"#, "").unwrap();
        assert!(aliases.is_none());

        let (_temp, workspace) = fixture();
        assert!(PathAliases::from_tsconfig(&workspace, "missing/tsconfig.json").is_err());
    }

    #[test]
    fn test_tsconfig_with_comments_and_trailing_commas() {
        let (_temp, workspace) = fixture();
        let tsconfig = r#"{
            // generated by the schematics
            "compilerOptions": {
                /* keep in sync with
                   the bundler */
                "baseUrl": "./",
                "paths": {
                    "@lib/*": ["src/lib/*",], // libraries
                    "http://*": ["src/app/*"],
                },
            },
        }"#;

        let aliases = PathAliases::from_tsconfig_str(tsconfig, "").unwrap().unwrap();
        assert_eq!(
            aliases.rewrite("@lib/util/strings", &workspace, ".ts", "index.ts"),
            Some("src/lib/util/strings".to_string())
        );
        assert_eq!(
            aliases.rewrite("http://main", &workspace, ".ts", "index.ts"),
            Some("src/app/main".to_string())
        );
    }

    #[test]
    fn test_strip_jsonc_keeps_string_contents() {
        assert_eq!(
            strip_jsonc(r#"{"a": "/* x */ // y", "b": "q\"," }"#),
            r#"{"a": "/* x */ // y", "b": "q\"  }"#
        );
    }
}
