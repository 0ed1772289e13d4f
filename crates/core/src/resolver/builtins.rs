//! Platform built-in modules that map straight to a fixed label

use crate::error::Result;
use crate::label::Label;
use std::collections::HashMap;

/// Node.js core modules
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

const NODE_SCHEME: &str = "node:";

#[derive(Debug, Clone, Default)]
pub struct BuiltinModules {
    modules: HashMap<String, Label>,
}

impl BuiltinModules {
    /// Node core modules, all satisfied by `@<workspace>//@types/node`
    pub fn node(external_workspace: &str) -> Result<Self> {
        let types = Label::parse_absolute(&format!("@{external_workspace}//@types/node"))?;
        Ok(Self {
            modules: NODE_BUILTINS
                .iter()
                .map(|name| (name.to_string(), types.clone()))
                .collect(),
        })
    }

    pub fn insert(&mut self, name: impl Into<String>, label: Label) {
        self.modules.insert(name.into(), label);
    }

    /// Exact lookup, `node:fs` is treated like `fs`
    pub fn get(&self, reference: &str) -> Option<&Label> {
        let name = reference.strip_prefix(NODE_SCHEME).unwrap_or(reference);
        self.modules.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_builtins() {
        let builtins = BuiltinModules::node("npm").unwrap();
        assert_eq!(builtins.get("fs").unwrap().canonical(), "@npm//@types/node:node");
        assert_eq!(builtins.get("node:path").unwrap().canonical(), "@npm//@types/node:node");
        assert!(builtins.get("fs/promises").is_none());
        assert!(builtins.get("rxjs").is_none());
    }

    #[test]
    fn test_overrides() {
        let mut builtins = BuiltinModules::node("npm").unwrap();
        builtins.insert("fs", Label::parse_absolute("//shims:fs").unwrap());
        assert_eq!(builtins.get("fs").unwrap().canonical(), "//shims:fs");
        assert!(BuiltinModules::default().get("fs").is_none());
    }
}
