//! Typed wrappers for the rule kinds bzlgen knows how to generate
//!
//! Each wrapper dereferences to [`Rule`] for the common setters and adds the
//! named setters specific to its kind.

use super::{AttrValue, Rule};
use crate::label::Label;
use std::ops::{Deref, DerefMut};

macro_rules! rule_kind {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(Rule);

        impl $name {
            pub const KIND: &'static str = $kind;

            pub fn new(label: Label) -> Self {
                Self(Rule::new($kind, label))
            }

            pub fn into_rule(self) -> Rule {
                self.0
            }
        }

        impl Deref for $name {
            type Target = Rule;

            fn deref(&self) -> &Rule {
                &self.0
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Rule {
                &mut self.0
            }
        }

        impl From<$name> for Rule {
            fn from(rule: $name) -> Rule {
                rule.0
            }
        }
    };
}

rule_kind!(
    /// `ts_library` from rules_typescript
    TsLibrary,
    "ts_library"
);

rule_kind!(SassLibrary, "sass_library");

rule_kind!(
    /// `sass_binary`, compiles a single entry point
    SassBinary,
    "sass_binary"
);

rule_kind!(
    /// Native `filegroup`
    Filegroup,
    "filegroup"
);

rule_kind!(BzlLibrary, "bzl_library");

rule_kind!(NodejsBinary, "nodejs_binary");

impl TsLibrary {
    pub fn set_tsconfig(&mut self, tsconfig: impl Into<AttrValue>) -> &mut Self {
        self.0.set_attr("tsconfig", tsconfig);
        self
    }
}

impl NodejsBinary {
    pub fn set_entry_point(&mut self, entry_point: impl Into<AttrValue>) -> &mut Self {
        self.0.set_attr("entry_point", entry_point);
        self
    }
}
