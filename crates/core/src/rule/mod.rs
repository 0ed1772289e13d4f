//! Build rule instances and their lowering into buildozer commands

mod kinds;

pub use kinds::{BzlLibrary, Filegroup, NodejsBinary, SassBinary, SassLibrary, TsLibrary};

use crate::buildozer::Buildozer;
use crate::error::Result;
use crate::label::Label;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Value of a rule attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Emitted with `set attr "value"`
    Single(String),
    /// Emitted with `add attr v1 v2 ...`
    List(Vec<String>),
}

impl AttrValue {
    pub fn is_empty(&self) -> bool {
        match self {
            AttrValue::Single(value) => value.is_empty(),
            AttrValue::List(values) => values.is_empty(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Single(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Single(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Single(value.clone())
    }
}

impl From<Label> for AttrValue {
    fn from(value: Label) -> Self {
        AttrValue::Single(value.to_string())
    }
}

impl From<&Label> for AttrValue {
    fn from(value: &Label) -> Self {
        AttrValue::Single(value.to_string())
    }
}

impl<T: Into<String>> From<Vec<T>> for AttrValue {
    fn from(values: Vec<T>) -> Self {
        AttrValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<String>, const N: usize> From<[T; N]> for AttrValue {
    fn from(values: [T; N]) -> Self {
        AttrValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// One build rule: kind, identity, optional explicit load site and an
/// ordered set of attributes
#[derive(Debug, Clone)]
pub struct Rule {
    kind: String,
    label: Label,
    load: Option<String>,
    attrs: IndexMap<String, AttrValue>,
    private_attrs: HashMap<String, AttrValue>,
}

impl Rule {
    pub fn new(kind: impl Into<String>, label: Label) -> Self {
        Self {
            kind: kind.into(),
            label,
            load: None,
            attrs: IndexMap::new(),
            private_attrs: HashMap::new(),
        }
    }

    /// Create a rule at `//package_path:name`
    pub fn from_kind_and_name(
        kind: &str,
        package_path: &str,
        name: &str,
        load: Option<&str>,
    ) -> Result<Self> {
        let label = Label::parse_absolute(&format!("//{package_path}:{name}"))?;
        let mut rule = Self::new(kind, label);
        rule.load = load.map(str::to_string);
        Ok(rule)
    }

    /// Load the rule's symbol from `load` instead of the load site table
    pub fn with_load(mut self, load: impl Into<String>) -> Self {
        self.load = Some(load.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn load(&self) -> Option<&str> {
        self.load.as_deref()
    }

    /// Store an attribute, replacing any earlier value. Empty values are
    /// dropped without touching an earlier value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) -> &mut Self {
        let value = value.into();
        if value.is_empty() {
            return self;
        }
        self.attrs.insert(name.to_string(), value);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn set_srcs(&mut self, srcs: impl Into<AttrValue>) -> &mut Self {
        self.set_attr("srcs", srcs)
    }

    pub fn set_src(&mut self, src: impl Into<AttrValue>) -> &mut Self {
        self.set_attr("src", src)
    }

    pub fn set_deps(&mut self, deps: impl Into<AttrValue>) -> &mut Self {
        self.set_attr("deps", deps)
    }

    pub fn set_visibility(&mut self, visibility: impl Into<AttrValue>) -> &mut Self {
        self.set_attr("visibility", visibility)
    }

    pub fn set_data(&mut self, data: impl Into<AttrValue>) -> &mut Self {
        self.set_attr("data", data)
    }

    pub fn set_tags(&mut self, tags: impl Into<AttrValue>) -> &mut Self {
        self.set_attr("tags", tags)
    }

    /// Attributes carried along for other generators, never emitted
    pub fn set_private_attr(&mut self, name: &str, value: impl Into<AttrValue>) -> &mut Self {
        self.private_attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn get_private_attr(&self, name: &str) -> Option<&AttrValue> {
        self.private_attrs.get(name)
    }

    /// Lower the rule into `buildozer`: a load (when the kind has a load
    /// site), the rule itself, then one command per attribute in the order
    /// they were first set
    pub fn to_commands(&self, buildozer: &mut Buildozer) {
        let location = self.label.package_label();
        match &self.load {
            Some(load) => buildozer.new_load(load, &self.kind, &location),
            None => buildozer.load_rule(&self.kind, &location),
        }

        buildozer.new_rule(&self.kind, &self.label);

        for (name, value) in &self.attrs {
            match value {
                AttrValue::List(values) => buildozer.add_attr(name, values, &self.label),
                AttrValue::Single(value) => buildozer.set_attr(name, value, &self.label),
            }
        }
    }
}
