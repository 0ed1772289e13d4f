//! User supplied glob to label mappings

use crate::error::Result;
use crate::label::Label;
use globset::GlobBuilder;
use regex::bytes::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct StaticMapping {
    pattern: String,
    regex: Regex,
    label: Label,
}

/// Ordered glob to label table.
///
/// The first pattern that matches wins, regardless of how specific a later
/// pattern is. Put narrower globs first.
#[derive(Debug, Clone, Default)]
pub struct StaticMappings {
    mappings: Vec<StaticMapping>,
    cache: HashMap<String, Option<Label>>,
}

impl StaticMappings {
    /// Compile every `(glob, label)` pair once, in declaration order
    pub fn new<I, P, L>(mappings: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, L)>,
        P: AsRef<str>,
        L: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for (pattern, label) in mappings {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
            compiled.push(StaticMapping {
                pattern: pattern.to_string(),
                regex: Regex::new(glob.regex())?,
                label: Label::parse_absolute(label.as_ref())?,
            });
        }

        Ok(Self {
            mappings: compiled,
            cache: HashMap::new(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Label of the first mapping matching the workspace-relative `reference`.
    /// Misses are memoized as well as hits.
    pub fn lookup(&mut self, reference: &str) -> Option<Label> {
        if let Some(cached) = self.cache.get(reference) {
            return cached.clone();
        }

        let found = self
            .mappings
            .iter()
            .find(|mapping| mapping.regex.is_match(reference.as_bytes()));

        if let Some(mapping) = found {
            tracing::debug!("{} matched static mapping {}", reference, mapping.pattern);
        }

        let label = found.map(|mapping| mapping.label.clone());
        self.cache.insert(reference.to_string(), label.clone());
        label
    }
}
