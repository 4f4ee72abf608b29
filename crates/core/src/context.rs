//! The per-call composition context.
//!
//! There is no ambient global state in strata: the confdir, the module
//! index and the node facts are bundled into an explicit [`ComposeContext`]
//! constructed once by the caller and threaded through every handler call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A module visible to the current environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub root: PathBuf,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// Read-only index of all modules, built once per composition call.
///
/// Backed by a `BTreeMap` so iteration (and therefore wildcard expansion)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleIndex {
    modules: BTreeMap<String, ModuleDescriptor>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: ModuleDescriptor) {
        self.modules.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(name)
    }

    /// All modules, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl FromIterator<ModuleDescriptor> for ModuleIndex {
    fn from_iter<I: IntoIterator<Item = ModuleDescriptor>>(iter: I) -> Self {
        let mut index = Self::new();
        for d in iter {
            index.insert(d);
        }
        index
    }
}

/// Everything a composition run needs to know about its environment.
#[derive(Debug, Clone)]
pub struct ComposeContext {
    /// The node this composition is for (available as `name` in
    /// categorization expressions).
    pub node: String,

    /// The configuration directory root.
    pub confdir: PathBuf,

    /// Modules visible to this run. Immutable after construction.
    pub modules: ModuleIndex,

    /// Node facts, available to expressions as `facts.<dotted.path>`.
    pub facts: serde_json::Value,
}

impl ComposeContext {
    pub fn new(node: impl Into<String>, confdir: impl Into<PathBuf>) -> Self {
        Self {
            node: node.into(),
            confdir: confdir.into(),
            modules: ModuleIndex::new(),
            facts: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_modules(mut self, modules: ModuleIndex) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_facts(mut self, facts: serde_json::Value) -> Self {
        self.facts = facts;
        self
    }

    /// Look up a fact by dotted path, e.g. `os.family`.
    pub fn fact(&self, path: &str) -> Option<&serde_json::Value> {
        let mut current = &self.facts;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_index_iterates_sorted() {
        let index: ModuleIndex = [
            ModuleDescriptor::new("zeta", "/m/zeta"),
            ModuleDescriptor::new("acme", "/m/acme"),
        ]
        .into_iter()
        .collect();
        let names: Vec<_> = index.names().collect();
        assert_eq!(names, vec!["acme", "zeta"]);
    }

    #[test]
    fn fact_lookup_walks_dotted_paths() {
        let ctx = ComposeContext::new("web01", "/etc/strata").with_facts(serde_json::json!({
            "osfamily": "Debian",
            "os": { "release": { "major": "12" } }
        }));
        assert_eq!(ctx.fact("osfamily").and_then(|v| v.as_str()), Some("Debian"));
        assert_eq!(
            ctx.fact("os.release.major").and_then(|v| v.as_str()),
            Some("12")
        );
        assert!(ctx.fact("os.missing").is_none());
    }
}
