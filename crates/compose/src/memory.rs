//! In-memory collaborator implementations, for tests and for embedding the
//! engine without a filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use strata_core::{
    Bindings, CategorySet, ComposeContext, ComposeError, Contribution, DiagnosticAcceptor,
    FragmentLoader, HieraProvider, Layer, Result, SystemBindings,
};

/// A fragment loader backed by a map of `(root, qualified name)` pairs.
#[derive(Debug, Default)]
pub struct MemoryFragmentLoader {
    fragments: HashMap<(PathBuf, String), Bindings>,
}

impl MemoryFragmentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        root: impl Into<PathBuf>,
        qualified_name: impl Into<String>,
        bindings: Bindings,
    ) {
        self.fragments
            .insert((root.into(), qualified_name.into()), bindings);
    }
}

impl FragmentLoader for MemoryFragmentLoader {
    fn load(&self, root: &Path, qualified_name: &str) -> Result<Option<Bindings>> {
        // Cloned: the caller owns its copy.
        Ok(self
            .fragments
            .get(&(root.to_path_buf(), qualified_name.to_string()))
            .cloned())
    }

    fn loadable(&self, root: &Path, qualified_name: &str) -> bool {
        self.fragments
            .contains_key(&(root.to_path_buf(), qualified_name.to_string()))
    }
}

/// A hierarchical-data provider backed by a map of resolved paths.
#[derive(Debug, Default)]
pub struct MemoryHieraProvider {
    sources: HashMap<PathBuf, (CategorySet, serde_json::Value)>,
}

impl MemoryHieraProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        resolved_path: impl Into<PathBuf>,
        categories: CategorySet,
        data: serde_json::Value,
    ) {
        self.sources.insert(resolved_path.into(), (categories, data));
    }
}

impl HieraProvider for MemoryHieraProvider {
    fn loadable(&self, resolved_path: &Path) -> bool {
        self.sources.contains_key(resolved_path)
    }

    fn load(
        &self,
        source_id: &str,
        resolved_path: &Path,
        _ctx: &ComposeContext,
        _acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<Contribution> {
        let (categories, data) =
            self.sources
                .get(resolved_path)
                .ok_or_else(|| ComposeError::BindingsNotFound {
                    reference: source_id.to_string(),
                })?;
        Ok(Contribution::with_categories(
            source_id,
            Bindings::new(source_id, data.clone()),
            categories.clone(),
        ))
    }
}

/// System bindings with fixed final/default layers.
#[derive(Debug, Clone)]
pub struct StaticSystemBindings {
    final_layer: Layer,
    default_layer: Layer,
}

impl StaticSystemBindings {
    pub fn new(final_layer: Layer, default_layer: Layer) -> Self {
        Self {
            final_layer,
            default_layer,
        }
    }
}

impl Default for StaticSystemBindings {
    fn default() -> Self {
        Self::new(Layer::new("final"), Layer::new("default"))
    }
}

impl SystemBindings for StaticSystemBindings {
    fn final_layer(&self) -> Layer {
        self.final_layer.clone()
    }

    fn default_layer(&self) -> Layer {
        self.default_layer.clone()
    }
}
