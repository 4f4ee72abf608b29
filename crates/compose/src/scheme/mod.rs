//! Scheme handler protocol and registry.
//!
//! Each reference scheme (`module`, `confdir`, `module-hiera`,
//! `confdir-hiera`) has one handler that knows how to expand a
//! possibly-wildcarded or optional reference into concrete references, and
//! how to load the fragment behind a concrete reference. Handlers are
//! registered in a [`SchemeRegistry`] keyed by scheme name; looking up an
//! unregistered scheme is the fatal `UnknownScheme` condition.

mod direct;
mod hiera;

pub use direct::{ConfdirScheme, ModuleScheme};
pub use hiera::{ConfdirHieraScheme, ModuleHieraScheme};

use std::collections::HashMap;
use std::sync::Arc;
use strata_core::{
    BindingReference, ComposeContext, ComposeError, Contribution, DiagnosticAcceptor,
    FragmentLoader, HieraProvider, Result,
};

/// The capability set every scheme handler implements.
pub trait SchemeHandler: Send + Sync {
    /// The scheme this handler resolves.
    fn scheme(&self) -> &'static str;

    /// Shared optionality rule: query is empty or the literal "optional".
    fn is_optional(&self, reference: &BindingReference) -> bool {
        reference.is_optional()
    }

    /// Expand an include reference into zero or more concrete references
    /// (wildcard expansion, optional-existence filtering). Outputs are
    /// normalized — query and trailing slash stripped.
    fn expand_included(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
    ) -> Result<Vec<BindingReference>>;

    /// Expand an exclude reference. Exclusion is a pure identity match, so
    /// expansion is unconditional — existence is irrelevant.
    fn expand_excluded(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
    ) -> Result<Vec<BindingReference>>;

    /// Load the fragment behind one concrete reference.
    fn contributed_bindings(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
        acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<Contribution>;
}

/// A registry of scheme handlers, built once per composition call.
pub struct SchemeRegistry {
    handlers: HashMap<String, Box<dyn SchemeHandler>>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The four standard handlers wired to the given collaborators.
    pub fn standard(loader: Arc<dyn FragmentLoader>, hiera: Arc<dyn HieraProvider>) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ModuleScheme::new(loader.clone())));
        registry.register(Box::new(ConfdirScheme::new(loader)));
        registry.register(Box::new(ModuleHieraScheme::new(hiera.clone())));
        registry.register(Box::new(ConfdirHieraScheme::new(hiera)));
        registry
    }

    /// Register a handler. Replaces any existing handler for the scheme.
    pub fn register(&mut self, handler: Box<dyn SchemeHandler>) {
        self.handlers.insert(handler.scheme().to_string(), handler);
    }

    /// Look up the handler for a reference. This is where an unknown scheme
    /// becomes fatal.
    pub fn get(&self, reference: &BindingReference) -> Result<&dyn SchemeHandler> {
        self.handlers
            .get(&reference.scheme)
            .map(|h| h.as_ref())
            .ok_or_else(|| ComposeError::UnknownScheme {
                scheme: reference.scheme.clone(),
                reference: reference.to_string(),
            })
    }

    /// Registered scheme names.
    pub fn schemes(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a reference path into its first segment and the remaining
/// segments, failing with `MalformedReference` when the first segment
/// (concrete name or wildcard marker) is missing.
pub(crate) fn split_first(reference: &BindingReference) -> Result<(&str, Vec<&str>)> {
    let mut segments = reference.segments();
    let first = segments
        .next()
        .ok_or_else(|| ComposeError::MalformedReference {
            reference: reference.to_string(),
            reason: "expected a name or '*' as the first path segment".into(),
        })?;
    Ok((first, segments.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryFragmentLoader, MemoryHieraProvider};

    #[test]
    fn standard_registry_has_all_four_schemes() {
        let registry = SchemeRegistry::standard(
            Arc::new(MemoryFragmentLoader::new()),
            Arc::new(MemoryHieraProvider::new()),
        );
        let mut schemes = registry.schemes();
        schemes.sort_unstable();
        assert_eq!(
            schemes,
            vec!["confdir", "confdir-hiera", "module", "module-hiera"]
        );
    }

    #[test]
    fn unknown_scheme_is_fatal_at_lookup() {
        let registry = SchemeRegistry::new();
        let reference = BindingReference::parse("bogus:/x").unwrap();
        let err = registry.get(&reference).err().unwrap();
        assert!(matches!(err, ComposeError::UnknownScheme { ref scheme, .. } if scheme == "bogus"));
    }

    #[test]
    fn split_first_rejects_empty_path() {
        let reference = BindingReference::parse("module:/").unwrap();
        assert!(matches!(
            split_first(&reference),
            Err(ComposeError::MalformedReference { .. })
        ));
    }
}
