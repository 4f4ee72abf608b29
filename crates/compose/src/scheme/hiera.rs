//! Hierarchical-source schemes: `module-hiera:/` and `confdir-hiera:/`.
//!
//! The path encodes a module name (or wildcard) plus a sub-path pointing at
//! a hierarchical data-source root, e.g. `module-hiera:/acme/windows` or
//! `confdir-hiera:/hiera.toml`. Existence checks and loading are delegated
//! to the [`HieraProvider`] collaborator bound to the resolved location;
//! its contribution already carries its own effective categories and is
//! returned unmodified.

use super::{SchemeHandler, split_first};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_core::{
    BindingReference, ComposeContext, ComposeError, Contribution, DiagnosticAcceptor,
    HieraProvider, Result, WILDCARD,
};

fn resolve(root: &Path, segments: &[&str]) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    path
}

fn concrete(scheme: &str, segments: &[&str]) -> BindingReference {
    BindingReference::new(scheme, format!("/{}", segments.join("/")))
}

/// Handler for `module-hiera:/<module-or-*>/<sub-path>`.
pub struct ModuleHieraScheme {
    provider: Arc<dyn HieraProvider>,
}

impl ModuleHieraScheme {
    pub fn new(provider: Arc<dyn HieraProvider>) -> Self {
        Self { provider }
    }
}

impl SchemeHandler for ModuleHieraScheme {
    fn scheme(&self) -> &'static str {
        "module-hiera"
    }

    fn expand_included(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
    ) -> Result<Vec<BindingReference>> {
        let (first, rest) = split_first(reference)?;
        if first == WILDCARD {
            let mut out = Vec::new();
            for module in ctx.modules.iter() {
                if self.provider.loadable(&resolve(&module.root, &rest)) {
                    let mut segments = vec![module.name.as_str()];
                    segments.extend(&rest);
                    out.push(concrete("module-hiera", &segments));
                }
            }
            return Ok(out);
        }

        if self.is_optional(reference) {
            match ctx.modules.get(first) {
                Some(module) if self.provider.loadable(&resolve(&module.root, &rest)) => {
                    let mut segments = vec![first];
                    segments.extend(&rest);
                    Ok(vec![concrete("module-hiera", &segments)])
                }
                _ => Ok(vec![]),
            }
        } else {
            Ok(vec![reference.without_query()])
        }
    }

    fn expand_excluded(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
    ) -> Result<Vec<BindingReference>> {
        let (first, rest) = split_first(reference)?;
        if first == WILDCARD {
            let mut out = Vec::new();
            for module in ctx.modules.iter() {
                let mut segments = vec![module.name.as_str()];
                segments.extend(&rest);
                out.push(concrete("module-hiera", &segments));
            }
            Ok(out)
        } else {
            Ok(vec![reference.without_query()])
        }
    }

    fn contributed_bindings(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
        acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<Contribution> {
        let (first, rest) = split_first(reference)?;
        let module =
            ctx.modules
                .get(first)
                .ok_or_else(|| ComposeError::BindingsNotFound {
                    reference: reference.to_string(),
                })?;
        let resolved = resolve(&module.root, &rest);
        self.provider
            .load(&reference.normalized(), &resolved, ctx, acceptor)
    }
}

/// Handler for `confdir-hiera:/<sub-path>`.
pub struct ConfdirHieraScheme {
    provider: Arc<dyn HieraProvider>,
}

impl ConfdirHieraScheme {
    pub fn new(provider: Arc<dyn HieraProvider>) -> Self {
        Self { provider }
    }
}

impl ConfdirHieraScheme {
    /// Sub-path segments, with a leading wildcard collapsed away — the
    /// confdir is a single location, mirroring the direct confdir scheme.
    fn sub_path<'a>(&self, reference: &'a BindingReference) -> Result<Vec<&'a str>> {
        let (first, rest) = split_first(reference)?;
        if first == WILDCARD {
            if rest.is_empty() {
                return Err(ComposeError::MalformedReference {
                    reference: reference.to_string(),
                    reason: "wildcard reference needs a sub-path after '*'".into(),
                });
            }
            Ok(rest)
        } else {
            let mut segments = vec![first];
            segments.extend(&rest);
            Ok(segments)
        }
    }
}

impl SchemeHandler for ConfdirHieraScheme {
    fn scheme(&self) -> &'static str {
        "confdir-hiera"
    }

    fn expand_included(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
    ) -> Result<Vec<BindingReference>> {
        let segments = self.sub_path(reference)?;
        if self.is_optional(reference) || reference.is_wildcard() {
            if self.provider.loadable(&resolve(&ctx.confdir, &segments)) {
                Ok(vec![concrete("confdir-hiera", &segments)])
            } else {
                Ok(vec![])
            }
        } else {
            Ok(vec![reference.without_query()])
        }
    }

    fn expand_excluded(
        &self,
        reference: &BindingReference,
        _ctx: &ComposeContext,
    ) -> Result<Vec<BindingReference>> {
        let segments = self.sub_path(reference)?;
        Ok(vec![concrete("confdir-hiera", &segments)])
    }

    fn contributed_bindings(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
        acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<Contribution> {
        let segments = self.sub_path(reference)?;
        let resolved = resolve(&ctx.confdir, &segments);
        self.provider
            .load(&reference.normalized(), &resolved, ctx, acceptor)
    }
}
