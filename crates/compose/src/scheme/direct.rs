//! Direct (symbolic) schemes: `module:/` and `confdir:/`.
//!
//! The path encodes a fully-qualified fragment name. For `module:/` the
//! first segment selects the module (or `*` for all of them) and the
//! remaining segments form the rest of the name, so `module:/acme/default`
//! names the fragment `acme::default` inside module `acme`. For `confdir:/`
//! the whole path is the name, resolved against the confdir root.

use super::{SchemeHandler, split_first};
use std::sync::Arc;
use strata_core::{
    BindingReference, ComposeContext, ComposeError, Contribution, DiagnosticAcceptor,
    FragmentLoader, Result, WILDCARD,
};

/// Handler for `module:/<module-or-*>/<rest-of-qualified-name>`.
pub struct ModuleScheme {
    loader: Arc<dyn FragmentLoader>,
}

impl ModuleScheme {
    pub fn new(loader: Arc<dyn FragmentLoader>) -> Self {
        Self { loader }
    }
}

/// `["acme", "default"]` → `acme::default`.
fn qualified_name(segments: &[&str]) -> String {
    segments.join("::")
}

fn concrete(scheme: &str, segments: &[&str]) -> BindingReference {
    BindingReference::new(scheme, format!("/{}", segments.join("/")))
}

impl SchemeHandler for ModuleScheme {
    fn scheme(&self) -> &'static str {
        "module"
    }

    fn expand_included(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
    ) -> Result<Vec<BindingReference>> {
        let (first, rest) = split_first(reference)?;
        if first == WILDCARD {
            if rest.is_empty() {
                return Err(ComposeError::MalformedReference {
                    reference: reference.to_string(),
                    reason: "wildcard reference needs a fragment name after '*'".into(),
                });
            }
            let mut out = Vec::new();
            for module in ctx.modules.iter() {
                let mut segments = vec![module.name.as_str()];
                segments.extend(&rest);
                if self.loader.loadable(&module.root, &qualified_name(&segments)) {
                    out.push(concrete("module", &segments));
                }
            }
            return Ok(out);
        }

        let mut segments = vec![first];
        segments.extend(&rest);
        if self.is_optional(reference) {
            // Optional: only emit if the fragment is loadable right now.
            match ctx.modules.get(first) {
                Some(module)
                    if self.loader.loadable(&module.root, &qualified_name(&segments)) =>
                {
                    Ok(vec![concrete("module", &segments)])
                }
                _ => Ok(vec![]),
            }
        } else {
            // Required: emit unconditionally. Non-existence is deferred to
            // load time, where the reference may still have been excluded.
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
                out.push(concrete("module", &segments));
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
        _acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<Contribution> {
        let (first, rest) = split_first(reference)?;
        if first == WILDCARD {
            return Err(ComposeError::MalformedReference {
                reference: reference.to_string(),
                reason: "wildcard reference cannot be loaded directly".into(),
            });
        }
        let module =
            ctx.modules
                .get(first)
                .ok_or_else(|| ComposeError::BindingsNotFound {
                    reference: reference.to_string(),
                })?;
        let mut segments = vec![first];
        segments.extend(&rest);
        let name = qualified_name(&segments);
        let bindings = self.loader.load(&module.root, &name)?.ok_or_else(|| {
            ComposeError::BindingsNotFound {
                reference: reference.to_string(),
            }
        })?;
        Ok(Contribution::direct(reference.normalized(), bindings))
    }
}

/// Handler for `confdir:/<qualified-name>`.
pub struct ConfdirScheme {
    loader: Arc<dyn FragmentLoader>,
}

impl ConfdirScheme {
    pub fn new(loader: Arc<dyn FragmentLoader>) -> Self {
        Self { loader }
    }
}

impl SchemeHandler for ConfdirScheme {
    fn scheme(&self) -> &'static str {
        "confdir"
    }

    fn expand_included(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
    ) -> Result<Vec<BindingReference>> {
        let (first, rest) = split_first(reference)?;
        if first == WILDCARD {
            // The confdir is a single location: the wildcard expands to at
            // most one concrete reference, kept only if loadable.
            if rest.is_empty() {
                return Err(ComposeError::MalformedReference {
                    reference: reference.to_string(),
                    reason: "wildcard reference needs a fragment name after '*'".into(),
                });
            }
            if self.loader.loadable(&ctx.confdir, &qualified_name(&rest)) {
                return Ok(vec![concrete("confdir", &rest)]);
            }
            return Ok(vec![]);
        }

        let mut segments = vec![first];
        segments.extend(&rest);
        if self.is_optional(reference) {
            if self.loader.loadable(&ctx.confdir, &qualified_name(&segments)) {
                Ok(vec![concrete("confdir", &segments)])
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
        let (first, rest) = split_first(reference)?;
        if first == WILDCARD {
            Ok(vec![concrete("confdir", &rest)])
        } else {
            Ok(vec![reference.without_query()])
        }
    }

    fn contributed_bindings(
        &self,
        reference: &BindingReference,
        ctx: &ComposeContext,
        _acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<Contribution> {
        let (first, rest) = split_first(reference)?;
        let mut segments = vec![first];
        segments.extend(&rest);
        let name = qualified_name(&segments);
        let bindings = self.loader.load(&ctx.confdir, &name)?.ok_or_else(|| {
            ComposeError::BindingsNotFound {
                reference: reference.to_string(),
            }
        })?;
        Ok(Contribution::direct(reference.normalized(), bindings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFragmentLoader;
    use strata_core::{Bindings, DiagnosticLog, ModuleDescriptor, ModuleIndex};

    fn ctx() -> ComposeContext {
        let modules: ModuleIndex = [
            ModuleDescriptor::new("acme", "/modules/acme"),
            ModuleDescriptor::new("beta", "/modules/beta"),
            ModuleDescriptor::new("gamma", "/modules/gamma"),
        ]
        .into_iter()
        .collect();
        ComposeContext::new("web01", "/etc/strata").with_modules(modules)
    }

    fn loader() -> MemoryFragmentLoader {
        let mut loader = MemoryFragmentLoader::new();
        loader.insert("/modules/acme", "acme::default", Bindings::empty("acme"));
        loader.insert("/modules/beta", "beta::default", Bindings::empty("beta"));
        loader.insert("/etc/strata", "default", Bindings::empty("confdir"));
        loader
    }

    fn module_scheme() -> ModuleScheme {
        ModuleScheme::new(Arc::new(loader()))
    }

    fn confdir_scheme() -> ConfdirScheme {
        ConfdirScheme::new(Arc::new(loader()))
    }

    #[test]
    fn wildcard_expands_to_loadable_modules_only() {
        let reference = BindingReference::parse("module:/*/default").unwrap();
        let out = module_scheme().expand_included(&reference, &ctx()).unwrap();
        // Three known modules, two with a loadable "default" fragment.
        let forms: Vec<_> = out.iter().map(|r| r.normalized()).collect();
        assert_eq!(forms, vec!["module:/acme/default", "module:/beta/default"]);
    }

    #[test]
    fn wildcard_without_name_is_malformed() {
        let reference = BindingReference::parse("module:/*").unwrap();
        assert!(matches!(
            module_scheme().expand_included(&reference, &ctx()),
            Err(ComposeError::MalformedReference { .. })
        ));
    }

    #[test]
    fn required_reference_is_emitted_even_if_missing() {
        let reference = BindingReference::parse("module:/gamma/default").unwrap();
        let out = module_scheme().expand_included(&reference, &ctx()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].normalized(), "module:/gamma/default");
    }

    #[test]
    fn optional_reference_is_dropped_if_missing() {
        let reference = BindingReference::parse("module:/gamma/default?").unwrap();
        let out = module_scheme().expand_included(&reference, &ctx()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn optional_reference_is_kept_if_loadable() {
        let reference = BindingReference::parse("module:/acme/default?optional").unwrap();
        let out = module_scheme().expand_included(&reference, &ctx()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].query, None);
    }

    #[test]
    fn exclude_wildcard_expands_per_module_unconditionally() {
        let reference = BindingReference::parse("module:/*/default").unwrap();
        let out = module_scheme().expand_excluded(&reference, &ctx()).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn exclude_strips_optionality() {
        let reference = BindingReference::parse("module:/acme/default?optional").unwrap();
        let out = module_scheme().expand_excluded(&reference, &ctx()).unwrap();
        assert_eq!(out, vec![BindingReference::parse("module:/acme/default").unwrap()]);
    }

    #[test]
    fn load_returns_contribution_without_categories() {
        let reference = BindingReference::parse("module:/acme/default").unwrap();
        let log = DiagnosticLog::new();
        let c = module_scheme()
            .contributed_bindings(&reference, &ctx(), &log)
            .unwrap();
        assert_eq!(c.source_id, "module:/acme/default");
        assert!(c.effective_categories.is_none());
    }

    #[test]
    fn load_missing_required_is_fatal() {
        let reference = BindingReference::parse("module:/gamma/default").unwrap();
        let log = DiagnosticLog::new();
        let err = module_scheme()
            .contributed_bindings(&reference, &ctx(), &log)
            .unwrap_err();
        assert!(matches!(err, ComposeError::BindingsNotFound { .. }));
    }

    #[test]
    fn load_unknown_module_is_fatal() {
        let reference = BindingReference::parse("module:/nosuch/default").unwrap();
        let log = DiagnosticLog::new();
        assert!(matches!(
            module_scheme().contributed_bindings(&reference, &ctx(), &log),
            Err(ComposeError::BindingsNotFound { .. })
        ));
    }

    #[test]
    fn confdir_loads_by_qualified_name() {
        let reference = BindingReference::parse("confdir:/default").unwrap();
        let log = DiagnosticLog::new();
        let c = confdir_scheme()
            .contributed_bindings(&reference, &ctx(), &log)
            .unwrap();
        assert_eq!(c.source_id, "confdir:/default");
    }

    #[test]
    fn confdir_optional_missing_is_dropped() {
        let reference = BindingReference::parse("confdir:/nosuch?").unwrap();
        let out = confdir_scheme().expand_included(&reference, &ctx()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn confdir_wildcard_expands_against_single_root() {
        let reference = BindingReference::parse("confdir:/*/default").unwrap();
        let out = confdir_scheme().expand_included(&reference, &ctx()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].normalized(), "confdir:/default");
    }
}
