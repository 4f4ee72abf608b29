//! Per-layer resource-set resolution.
//!
//! A layer's effective reference set is `expand(include) − expand(exclude)`.
//! Both sides are expanded independently before the difference is taken, so
//! an exclude wildcard removes entries an include wildcard would otherwise
//! add even when the two were written with different surface syntax (e.g.
//! `module:/*/foo` versus an explicit `module:/bar/foo`).

use crate::scheme::SchemeRegistry;
use std::collections::HashSet;
use strata_config::LayerSpec;
use strata_core::{
    BindingReference, ComposeContext, Contribution, DiagnosticAcceptor, Result,
};
use tracing::debug;

enum Mode {
    Include,
    Exclude,
}

/// Resolves one layer specification into its contributions.
pub struct LayerResolver<'a> {
    registry: &'a SchemeRegistry,
}

impl<'a> LayerResolver<'a> {
    pub fn new(registry: &'a SchemeRegistry) -> Self {
        Self { registry }
    }

    /// Expand include and exclude sets, take the difference, and load one
    /// contribution per surviving reference.
    pub fn resolve(
        &self,
        spec: &LayerSpec,
        ctx: &ComposeContext,
        acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<Vec<Contribution>> {
        let included = self.expand(&spec.include, Mode::Include, ctx)?;
        let excluded = self.expand(&spec.exclude, Mode::Exclude, ctx)?;

        // Set difference over normalized forms. Duplicates collapse; the
        // first-seen order of the include expansion is kept so composition
        // stays deterministic.
        let excluded_keys: HashSet<String> =
            excluded.iter().map(BindingReference::normalized).collect();
        let mut seen = HashSet::new();
        let mut effective = Vec::new();
        for reference in included {
            let key = reference.normalized();
            if excluded_keys.contains(&key) || !seen.insert(key) {
                continue;
            }
            effective.push(reference);
        }

        debug!(
            layer = %spec.name,
            effective = effective.len(),
            excluded = excluded_keys.len(),
            "layer reference set resolved"
        );

        effective
            .iter()
            .map(|reference| {
                self.registry
                    .get(reference)?
                    .contributed_bindings(reference, ctx, acceptor)
            })
            .collect()
    }

    fn expand(
        &self,
        entries: &[String],
        mode: Mode,
        ctx: &ComposeContext,
    ) -> Result<Vec<BindingReference>> {
        let mut out = Vec::new();
        for entry in entries {
            let reference = BindingReference::parse(entry)?;
            // Unknown schemes become fatal here, at dispatch time.
            let handler = self.registry.get(&reference)?;
            let expanded = match mode {
                Mode::Include => handler.expand_included(&reference, ctx)?,
                Mode::Exclude => handler.expand_excluded(&reference, ctx)?,
            };
            out.extend(expanded);
        }
        Ok(out)
    }
}
