//! The composition engine.
//!
//! A [`Composer`] binds a validated configuration to a set of collaborators
//! (fragment loader, hiera provider, system bindings) and turns a
//! [`ComposeContext`] into a [`LayeredBindings`] result. Construction
//! compiles the categorization expressions; every `compose` call is a full
//! pass with no caching, so two calls with equal contexts yield equal
//! results.

use crate::categories::CategoryEvaluator;
use crate::precedence::check_precedence;
use crate::resolver::LayerResolver;
use crate::scheme::SchemeRegistry;
use std::sync::Arc;
use strata_config::ComposerConfig;
use strata_core::{
    CategorySet, ComposeContext, Contribution, DiagnosticAcceptor, FragmentLoader, HieraProvider,
    Layer, LayeredBindings, Result, SystemBindings,
};
use tracing::{debug, info};
use uuid::Uuid;

pub struct Composer {
    config: ComposerConfig,
    evaluator: CategoryEvaluator,
    loader: Arc<dyn FragmentLoader>,
    hiera: Arc<dyn HieraProvider>,
    system: Arc<dyn SystemBindings>,
}

impl Composer {
    /// Build a composer. Categorization expressions are compiled here, so a
    /// bad expression fails construction rather than the first compose call.
    pub fn new(
        config: ComposerConfig,
        loader: Arc<dyn FragmentLoader>,
        hiera: Arc<dyn HieraProvider>,
        system: Arc<dyn SystemBindings>,
    ) -> Result<Self> {
        let evaluator = CategoryEvaluator::new(&config.categorization)?;
        Ok(Self {
            config,
            evaluator,
            loader,
            hiera,
            system,
        })
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Evaluate the categorization rules for a context, without composing.
    pub fn effective_categories(&self, ctx: &ComposeContext) -> Result<CategorySet> {
        self.evaluator.evaluate(ctx)
    }

    /// Run one composition: resolve every configured layer, check category
    /// precedence across all contributions, and assemble the final layered
    /// structure between the two system layers.
    ///
    /// Precedence violations are reported through `acceptor` and do not
    /// abort the run; only resolution and loading failures are fatal.
    pub fn compose(
        &self,
        ctx: &ComposeContext,
        acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<LayeredBindings> {
        let run_id = Uuid::new_v4();
        debug!(
            %run_id,
            node = %ctx.node,
            layers = self.config.layering.len(),
            modules = ctx.modules.len(),
            "composition started"
        );

        let registry = SchemeRegistry::standard(self.loader.clone(), self.hiera.clone());
        let resolver = LayerResolver::new(&registry);

        let mut resolved: Vec<(String, Vec<Contribution>)> = Vec::new();
        for spec in &self.config.layering {
            let contributions = resolver.resolve(spec, ctx, acceptor)?;
            resolved.push((spec.name.clone(), contributions));
        }

        let order: Vec<String> = self.evaluator.names().map(String::from).collect();
        check_precedence(
            &order,
            resolved.iter().flat_map(|(_, c)| c.iter()),
            acceptor,
        );

        let configured = resolved
            .into_iter()
            .map(|(name, contributions)| {
                let bindings = contributions
                    .into_iter()
                    .map(Contribution::into_bindings)
                    .collect();
                Layer::with_bindings(name, bindings)
            })
            .collect();

        let result = LayeredBindings::assemble(
            self.system.final_layer(),
            configured,
            self.system.default_layer(),
        );
        info!(
            %run_id,
            node = %ctx.node,
            layers = result.layers().len(),
            "composition finished"
        );
        Ok(result)
    }
}
