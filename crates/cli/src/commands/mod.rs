//! CLI command implementations.

pub mod categories;
pub mod check;
pub mod compose;
pub mod init;

use crate::EnvArgs;
use std::sync::Arc;
use strata_compose::{
    Composer, FsFragmentLoader, StaticSystemBindings, TomlHieraProvider, discover_modules,
};
use strata_config::ComposerConfig;
use strata_core::ComposeContext;
use tracing::debug;

/// Name of the composer configuration file inside the confdir.
pub const CONFIG_FILE: &str = "compose.toml";

/// Build the compose context from the shared environment arguments.
pub fn build_context(env: &EnvArgs) -> Result<ComposeContext, Box<dyn std::error::Error>> {
    let mut ctx = ComposeContext::new(env.node.clone(), env.confdir.clone());

    if let Some(dir) = &env.modules {
        ctx = ctx.with_modules(discover_modules(dir)?);
    }

    if let Some(path) = &env.facts {
        let content = std::fs::read_to_string(path)?;
        ctx = ctx.with_facts(serde_json::from_str(&content)?);
    }

    debug!(node = %ctx.node, modules = ctx.modules.len(), "compose context built");
    Ok(ctx)
}

/// Build a composer wired to the filesystem collaborators.
pub fn build_composer(env: &EnvArgs) -> Result<Composer, Box<dyn std::error::Error>> {
    let path = env
        .config
        .clone()
        .unwrap_or_else(|| env.confdir.join(CONFIG_FILE));
    let config = ComposerConfig::load_from(&path)?;
    debug!(
        config = %path.display(),
        layers = config.layering.len(),
        "configuration loaded"
    );
    let composer = Composer::new(
        config,
        Arc::new(FsFragmentLoader::new()),
        Arc::new(TomlHieraProvider::new()),
        Arc::new(StaticSystemBindings::default()),
    )?;
    Ok(composer)
}
