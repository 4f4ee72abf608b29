//! Validate a composer configuration without composing.
//!
//! Beyond the structural validation the config loader already performs,
//! this compiles every categorization expression and parses every layer
//! reference, so the errors a compose run would hit at startup surface
//! here first.

use std::path::PathBuf;
use strata_compose::CategoryEvaluator;
use strata_config::ComposerConfig;
use strata_core::BindingReference;

pub fn run(config: Option<PathBuf>, confdir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let path = config.unwrap_or_else(|| confdir.join(super::CONFIG_FILE));
    let config = match ComposerConfig::load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration check failed: {e}");
            std::process::exit(1);
        }
    };

    let mut problems = Vec::new();

    if let Err(e) = CategoryEvaluator::new(&config.categorization) {
        problems.push(e.to_string());
    }

    for layer in &config.layering {
        for entry in layer.include.iter().chain(&layer.exclude) {
            if let Err(e) = BindingReference::parse(entry) {
                problems.push(format!("layer '{}': {e}", layer.name));
            }
        }
    }

    if problems.is_empty() {
        println!(
            "Configuration is valid: {} layer(s), {} categorization rule(s).",
            config.layering.len(),
            config.categorization.len()
        );
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("error: {problem}");
        }
        std::process::exit(1);
    }
}
