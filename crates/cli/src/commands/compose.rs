//! Run a full composition and print the result.

use crate::EnvArgs;
use strata_core::DiagnosticLog;

pub fn run(env: EnvArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = super::build_context(&env)?;
    let composer = super::build_composer(&env)?;

    let log = DiagnosticLog::new();
    let result = composer.compose(&ctx, &log)?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    // Diagnostics go to stderr so the JSON output stays pipeable.
    for diagnostic in log.entries() {
        eprintln!(
            "warning: {} at {}: {}",
            diagnostic.kind, diagnostic.location, diagnostic.detail
        );
    }
    Ok(())
}
