//! Evaluate the categorization rules for a node.

use crate::EnvArgs;

pub fn run(env: EnvArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = super::build_context(&env)?;
    let composer = super::build_composer(&env)?;

    let categories = composer.effective_categories(&ctx)?;
    println!("{}", serde_json::to_string_pretty(&categories)?);
    Ok(())
}
